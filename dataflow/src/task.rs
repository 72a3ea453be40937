//! Droppable background tasks for processor loops.
//!
//! Actors and tracked actions run their processing loops on spawned tasks
//! whose lifetime is tied to a handle. Dropping the handle aborts the task,
//! which is the only teardown mechanism this crate provides.

use std::future::Future;

/// Handle to a spawned background task; aborts the task when dropped.
#[derive(Debug)]
pub struct TaskHandle(tokio::task::JoinHandle<()>);

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Spawn a background task tied to the returned handle's lifetime.
///
/// Must be called from within a tokio runtime.
pub fn spawn_droppable<F>(future: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    TaskHandle(tokio::spawn(future))
}
