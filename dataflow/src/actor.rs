//! Single-value Actor implementation for reactive state management
//!
//! Actor owns a `Mutable<T>` and processes events from Relays to update
//! state through sequential message processing.

use crate::task::{TaskHandle, spawn_droppable};
use futures_signals::signal::{Mutable, Signal};
use std::future::Future;
use std::sync::Arc;

/// Single-value reactive state container.
///
/// An Actor controls all mutations to a piece of state through a processor
/// task that consumes event streams sequentially. Consumers read the state
/// through signals; there is no public getter.
///
/// Dropping the last clone of an Actor aborts its processor task, which is
/// how containers tear down: pending events are left unobserved and later
/// relay sends become no-ops.
///
/// # Examples
///
/// ```ignore
/// let (increment_relay, mut increment_stream) = relay();
///
/// let counter = Actor::new(0, async move |state| {
///     while let Some(amount) = increment_stream.next().await {
///         state.replace_with(|current| *current + amount);
///     }
/// });
///
/// increment_relay.send(5);
/// counter.signal() // reactive access to the current count
/// ```
#[derive(Clone, Debug)]
pub struct Actor<T>
where
    T: Clone + Send + Sync + 'static,
{
    state: Mutable<T>,
    #[allow(dead_code)]
    task_handle: Arc<TaskHandle>,
}

impl<T> Actor<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new Actor with initial state and an event processing loop.
    ///
    /// The processor receives the state handle and should loop over one or
    /// more event streams, usually with `StreamExt::next` or `select!`.
    pub fn new<F, Fut>(initial_state: T, processor: F) -> Self
    where
        F: FnOnce(Mutable<T>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let state = Mutable::new(initial_state);
        let task_handle = Arc::new(spawn_droppable(processor(state.clone())));

        Self { state, task_handle }
    }

    /// Get a reactive signal for this Actor's state.
    ///
    /// This is the only way consumers access Actor state.
    pub fn signal(&self) -> impl Signal<Item = T> + use<T> {
        self.state.signal_cloned()
    }

    /// Get a reactive signal derived from a reference to the state, to
    /// avoid cloning large values on every emission.
    pub fn signal_ref<U, F>(&self, f: F) -> impl Signal<Item = U> + use<T, U, F>
    where
        F: FnMut(&T) -> U,
    {
        self.state.signal_ref(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::relay;
    use futures::{StreamExt, select};
    use futures_signals::signal::SignalExt;

    #[tokio::test]
    async fn actor_applies_events_sequentially() {
        let (increment_relay, mut increment_stream) = relay();

        let counter = Actor::new(0, async move |state| {
            while let Some(amount) = increment_stream.next().await {
                state.replace_with(|current| *current + amount);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        increment_relay.send(5);
        increment_relay.send(3);

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        let final_value = counter.signal().to_stream().next().await.unwrap();
        assert_eq!(final_value, 8);
    }

    #[tokio::test]
    async fn actor_selects_over_multiple_streams() {
        let (add_relay, mut add_stream) = relay();
        let (subtract_relay, mut subtract_stream) = relay();

        let counter = Actor::new(10u32, async move |state| {
            loop {
                select! {
                    amount = add_stream.next() => {
                        if let Some(amount) = amount {
                            state.replace_with(|current| *current + amount);
                        }
                    }
                    amount = subtract_stream.next() => {
                        if let Some(amount) = amount {
                            state.replace_with(|current: &mut u32| current.saturating_sub(amount));
                        }
                    }
                }
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        add_relay.send(5);
        subtract_relay.send(3);

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        let final_value = counter.signal().to_stream().next().await.unwrap();
        assert_eq!(final_value, 12);
    }

    #[tokio::test]
    async fn signal_ref_derives_without_cloning() {
        let (push_relay, mut push_stream) = relay::<String>();

        let log = Actor::new(Vec::new(), async move |state| {
            while let Some(entry) = push_stream.next().await {
                state.lock_mut().push(entry);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        push_relay.send("one".to_string());
        push_relay.send("two".to_string());

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        let len = log
            .signal_ref(|entries| entries.len())
            .to_stream()
            .next()
            .await
            .unwrap();
        assert_eq!(len, 2);
    }
}
