//! Event streaming Relay implementation
//!
//! Relay provides type-safe event streaming between dispatch surfaces and
//! state containers using simple unbounded channels instead of a custom
//! Stream implementation.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use std::sync::{Arc, OnceLock};

/// Type-safe event streaming relay.
///
/// Relays carry payloads from emit sites (tracked-action dispatch, store
/// operations) into Actor processor loops. The receiving end is a plain
/// `UnboundedReceiver` consumed by exactly one processor.
///
/// In debug builds a relay additionally enforces that it is emitted from a
/// single source location; emitting the same relay from scattered call
/// sites is treated as a programmer error and panics.
#[derive(Clone, Debug)]
pub struct Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    sender: UnboundedSender<T>,
    #[cfg(debug_assertions)]
    emit_location: Arc<OnceLock<&'static std::panic::Location<'static>>>,
}

/// Error type for Relay operations
#[derive(Debug, Clone)]
pub enum RelayError {
    /// The channel has been closed (receiver dropped)
    ChannelClosed,
    /// Relay send called from multiple locations (debug builds only)
    #[cfg(debug_assertions)]
    MultipleEmitters {
        previous: &'static std::panic::Location<'static>,
        current: &'static std::panic::Location<'static>,
    },
}

impl<T> Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new Relay with an associated receiver stream.
    ///
    /// Returns a `(Relay, UnboundedReceiver)` tuple following Rust's
    /// channel conventions. Use the [`relay()`] function for the common
    /// case.
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        (
            Relay {
                sender,
                #[cfg(debug_assertions)]
                emit_location: Arc::new(OnceLock::new()),
            },
            receiver,
        )
    }

    /// Check that this relay is only being emitted from a single source
    /// location. Debug builds only.
    #[cfg(debug_assertions)]
    #[track_caller]
    fn check_single_source(&self) -> Result<(), RelayError> {
        let caller = std::panic::Location::caller();
        match self.emit_location.set(caller) {
            Ok(()) => Ok(()),
            Err(previous) if previous == caller => Ok(()),
            Err(previous) => Err(RelayError::MultipleEmitters {
                previous,
                current: caller,
            }),
        }
    }

    /// Send an event through the relay.
    ///
    /// If the receiver has been dropped the event is silently discarded,
    /// matching the teardown contract: containers that were torn down
    /// ignore further events. Use [`try_send`](Self::try_send) to observe
    /// the closed state.
    #[track_caller]
    pub fn send(&self, value: T) {
        #[cfg(debug_assertions)]
        if let Err(e) = self.check_single_source() {
            panic!("{e:?}");
        }

        let _ = self.sender.unbounded_send(value);
    }

    /// Whether the receiving end has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Try to send an event through the relay with explicit error handling.
    ///
    /// Returns [`RelayError::ChannelClosed`] if the receiver has been
    /// dropped.
    #[track_caller]
    pub fn try_send(&self, value: T) -> Result<(), RelayError> {
        #[cfg(debug_assertions)]
        self.check_single_source()?;

        self.sender
            .unbounded_send(value)
            .map_err(|_| RelayError::ChannelClosed)
    }
}

/// Creates a new Relay with an associated receiver stream.
pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Clone + Send + Sync + 'static,
{
    Relay::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn relay_delivers_events_in_order() {
        let (relay, mut receiver) = relay::<String>();

        relay.send("first".to_string());
        relay.send("second".to_string());

        assert_eq!(receiver.next().await, Some("first".to_string()));
        assert_eq!(receiver.next().await, Some("second".to_string()));
    }

    #[tokio::test]
    async fn try_send_reports_closed_channel() {
        let (relay, mut receiver) = Relay::new();

        assert!(relay.try_send(1).is_ok());
        assert_eq!(receiver.next().await, Some(1));

        drop(receiver);

        assert!(matches!(relay.try_send(2), Err(RelayError::ChannelClosed)));
    }

    #[tokio::test]
    async fn send_after_teardown_is_a_no_op() {
        let (relay, receiver) = relay::<u32>();
        drop(receiver);

        // Must not panic or block.
        relay.send(7);
    }
}
