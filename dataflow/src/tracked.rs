//! Tracked actions: named intents with derived state signals.
//!
//! A [`TrackedAction`] turns dispatches of one named intent into a payload
//! stream plus an observable loading/complete/error state machine:
//! `Idle -> Loading -> (Complete | Errored) -> Idle`, repeating per
//! dispatch. Dispatch never fails in the caller's face; fetch and
//! transform failures land in the action's error signal and in the shared
//! [`ErrorSink`].

use crate::error::StateError;
use crate::relay::{Relay, RelayError, relay};
use crate::sink::ErrorSink;
use crate::task::{TaskHandle, spawn_droppable};
use futures::StreamExt;
use futures::channel::mpsc::UnboundedReceiver;
use futures_signals::signal::{Mutable, Signal, SignalExt};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Derived per-action state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionState {
    /// True between dispatch and settlement.
    pub loading: bool,
    /// True once a dispatch has settled successfully.
    pub complete: bool,
    /// Set when a dispatch settled with a failure.
    pub error: Option<StateError>,
}

/// Concurrency policy applied at dispatch time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// A dispatch arriving while a prior one is still in flight is dropped:
    /// not queued, not cancelled. Exactly one request stays active.
    Exhaust,
    /// Every dispatch is forwarded; downstream the last write observed
    /// wins, with no detection of lost updates.
    Latest,
}

type Transform<T> = Arc<dyn Fn(T) -> Result<T, StateError> + Send + Sync>;

/// A named intent whose dispatches produce observable
/// loading/complete/error signals.
///
/// Cheap to clone; every clone dispatches into the same stream. The stream
/// has exactly one consumer, registered once with [`on`](Self::on) or
/// taken raw with [`take_stream`](Self::take_stream). Dropping the handle
/// returned by `on` (or the taken stream) tears the action down: further
/// `dispatch` calls are silent no-ops and [`try_dispatch`](Self::try_dispatch)
/// reports the closed channel.
#[derive(Clone)]
pub struct TrackedAction<T>
where
    T: Clone + Send + Sync + 'static,
{
    name: &'static str,
    policy: DispatchPolicy,
    relay: Relay<T>,
    receiver: Arc<Mutex<Option<UnboundedReceiver<T>>>>,
    state: Mutable<ActionState>,
    transform: Option<Transform<T>>,
    sink: ErrorSink,
}

impl<T> TrackedAction<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, policy: DispatchPolicy, sink: ErrorSink) -> Self {
        let (relay, receiver) = relay();
        Self {
            name,
            policy,
            relay,
            receiver: Arc::new(Mutex::new(Some(receiver))),
            state: Mutable::new(ActionState::default()),
            transform: None,
            sink,
        }
    }

    /// Register a payload transform run at dispatch time, before the
    /// payload is forwarded. A transform rejection records the action
    /// error, reports to the sink and drops the payload.
    pub fn with_transform(
        mut self,
        transform: impl Fn(T) -> Result<T, StateError> + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Dispatch a payload: enter `Loading` (clearing prior
    /// `complete`/`error`) and forward the payload into the stream.
    ///
    /// Under [`DispatchPolicy::Exhaust`] a dispatch while loading is
    /// silently dropped. After teardown dispatch is a silent no-op.
    pub fn dispatch(&self, value: T) {
        let _ = self.dispatch_inner(value, false);
    }

    /// Route the payload without the loading-flag transition.
    pub fn dispatch_silent(&self, value: T) {
        let _ = self.dispatch_inner(value, true);
    }

    /// Like [`dispatch`](Self::dispatch), but surfaces a closed action
    /// stream instead of discarding the payload.
    pub fn try_dispatch(&self, value: T) -> Result<(), RelayError> {
        self.dispatch_inner(value, false)
    }

    fn dispatch_inner(&self, value: T, silent: bool) -> Result<(), RelayError> {
        if self.relay.is_closed() {
            return Err(RelayError::ChannelClosed);
        }
        if self.policy == DispatchPolicy::Exhaust && self.state.lock_ref().loading {
            tracing::debug!(action = self.name, "dispatch dropped while in flight");
            return Ok(());
        }
        let Some(value) = self.transformed(value) else {
            return Ok(());
        };
        if !silent {
            self.state.set(ActionState {
                loading: true,
                complete: false,
                error: None,
            });
        }
        self.relay.try_send(value)
    }

    fn transformed(&self, value: T) -> Option<T> {
        match &self.transform {
            None => Some(value),
            Some(transform) => match transform(value) {
                Ok(value) => Some(value),
                Err(error) => {
                    self.state.set(ActionState {
                        loading: false,
                        complete: false,
                        error: Some(error.clone()),
                    });
                    self.sink.report(self.name, error);
                    None
                }
            },
        }
    }

    /// Mark the in-flight dispatch as settled successfully.
    pub fn settled(&self) {
        self.state.set(ActionState {
            loading: false,
            complete: true,
            error: None,
        });
    }

    /// Mark the in-flight dispatch as failed. The cause is recorded on the
    /// error signal and forwarded to the shared sink.
    pub fn failed(&self, error: StateError) {
        self.state.set(ActionState {
            loading: false,
            complete: false,
            error: Some(error.clone()),
        });
        self.sink.report(self.name, error);
    }

    /// Register the single consumer for this action's payload stream.
    ///
    /// The handler runs once per forwarded payload; its result settles the
    /// state machine. There is no automatic retry. Registering a second
    /// consumer is a programmer error and panics.
    pub fn on<F, Fut>(&self, mut handler: F) -> TaskHandle
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), StateError>> + Send + 'static,
    {
        let mut stream = self.take_stream();
        let action = self.clone();
        spawn_droppable(async move {
            while let Some(value) = stream.next().await {
                match handler(value).await {
                    Ok(()) => action.settled(),
                    Err(error) => action.failed(error),
                }
            }
        })
    }

    /// Take the raw payload stream. Single consumer; taking it twice is a
    /// programmer error and panics.
    pub fn take_stream(&self) -> UnboundedReceiver<T> {
        self.receiver
            .lock()
            .expect("action receiver slot poisoned")
            .take()
            .unwrap_or_else(|| panic!("action `{}` already has a consumer", self.name))
    }

    pub fn state_signal(&self) -> impl Signal<Item = ActionState> + use<T> {
        self.state.signal_cloned()
    }

    pub fn loading_signal(&self) -> impl Signal<Item = bool> + use<T> {
        self.state.signal_ref(|state| state.loading).dedupe()
    }

    pub fn complete_signal(&self) -> impl Signal<Item = bool> + use<T> {
        self.state.signal_ref(|state| state.complete).dedupe()
    }

    pub fn error_signal(&self) -> impl Signal<Item = Option<StateError>> + use<T> {
        self.state
            .signal_ref(|state| state.error.clone())
            .dedupe_cloned()
    }
}
