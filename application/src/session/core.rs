//! Shared status bookkeeping for resource sessions.
//!
//! Every session call is issued a [`RequestToken`]. In-flight calls are kept
//! in a map keyed by token, so `loading` stays true until the last of
//! several overlapping calls has settled. The error slot remembers which
//! token produced it; an older call failing late cannot overwrite the
//! failure of a newer one, and the auto-clear timer only clears the error
//! it was scheduled for.

use crate::ports::resource_client::RemoteCallFailure;
use paramlab_domain::{Operation, RequestToken, SessionStatus};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone)]
struct RecordedError {
    token: RequestToken,
    operation: Operation,
    message: String,
}

/// Mutable part of a session: resource data plus status.
pub(crate) struct CoreState<S> {
    pub(crate) data: S,
    last_token: RequestToken,
    in_flight: BTreeMap<RequestToken, Operation>,
    error: Option<RecordedError>,
    clear_timer: Option<AbortHandle>,
}

impl<S> CoreState<S> {
    fn cancel_clear_timer(&mut self) {
        if let Some(handle) = self.clear_timer.take() {
            handle.abort();
        }
    }

    fn status(&self) -> SessionStatus {
        if let Some((_, op)) = self.in_flight.iter().next_back() {
            return SessionStatus::Pending(*op);
        }
        match &self.error {
            Some(e) => SessionStatus::Failed(e.operation, e.message.clone()),
            None => SessionStatus::Idle,
        }
    }
}

pub(crate) struct SessionCore<S> {
    name: &'static str,
    state: Mutex<CoreState<S>>,
    error_auto_clear: Duration,
    closed: CancellationToken,
    revision: watch::Sender<u64>,
}

impl<S: Send + 'static> SessionCore<S> {
    pub(crate) fn new(name: &'static str, data: S, error_auto_clear: Duration) -> Arc<Self> {
        let (revision, _) = watch::channel(0);
        Arc::new(Self {
            name,
            state: Mutex::new(CoreState {
                data,
                last_token: RequestToken::new(0),
                in_flight: BTreeMap::new(),
                error: None,
                clear_timer: None,
            }),
            error_auto_clear,
            closed: CancellationToken::new(),
            revision,
        })
    }

    fn lock(&self) -> MutexGuard<'_, CoreState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r = r.wrapping_add(1));
    }

    /// Read session data under the lock.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().data)
    }

    /// Change session data outside of any remote call. Ignored after close.
    pub(crate) fn mutate(&self, f: impl FnOnce(&mut S)) {
        let mut state = self.lock();
        if self.is_closed() {
            return;
        }
        f(&mut state.data);
        drop(state);
        self.bump();
    }

    pub(crate) fn status(&self) -> SessionStatus {
        self.lock().status()
    }

    pub(crate) fn loading(&self) -> bool {
        !self.lock().in_flight.is_empty()
    }

    pub(crate) fn error(&self) -> Option<String> {
        self.lock().error.as_ref().map(|e| e.message.clone())
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Issue a token for a new call. Starting a call clears the recorded error.
    pub(crate) fn begin(&self, operation: Operation) -> RequestToken {
        let mut state = self.lock();
        let token = state.last_token.next();
        state.last_token = token;

        if self.is_closed() {
            trace!("{}: {} issued after close", self.name, operation);
            return token;
        }

        state.in_flight.insert(token, operation);
        state.error = None;
        state.cancel_clear_timer();
        drop(state);

        debug!("{}: {} started (request {})", self.name, operation, token.value());
        self.bump();
        token
    }

    /// Settle a successful call, applying `update` to the session data.
    ///
    /// After [`close`](Self::close) the update is discarded.
    pub(crate) fn succeed(&self, token: RequestToken, update: impl FnOnce(&mut S)) {
        let mut state = self.lock();
        if self.is_closed() {
            debug!("{}: dropping result of request {} after close", self.name, token.value());
            return;
        }

        let operation = state.in_flight.remove(&token);
        update(&mut state.data);
        drop(state);

        if let Some(op) = operation {
            debug!("{}: {} succeeded (request {})", self.name, op, token.value());
        }
        self.bump();
    }

    /// Settle a failed call and record its message in the error slot.
    pub(crate) fn fail(self: &Arc<Self>, token: RequestToken, failure: &RemoteCallFailure) {
        let mut state = self.lock();
        if self.is_closed() {
            debug!("{}: dropping failure of request {} after close", self.name, token.value());
            return;
        }

        let operation = state.in_flight.remove(&token);
        let operation = match operation {
            Some(op) => op,
            None => {
                warn!("{}: failure for unknown request {}", self.name, token.value());
                self.bump();
                return;
            }
        };
        warn!("{}: {} failed: {}", self.name, operation, failure);

        let superseded = state
            .error
            .as_ref()
            .is_some_and(|current| current.token > token);
        if superseded {
            debug!(
                "{}: keeping newer error over stale failure of request {}",
                self.name,
                token.value()
            );
        } else {
            state.error = Some(RecordedError {
                token,
                operation,
                message: failure.message().to_string(),
            });
            state.cancel_clear_timer();
            state.clear_timer = self.schedule_clear(token);
        }
        drop(state);
        self.bump();
    }

    /// Clear the error slot immediately.
    pub(crate) fn clear_error(&self) {
        let mut state = self.lock();
        state.cancel_clear_timer();
        if state.error.take().is_some() {
            drop(state);
            self.bump();
        }
    }

    /// Stop all timers and ignore any result that arrives from now on.
    pub(crate) fn close(&self) {
        if self.closed.is_cancelled() {
            return;
        }
        self.closed.cancel();
        let mut state = self.lock();
        state.cancel_clear_timer();
        state.in_flight.clear();
        drop(state);
        debug!("{}: closed", self.name);
        self.bump();
    }

    fn expire_error(&self, token: RequestToken) {
        let mut state = self.lock();
        if state.error.as_ref().is_some_and(|e| e.token == token) {
            state.error = None;
            state.clear_timer = None;
            drop(state);
            debug!("{}: error from request {} auto-cleared", self.name, token.value());
            self.bump();
        }
    }

    fn schedule_clear(self: &Arc<Self>, token: RequestToken) -> Option<AbortHandle> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("{}: no async runtime; error will not auto-clear", self.name);
            return None;
        };

        let core: Weak<Self> = Arc::downgrade(self);
        let closed = self.closed.clone();
        let delay = self.error_auto_clear;
        let task = runtime.spawn(async move {
            tokio::select! {
                _ = closed.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Some(core) = core.upgrade() {
                        core.expire_error(token);
                    }
                }
            }
        });
        Some(task.abort_handle())
    }
}

impl<S> Drop for SessionCore<S> {
    fn drop(&mut self) {
        self.closed.cancel();
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.cancel_clear_timer();
    }
}
