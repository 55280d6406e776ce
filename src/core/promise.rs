//! Re-armable completion promise

use crate::core::{Payload, PromiseStatus};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

type Continuation<V> = Box<dyn FnOnce(V) + Send>;

/// One arming of the promise: settles at most once
struct Arming<T, E> {
    outcome: watch::Sender<Option<Result<T, E>>>,
    settled: bool,
    on_fulfilled: Vec<Continuation<T>>,
    on_rejected: Vec<Continuation<E>>,
}

impl<T, E> Arming<T, E> {
    fn new() -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            outcome,
            settled: false,
            on_fulfilled: Vec::new(),
            on_rejected: Vec::new(),
        }
    }
}

struct Inner<T, E> {
    status: PromiseStatus,
    arming: Arming<T, E>,
}

/// A unit of asynchronous completion that can be re-armed for reuse.
///
/// Each arming is fulfilled or failed at most once. Settling an already
/// settled arming only overwrites [`status`](Self::status); waiters and
/// continuations keep the first outcome. [`reset`](Self::reset) discards the
/// current arming: its pending continuations are dropped and futures
/// obtained from it never complete.
///
/// Clones are handles to the same promise.
pub struct ResettablePromise<T, E> {
    inner: Arc<Mutex<Inner<T, E>>>,
}

impl<T, E> Clone for ResettablePromise<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Payload, E: Payload> ResettablePromise<T, E> {
    /// Create a promise armed and pending
    pub fn new() -> Self {
        // Construction arms immediately, so `Initial` is never observed here
        let inner = Inner {
            status: PromiseStatus::Pending,
            arming: Arming::new(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T, E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current status
    pub fn status(&self) -> PromiseStatus {
        self.lock().status
    }

    /// Whether the current arming already received an outcome
    pub fn is_settled(&self) -> bool {
        self.lock().arming.settled
    }

    /// Resolve the current arming with `value`
    pub fn fulfill(&self, value: T) {
        let continuations = {
            let mut inner = self.lock();
            inner.status = PromiseStatus::Fulfilled;
            if inner.arming.settled {
                return;
            }
            inner.arming.settled = true;
            inner.arming.on_rejected.clear();
            inner.arming.outcome.send_replace(Some(Ok(value.clone())));
            std::mem::take(&mut inner.arming.on_fulfilled)
        };

        for continuation in continuations {
            continuation(value.clone());
        }
    }

    /// Reject the current arming with `reason`
    pub fn fail(&self, reason: E) {
        let continuations = {
            let mut inner = self.lock();
            inner.status = PromiseStatus::Rejected;
            if inner.arming.settled {
                return;
            }
            inner.arming.settled = true;
            inner.arming.on_fulfilled.clear();
            inner.arming.outcome.send_replace(Some(Err(reason.clone())));
            std::mem::take(&mut inner.arming.on_rejected)
        };

        for continuation in continuations {
            continuation(reason.clone());
        }
    }

    /// Discard the current arming and arm a fresh pending one
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.arming = Arming::new();
        inner.status = PromiseStatus::Pending;
    }

    /// Run `continuation` when the current arming is fulfilled.
    ///
    /// Ignored once the promise reached a terminal status.
    pub fn on_fulfilled<F>(&self, continuation: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.status.is_open() {
            inner.arming.on_fulfilled.push(Box::new(continuation));
        }
        self
    }

    /// Run `continuation` when the current arming is rejected.
    ///
    /// Ignored once the promise reached a terminal status.
    pub fn on_rejected<F>(&self, continuation: F) -> &Self
    where
        F: FnOnce(E) + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.status.is_open() {
            inner.arming.on_rejected.push(Box::new(continuation));
        }
        self
    }

    /// Future resolving with the outcome of the current arming
    pub fn wait(&self) -> BoxFuture<'static, Result<T, E>> {
        let mut outcome = self.lock().arming.outcome.subscribe();
        async move {
            loop {
                let current = outcome.borrow_and_update().clone();
                if let Some(result) = current {
                    return result;
                }
                if outcome.changed().await.is_err() {
                    // Arming discarded by reset before it settled
                    std::future::pending::<()>().await;
                }
            }
        }
        .boxed()
    }
}

impl<T: Payload, E: Payload> Default for ResettablePromise<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> std::fmt::Debug for ResettablePromise<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ResettablePromise")
            .field("status", &inner.status)
            .field("settled", &inner.arming.settled)
            .finish()
    }
}
