//! Exclusive coordinator - collapses concurrent requests into one execution

use crate::coordination::CoordinatedTask;
use crate::core::Payload;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// Coordinator settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// On rejection, have every waiter re-drive its own work instead of
    /// failing it
    #[serde(default)]
    pub propagate_on_reject: bool,
}

/// Tracks the waiters of one logical exclusive operation.
///
/// The first registered waiter is the lead and the only one allowed to run
/// the real work. Followers park on their own promise until the lead calls
/// [`resolve_all`](Self::resolve_all) or [`reject_all`](Self::reject_all).
///
/// Share it between pipelines with an `Arc`.
pub struct ExclusiveCoordinator<T, E> {
    name: String,
    config: CoordinatorConfig,
    waiters: Mutex<Vec<Arc<CoordinatedTask<T, E>>>>,
}

impl<T: Payload, E: Payload> ExclusiveCoordinator<T, E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CoordinatorConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: CoordinatorConfig) -> Self {
        Self {
            name: name.into(),
            config,
            waiters: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<CoordinatedTask<T, E>>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `task` unless it is already waiting; `true` if it was added
    pub fn register(&self, task: &Arc<CoordinatedTask<T, E>>) -> bool {
        let mut waiters = self.lock();
        if waiters.iter().any(|w| w.id() == task.id()) {
            return false;
        }
        waiters.push(Arc::clone(task));
        debug!(
            "Task {} joined {} ({} waiting)",
            task.id(),
            self.name,
            waiters.len()
        );
        true
    }

    /// Register `task` and report whether it leads, in one locked step
    pub fn join(&self, task: &Arc<CoordinatedTask<T, E>>) -> bool {
        let mut waiters = self.lock();
        if !waiters.iter().any(|w| w.id() == task.id()) {
            waiters.push(Arc::clone(task));
            debug!(
                "Task {} joined {} ({} waiting)",
                task.id(),
                self.name,
                waiters.len()
            );
        }
        waiters.first().is_some_and(|w| w.id() == task.id())
    }

    /// Remove `task`; `false` if it was not waiting
    pub fn unregister(&self, task: &CoordinatedTask<T, E>) -> bool {
        let mut waiters = self.lock();
        match waiters.iter().position(|w| w.id() == task.id()) {
            Some(index) => {
                waiters.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether `task` is the first registered waiter
    pub fn is_lead(&self, task: &CoordinatedTask<T, E>) -> bool {
        self.lock().first().is_some_and(|w| w.id() == task.id())
    }

    /// Fulfill every waiter with `value` and clear the waiter set
    pub fn resolve_all(&self, value: T) {
        self.deliver_value(self.drain(), value);
    }

    /// Fail every waiter with `reason`, or have each re-drive its own work
    /// when `propagate_on_reject` is set; then clear the waiter set
    pub fn reject_all(&self, reason: E) {
        self.deliver_rejection(self.drain(), reason);
    }

    /// If `task` leads, remove it and resolve the remaining waiters with
    /// `value`; `false` if it was not the lead
    pub fn resolve_as_lead(&self, task: &CoordinatedTask<T, E>, value: T) -> bool {
        match self.take_followers(task) {
            Some(followers) => {
                self.deliver_value(followers, value);
                true
            }
            None => false,
        }
    }

    /// If `task` leads, remove it and reject the remaining waiters with
    /// `reason`; `false` if it was not the lead
    pub fn reject_as_lead(&self, task: &CoordinatedTask<T, E>, reason: E) -> bool {
        match self.take_followers(task) {
            Some(followers) => {
                self.deliver_rejection(followers, reason);
                true
            }
            None => false,
        }
    }

    /// Lead check, lead removal and drain under a single lock
    fn take_followers(&self, task: &CoordinatedTask<T, E>) -> Option<Vec<Arc<CoordinatedTask<T, E>>>> {
        let mut waiters = self.lock();
        if !waiters.first().is_some_and(|w| w.id() == task.id()) {
            return None;
        }
        let mut followers = std::mem::take(&mut *waiters);
        followers.remove(0);
        Some(followers)
    }

    fn deliver_value(&self, waiters: Vec<Arc<CoordinatedTask<T, E>>>, value: T) {
        info!("{} resolved for {} waiter(s)", self.name, waiters.len());
        for waiter in waiters {
            waiter.promise().fulfill(value.clone());
        }
    }

    fn deliver_rejection(&self, waiters: Vec<Arc<CoordinatedTask<T, E>>>, reason: E) {
        if self.config.propagate_on_reject {
            info!(
                "{} rejected, {} waiter(s) re-drive their own work",
                self.name,
                waiters.len()
            );
            for waiter in waiters {
                waiter.redrive();
            }
        } else {
            info!("{} rejected for {} waiter(s)", self.name, waiters.len());
            for waiter in waiters {
                waiter.promise().fail(reason.clone());
            }
        }
    }

    /// Take the waiter set; delivery happens outside the lock
    fn drain(&self) -> Vec<Arc<CoordinatedTask<T, E>>> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Waiter ids in registration order
    pub fn waiter_ids(&self) -> Vec<Uuid> {
        self.lock().iter().map(|w| w.id()).collect()
    }
}

impl<T, E> std::fmt::Debug for ExclusiveCoordinator<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let waiting = self
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("ExclusiveCoordinator")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("waiting", &waiting)
            .finish()
    }
}
