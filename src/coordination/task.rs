//! Coordinated task - one participant of an exclusive operation

use crate::coordination::ExclusiveCoordinator;
use crate::core::{Payload, ResettablePromise};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// The real multi-step work behind a coordinated task
#[async_trait]
pub trait TaskDriver<T, E>: Send + Sync {
    /// Run the work to completion
    async fn drive(&self) -> Result<T, E>;
}

/// A participant registered with an [`ExclusiveCoordinator`].
///
/// Every caller of [`start`](Self::start), lead or follower, awaits the same
/// eventual outcome. Only the lead runs its [`TaskDriver`].
pub struct CoordinatedTask<T, E> {
    id: Uuid,
    coordinator: Arc<ExclusiveCoordinator<T, E>>,
    promise: ResettablePromise<T, E>,
    driver: Arc<dyn TaskDriver<T, E>>,
    driving: AtomicBool,
}

impl<T: Payload, E: Payload> CoordinatedTask<T, E> {
    pub fn new(
        coordinator: Arc<ExclusiveCoordinator<T, E>>,
        driver: Arc<dyn TaskDriver<T, E>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            coordinator,
            promise: ResettablePromise::new(),
            driver,
            driving: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// This task's own outcome
    pub fn promise(&self) -> &ResettablePromise<T, E> {
        &self.promise
    }

    pub fn coordinator(&self) -> &Arc<ExclusiveCoordinator<T, E>> {
        &self.coordinator
    }

    /// Join the coordinator and, if this task leads, begin the real work.
    ///
    /// A task whose previous round already settled is re-armed first, so a
    /// restarted pipeline gets the new outcome. Returns this task's own
    /// outcome future either way.
    pub fn start(self: &Arc<Self>) -> BoxFuture<'static, Result<T, E>> {
        if self.promise.is_settled() && !self.driving.load(Ordering::SeqCst) {
            debug!("Task {} re-arms for a new round", self.id);
            self.promise.reset();
        }
        let outcome = self.promise.wait();
        if self.coordinator.join(self) {
            info!("Task {} leads {}", self.id, self.coordinator.name());
            self.spawn_drive();
        } else {
            debug!("Task {} follows on {}", self.id, self.coordinator.name());
        }
        outcome
    }

    /// Run the work for this task alone, outside of coordination
    pub fn redrive(self: &Arc<Self>) {
        debug!("Task {} re-drives its own work", self.id);
        self.spawn_drive();
    }

    fn spawn_drive(self: &Arc<Self>) {
        if self.driving.swap(true, Ordering::SeqCst) {
            debug!("Task {} is already driving its work", self.id);
            return;
        }
        let task = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = task.driver.drive().await;
            // Cleared before settling, so a caller woken by the outcome can re-arm
            task.driving.store(false, Ordering::SeqCst);
            match outcome {
                Ok(value) => task.succeed(value),
                Err(reason) => task.fail_with(reason),
            }
        });
    }

    /// Fulfill this task; a lead also resolves every other waiter
    pub fn succeed(&self, value: T) {
        self.coordinator.resolve_as_lead(self, value.clone());
        self.promise.fulfill(value);
    }

    /// Fail this task; a lead also rejects every other waiter
    pub fn fail_with(&self, reason: E) {
        self.coordinator.reject_as_lead(self, reason.clone());
        self.promise.fail(reason);
    }
}

impl<T, E> std::fmt::Debug for CoordinatedTask<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatedTask")
            .field("id", &self.id)
            .field("promise", &self.promise)
            .field("driving", &self.driving.load(Ordering::SeqCst))
            .finish()
    }
}
