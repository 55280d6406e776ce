//! In-process stand-ins for a login service and a credential dialog

use crate::auth::{AuthBackend, AuthError, CredentialPrompt, Credentials, Session};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Backend with a configurable session and a number of rejected logins
#[derive(Debug)]
pub struct SimulatedBackend {
    delay: Duration,
    session: Mutex<Option<Session>>,
    rejections_left: AtomicUsize,
    checks: AtomicUsize,
    verifications: AtomicUsize,
}

impl SimulatedBackend {
    /// Logged out, accepts the first credentials; every call takes `delay`
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            session: Mutex::new(None),
            rejections_left: AtomicUsize::new(0),
            checks: AtomicUsize::new(0),
            verifications: AtomicUsize::new(0),
        }
    }

    /// Start with a live session for `user`
    pub fn logged_in(self, user: &str) -> Self {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(Session::new(user));
        self
    }

    /// Reject the first `count` verifications
    pub fn rejecting(self, count: usize) -> Self {
        self.rejections_left.store(count, Ordering::SeqCst);
        self
    }

    /// Number of session checks so far
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// Number of verifications so far
    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl AuthBackend for SimulatedBackend {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn verify(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let rejected = self
            .rejections_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(AuthError::Rejected);
        }

        let session = Session::new(credentials.user.clone());
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(session)
    }
}

/// Prompt that always answers the same way after `delay`
#[derive(Debug)]
pub struct ScriptedPrompt {
    answer: Option<Credentials>,
    delay: Duration,
    prompts: AtomicUsize,
}

impl ScriptedPrompt {
    /// Always enter `user` / `secret`
    pub fn answering(user: &str, secret: &str, delay: Duration) -> Self {
        Self {
            answer: Some(Credentials::new(user, secret)),
            delay,
            prompts: AtomicUsize::new(0),
        }
    }

    /// Always cancel the dialog
    pub fn cancelling(delay: Duration) -> Self {
        Self {
            answer: None,
            delay,
            prompts: AtomicUsize::new(0),
        }
    }

    /// Number of times the prompt was shown
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialPrompt for ScriptedPrompt {
    async fn prompt(&self, _attempt: usize) -> Option<Credentials> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.answer.clone()
    }
}
