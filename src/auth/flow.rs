//! Check -> prompt -> verify login flow

use crate::auth::{AuthBackend, AuthError, CredentialPrompt, Session};
use crate::coordination::TaskDriver;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives one login: reuse the current session or prompt until verified
#[derive(Clone)]
pub struct AuthFlow {
    backend: Arc<dyn AuthBackend>,
    prompt: Arc<dyn CredentialPrompt>,
}

impl AuthFlow {
    pub fn new(backend: Arc<dyn AuthBackend>, prompt: Arc<dyn CredentialPrompt>) -> Self {
        Self { backend, prompt }
    }

    /// Check for a session, otherwise prompt and verify
    pub async fn run(&self) -> Result<Session, AuthError> {
        if let Some(session) = self.backend.current_session().await? {
            info!("Already logged in as {}", session.user);
            return Ok(session);
        }

        let mut attempt = 1;
        loop {
            debug!("Prompting for credentials (attempt {})", attempt);
            let credentials = match self.prompt.prompt(attempt).await {
                Some(credentials) => credentials,
                None => {
                    warn!("Credential prompt cancelled");
                    return Err(AuthError::Cancelled);
                }
            };

            match self.backend.verify(&credentials).await {
                Ok(session) => {
                    info!("Logged in as {} after {} attempt(s)", session.user, attempt);
                    return Ok(session);
                }
                Err(AuthError::Rejected) => {
                    warn!("Credentials for {} rejected", credentials.user);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl TaskDriver<Session, AuthError> for AuthFlow {
    async fn drive(&self) -> Result<Session, AuthError> {
        self.run().await
    }
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow").finish_non_exhaustive()
    }
}
