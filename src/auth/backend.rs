//! Collaborator traits used by the authentication flow

use crate::auth::{AuthError, Credentials, Session};
use async_trait::async_trait;

/// Trait for session checks and credential verification
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Current session, `None` when not logged in
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Verify credentials; [`AuthError::Rejected`] for wrong credentials
    async fn verify(&self, credentials: &Credentials) -> Result<Session, AuthError>;
}

/// Trait for asking the user for credentials
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// Ask for credentials; `None` when the user cancels.
    ///
    /// `attempt` starts at 1 and grows with every rejected verification.
    async fn prompt(&self, attempt: usize) -> Option<Credentials>;
}
