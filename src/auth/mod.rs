//! Sample exclusive task: an authentication check with a credential prompt
//!
//! [`AuthFlow`] checks for a live session, prompts for credentials when
//! there is none and verifies them, prompting again after every rejected
//! attempt. It runs as the [`TaskDriver`](crate::coordination::TaskDriver)
//! of an [`AuthTask`], so concurrent pipelines needing a login share one
//! prompt.

pub mod backend;
pub mod flow;
pub mod simulated;

pub use backend::{AuthBackend, CredentialPrompt};
pub use flow::AuthFlow;
pub use simulated::{ScriptedPrompt, SimulatedBackend};

use crate::coordination::{CoordinatedTask, ExclusiveCoordinator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for authentication
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum AuthError {
    #[error("Credentials rejected")]
    Rejected,

    #[error("Credential prompt cancelled")]
    Cancelled,

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Credentials collected by a [`CredentialPrompt`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
        }
    }
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: String,
    pub established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            established_at: Utc::now(),
        }
    }
}

/// Coordinator shared by every login attempt
pub type AuthCoordinator = ExclusiveCoordinator<Session, AuthError>;

/// One pipeline's participation in a shared login
pub type AuthTask = CoordinatedTask<Session, AuthError>;
