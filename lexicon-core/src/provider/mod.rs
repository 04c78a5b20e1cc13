//! Language-model backends behind a single "conversation in, reply out" capability.
//!
//! The assessment client only ever sees [`Provider`]; which backend answers is
//! decided once from [`Config`] by [`build_provider`].

mod cloud;
mod local;

pub use cloud::CloudProvider;
pub use local::{LocalProvider, DEFAULT_LOCAL_URL};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, ProviderKind};

/// Errors from a provider call or from constructing a backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Could not construct {backend} backend: {reason}")]
    Construction {
        backend: &'static str,
        reason: String,
    },

    #[error("No messages to send")]
    EmptyConversation,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("No content received from model")]
    EmptyReply,

    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

impl From<claude::Error> for ProviderError {
    fn from(err: claude::Error) -> Self {
        match err {
            claude::Error::Network(msg) => ProviderError::Transport(msg),
            claude::Error::Api { status, message } => ProviderError::Status {
                status,
                body: message,
            },
            claude::Error::Parse(msg) => ProviderError::Decode(msg),
            other @ (claude::Error::NoApiKey | claude::Error::Config(_)) => {
                ProviderError::Construction {
                    backend: "cloud",
                    reason: other.to_string(),
                }
            }
        }
    }
}

/// Who spoke a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Model,
}

/// One role-tagged fragment of the conversation sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            content: content.into(),
        }
    }
}

/// A backend that turns an ordered conversation into the model's reply text.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send the conversation and return the raw reply text.
    async fn complete(&self, conversation: &[ConversationTurn]) -> Result<String, ProviderError>;

    /// Short human-readable backend name, shown in the footer.
    fn name(&self) -> &str;
}

/// The provider chosen for a configuration, plus anything the player should be told.
pub struct ProviderSelection {
    pub provider: Arc<dyn Provider>,
    pub notice: Option<String>,
}

/// Build the backend selected by `config`.
///
/// A cloud backend that cannot be constructed falls back to the local one so
/// the game stays playable offline.
pub fn build_provider(config: &Config) -> ProviderSelection {
    let local = || -> Arc<dyn Provider> {
        Arc::new(LocalProvider::new(
            config.effective_local_url().unwrap_or(DEFAULT_LOCAL_URL),
        ))
    };

    match config.provider {
        ProviderKind::Cloud => {
            match CloudProvider::new(config.effective_api_key(), config.effective_cloud_model()) {
                Ok(cloud) => ProviderSelection {
                    provider: Arc::new(cloud),
                    notice: None,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "cloud backend unavailable, using local backend");
                    ProviderSelection {
                        provider: local(),
                        notice: Some(format!("{e}. Falling back to the local model.")),
                    }
                }
            }
        }
        ProviderKind::Local | ProviderKind::Unset => ProviderSelection {
            provider: local(),
            notice: None,
        },
    }
}
