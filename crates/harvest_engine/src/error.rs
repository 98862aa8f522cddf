use thiserror::Error;

/// Hard errors of the harvesting engine.
///
/// Everything else (unreachable blocks, failed digs, deaths, timeouts) is
/// reported inside a `CollectReport` rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarvestError {
    #[error("block type \"{0}\" is not known to the world")]
    UnknownMaterial(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("harvest engine is not running")]
    EngineStopped,
}

/// Failure reported by a navigator, interactor or other async collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
