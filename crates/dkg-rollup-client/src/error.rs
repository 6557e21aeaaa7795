//! Error types for chain clients and the rollup worker

use thiserror::Error;

use dkg_rollup_actions::{ActionState, CodecError};
use dkg_rollup_contract::ContractError;
use dkg_rollup_program::RollupError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The contract's stored state moved past the proof's initial state
    #[error("Stale rollup submission: {0}")]
    StaleSubmission(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// Fetched actions do not fold into the state the contract reports
    #[error("Action replay mismatch: expected {expected}, replayed {actual}")]
    ReplayMismatch {
        expected: ActionState,
        actual: ActionState,
    },

    /// A fetched action failed the codec checks
    #[error("Malformed action: {0}")]
    Action(#[from] CodecError),

    #[error("Rollup failed: {0}")]
    Rollup(#[from] RollupError),

    /// The blocking proving task panicked or was aborted
    #[error("Proving task failed: {0}")]
    ProvingTask(#[from] tokio::task::JoinError),

    #[error("Contract rejected call: {0}")]
    Contract(ContractError),
}

impl ClientError {
    /// Worth retrying with the same query
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Request(e) => e.is_timeout() || e.is_connect(),
            ClientError::ApiError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<ContractError> for ClientError {
    fn from(error: ContractError) -> Self {
        match error {
            ContractError::StaleProof { .. } => ClientError::StaleSubmission(error.to_string()),
            other => ClientError::Contract(other),
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
