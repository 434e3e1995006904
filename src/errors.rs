//! Error taxonomy for the engine and its caller-facing RPC projection.

use thiserror::Error;

/// Internal error type propagated through the engine. Variants map 1:1 onto
/// the error kinds enumerated for the admin API; `not-found` is handled
/// separately (recorded as a warning on the calculation state, not
/// propagated as an `Err`).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("permission denied")]
    PermissionDenied,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Unauthenticated => "unauthenticated",
            EngineError::PermissionDenied => "permission-denied",
            EngineError::InvalidArgument(_) => "invalid-argument",
            EngineError::DeadlineExceeded => "deadline-exceeded",
            EngineError::Internal(_) | EngineError::Store(_) => "internal",
        }
    }
}

/// Caller-safe projection of an [`EngineError`]. Never carries a stack
/// trace or the internal error's full detail for `internal` faults — only
/// a fixed, generic message.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RpcError {
    pub code: String,
    pub message: String,
}

impl From<&EngineError> for RpcError {
    fn from(err: &EngineError) -> Self {
        let message = match err {
            EngineError::Unauthenticated => "authentication is required".to_string(),
            EngineError::PermissionDenied => "administrator capability is required".to_string(),
            EngineError::InvalidArgument(msg) => msg.clone(),
            EngineError::DeadlineExceeded => "deadline exceeded".to_string(),
            EngineError::Internal(_) | EngineError::Store(_) => {
                "an internal error occurred".to_string()
            }
        };
        RpcError {
            code: err.code().to_string(),
            message,
        }
    }
}
