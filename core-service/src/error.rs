use core_health::HealthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Health(#[from] HealthError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Stable code sent with bridge error replies.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::UnsupportedMethod(_) => "UNSUPPORTED_METHOD",
            ServiceError::InvalidArguments(_) => "INVALID_ARGUMENTS",
            ServiceError::Health(e) => match e {
                HealthError::Connection(_) => "CONNECTION_ERROR",
                HealthError::Permission(_)
                | HealthError::UiUnavailable
                | HealthError::Settings(_) => "PERMISSION_ERROR",
                HealthError::InvalidRange { .. } => "INVALID_ARGUMENTS",
                HealthError::Timeout(_) => "TIMEOUT",
                HealthError::Query { .. }
                | HealthError::LabelParse { .. }
                | HealthError::NotBucketed(_)
                | HealthError::InvalidBucketWidth(_)
                | HealthError::InvalidOffset(_)
                | HealthError::TaskFailed(_) => "QUERY_ERROR",
            },
            ServiceError::InitializationFailed(_)
            | ServiceError::Runtime(_)
            | ServiceError::Serialization(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
