use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Health store connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health store permission check failed: {0}")]
    PermissionDenied(String),

    #[error("Health store query failed: {0}")]
    QueryFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
