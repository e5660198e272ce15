use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Listener not registered: {0}")]
    NotRegistered(String),

    #[error("Platform resource already released: {0}")]
    Released(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Errors that only report a redundant call and leave the platform in
    /// the requested state.
    pub fn is_benign(&self) -> bool {
        matches!(self, BridgeError::NotRegistered(_) | BridgeError::Released(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
