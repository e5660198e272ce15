use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Configuration problems are fixed by the host, not retried.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_) | Error::CapabilityMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::BridgeError;

    #[test]
    fn test_capability_missing_display() {
        let err = Error::CapabilityMissing {
            capability: "KeepAliveLock".into(),
            message: "enable desktop-shims".into(),
        };
        assert_eq!(
            err.to_string(),
            "Capability missing: KeepAliveLock - enable desktop-shims"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_bridge_conversion() {
        let err: Error = BridgeError::NotAvailable("focus".into()).into();
        assert!(matches!(err, Error::Bridge(_)));
        assert!(!err.is_configuration());
    }
}
