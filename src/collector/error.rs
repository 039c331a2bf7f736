//! Collector error types.

/// Errors that can occur while running the collector.
#[derive(thiserror::Error, Debug)]
pub enum CollectorError {
    /// Failed to bind to address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Server error.
    #[error("Server error: {0}")]
    ServerError(#[from] std::io::Error),

    /// Submitted event was rejected.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let error = CollectorError::BindError {
            address: "0.0.0.0:5000".to_string(),
            source: io_error,
        };
        assert!(error.to_string().contains("Failed to bind to 0.0.0.0:5000"));
        assert!(error.to_string().contains("address in use"));
    }

    #[test]
    fn test_invalid_event_display() {
        let error = CollectorError::InvalidEvent("expected a JSON object".to_string());
        assert_eq!(error.to_string(), "Invalid event: expected a JSON object");
    }

    #[test]
    fn test_server_error_display() {
        let error = CollectorError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        ));
        assert_eq!(error.to_string(), "Server error: connection reset");
    }
}
