use thiserror::Error;

/// Errors surfaced by the recorder and its collaborators.
///
/// Redundant `start`/`stop` calls are not errors: they return `Ok` without
/// touching any state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    #[error("create failed: {0}")]
    CreateFailed(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("metering unavailable: {0}")]
    MeteringUnavailable(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl CaptureError {
    /// Whether this error was raised while setting up a session, as opposed
    /// to during steady-state capture.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::DeviceNotAvailable
                | Self::InitializationFailed(_)
                | Self::CreateFailed(_)
                | Self::ConfigurationFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = CaptureError::WriteFailed("disk full".into());
        assert_eq!(err.to_string(), "write failed: disk full");
    }

    #[test]
    fn steady_state_errors_are_not_setup_failures() {
        assert!(CaptureError::CreateFailed("x".into()).is_setup_failure());
        assert!(CaptureError::PermissionDenied.is_setup_failure());
        assert!(!CaptureError::WriteFailed("x".into()).is_setup_failure());
        assert!(!CaptureError::MeteringUnavailable("x".into()).is_setup_failure());
    }
}
