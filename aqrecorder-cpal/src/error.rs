use thiserror::Error;

use aqrecorder_core::models::error::CaptureError;

/// Failures raised by the cpal host before they cross into the recorder.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no input device available")]
    NoInputDevice,

    #[error("input device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to enumerate input devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("failed to pause input stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),

    #[error("unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("unsupported capture format: {0}")]
    UnsupportedFormat(String),

    #[error("capture thread failed: {0}")]
    Thread(String),
}

impl BackendError {
    /// Host-specific description, when the backend only gave us text.
    fn backend_description(&self) -> Option<&str> {
        match self {
            Self::Devices(cpal::DevicesError::BackendSpecific { err })
            | Self::DefaultConfig(cpal::DefaultStreamConfigError::BackendSpecific { err })
            | Self::BuildStream(cpal::BuildStreamError::BackendSpecific { err })
            | Self::Play(cpal::PlayStreamError::BackendSpecific { err }) => Some(&err.description),
            _ => None,
        }
    }

    /// Whether the host refused access to the input device.
    pub fn is_access_denied(&self) -> bool {
        self.backend_description().is_some_and(|description| {
            let description = description.to_ascii_lowercase();
            ["access denied", "permission denied", "not permitted", "e_accessdenied"]
                .iter()
                .any(|needle| description.contains(needle))
        })
    }
}

impl From<BackendError> for CaptureError {
    fn from(err: BackendError) -> Self {
        if err.is_access_denied() {
            return CaptureError::PermissionDenied;
        }
        match err {
            BackendError::NoInputDevice
            | BackendError::DeviceNotFound(_)
            | BackendError::BuildStream(cpal::BuildStreamError::DeviceNotAvailable)
            | BackendError::Play(cpal::PlayStreamError::DeviceNotAvailable) => {
                CaptureError::DeviceNotAvailable
            }
            BackendError::UnsupportedFormat(msg) => CaptureError::ConfigurationFailed(msg),
            other => CaptureError::InitializationFailed(other.to_string()),
        }
    }
}
