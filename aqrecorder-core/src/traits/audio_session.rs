use crate::models::error::CaptureError;

/// Microphone permission as reported by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPermission {
    Undetermined,
    Denied,
    Granted,
}

/// Handle to the platform audio session, passed explicitly to the recorder.
///
/// Permission prompts and session categories are negotiated by the host
/// before `start`; the recorder only checks the outcome.
pub trait AudioSession: Send + Sync {
    fn record_permission(&self) -> RecordPermission;

    /// Activate or deactivate the session around a recording.
    fn set_active(&self, _active: bool) -> Result<(), CaptureError> {
        Ok(())
    }
}

/// Session for hosts that authorize capture out of band.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreauthorizedSession;

impl AudioSession for PreauthorizedSession {
    fn record_permission(&self) -> RecordPermission {
        RecordPermission::Granted
    }
}
