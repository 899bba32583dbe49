use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecordingState;

/// Event delegate for recorder notifications.
///
/// `on_error` is called from the capture thread; the others from the
/// thread calling `start`/`stop`. Implementations should marshal to the UI
/// thread if needed.
pub trait RecorderDelegate: Send + Sync {
    fn on_state_changed(&self, state: RecordingState);

    /// A buffer could not be written. Recording continues.
    fn on_error(&self, error: &CaptureError);

    fn on_recording_finished(&self, result: &RecordingResult);
}
