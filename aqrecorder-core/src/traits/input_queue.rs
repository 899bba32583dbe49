use std::sync::Arc;

use crate::models::audio_models::{AudioSource, LevelMeterState};
use crate::models::error::CaptureError;
use crate::models::format::AudioFormat;
use crate::processing::buffer_pool::CaptureBuffer;

/// Completion handler invoked once per filled buffer.
///
/// Fires on the queue's dedicated capture thread, never concurrently with
/// itself for the same queue. Ownership of the buffer passes to the handler;
/// it gives the buffer back through the `BufferRequeue` capability passed
/// alongside it, or keeps it.
pub type InputCallback = Arc<dyn Fn(&dyn BufferRequeue, CaptureBuffer) + Send + Sync + 'static>;

/// Ability to hand an empty buffer back to the hardware for filling.
pub trait BufferRequeue {
    /// Fails once the queue has been disposed; the buffer is dropped then.
    fn enqueue(&self, buffer: CaptureBuffer) -> Result<(), CaptureError>;
}

/// A buffered, callback-driven hardware input queue.
pub trait InputQueue: BufferRequeue + Send + Sync {
    /// The concrete format the hardware settled on.
    fn format(&self) -> Result<AudioFormat, CaptureError>;

    /// Largest packet the queue can produce, for variable bit rate formats.
    fn max_output_packet_size(&self) -> Result<u32, CaptureError>;

    fn set_level_metering(&self, enabled: bool) -> Result<(), CaptureError>;

    /// Current loudness. Fails when metering is off or the queue is gone.
    fn current_level(&self) -> Result<LevelMeterState, CaptureError>;

    fn start(&self) -> Result<(), CaptureError>;

    /// Stop capturing. Blocks until every filled buffer, including a
    /// partially filled one, has been delivered to the callback.
    fn stop(&self) -> Result<(), CaptureError>;

    /// Release the queue. Buffers it still owns are dropped with it.
    fn dispose(&self) -> Result<(), CaptureError>;
}

/// Factory for input queues on one audio device.
///
/// Implemented by:
/// - `CpalQueueProvider` (aqrecorder-cpal)
pub trait AudioQueueProvider: Send + Sync {
    /// Whether the backing device is present.
    fn is_available(&self) -> bool;

    /// Create an input queue for `format` that delivers buffers to `callback`.
    ///
    /// Returns `PermissionDenied` if the platform refuses microphone access.
    fn new_input(&self, format: &AudioFormat, callback: InputCallback) -> Result<Arc<dyn InputQueue>, CaptureError>;

    /// Information about the device backing this provider.
    fn device_info(&self) -> AudioSource;
}
