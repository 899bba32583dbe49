//! # aqrecorder-core
//!
//! Platform-agnostic buffered audio recorder.
//!
//! Drives a callback-based hardware input queue with a small rotating pool
//! of capture buffers, writes every filled buffer to an audio file at a
//! running packet cursor, and samples the queue's level meter for a power
//! observer. Platform backends implement `AudioQueueProvider` and plug into
//! the generic `Recorder`.
//!
//! ## Architecture
//!
//! ```text
//! aqrecorder-core (this crate)
//! ├── traits/       ← AudioQueueProvider, InputQueue, PacketSink, AudioSession, RecorderDelegate
//! ├── models/       ← AudioFormat, CaptureError, RecordingState, RecorderConfiguration, etc.
//! ├── processing/   ← BufferPool, buffer sizing, CAF and WAV header generation
//! ├── session/      ← Recorder (generic orchestrator), MeteringSampler
//! └── storage/      ← StreamingFileWriter, metadata sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioSource, LevelMeterState, RecorderDiagnostics, SILENCE_DB};
pub use models::config::{ContainerType, RecorderConfiguration};
pub use models::error::CaptureError;
pub use models::format::{AudioFormat, FormatFlags, FormatId, PacketLayout};
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::RecordingState;
pub use processing::buffer_pool::{BufferPool, CaptureBuffer, PacketDescription};
pub use session::metering::{MeteringSampler, PowerObserver};
pub use session::recorder::Recorder;
pub use storage::file_writer::{FileTarget, StreamingFileWriter};
pub use traits::audio_session::{AudioSession, PreauthorizedSession, RecordPermission};
pub use traits::input_queue::{AudioQueueProvider, BufferRequeue, InputCallback, InputQueue};
pub use traits::packet_sink::{OutputTarget, PacketSink};
pub use traits::recorder_delegate::RecorderDelegate;
