//! # aqrecorder-cpal
//!
//! Cross-platform cpal backend for aqrecorder.
//!
//! Provides:
//! - `CpalQueueProvider` / `CpalInputQueue`: buffered input queue over a cpal input stream
//! - `DeviceEnumerator`: input device listing via the default cpal host
//! - `HostAudioSession`: microphone access probe for the default or a named input
//! - `level_meter`: RMS and peak loudness in dBFS
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use aqrecorder_core::Recorder;
//! use aqrecorder_cpal::{CpalQueueProvider, HostAudioSession};
//!
//! let mut recorder = Recorder::new(CpalQueueProvider::default_device(), Arc::new(HostAudioSession::default_device()));
//! recorder.start_recording("take.caf")?;
//! // ...
//! let result = recorder.stop()?;
//! ```

pub mod cpal_queue;
pub mod device_enumerator;
pub mod error;
pub mod level_meter;
pub mod permissions;

pub use cpal_queue::{CpalInputQueue, CpalQueueProvider};
pub use device_enumerator::DeviceEnumerator;
pub use error::BackendError;
pub use permissions::HostAudioSession;
