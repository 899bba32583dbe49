use serde::{Deserialize, Serialize};

/// Level meter reading for digital silence.
pub const SILENCE_DB: f32 = -160.0;

/// An audio input device available for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

/// Snapshot of the hardware queue's level meter, in decibels full scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelMeterState {
    pub average_power_db: f32,
    pub peak_power_db: f32,
}

impl Default for LevelMeterState {
    fn default() -> Self {
        Self {
            average_power_db: SILENCE_DB,
            peak_power_db: SILENCE_DB,
        }
    }
}

/// Counters for debugging a recording session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderDiagnostics {
    pub buffers_completed: u64,
    pub packets_written: u64,
    pub bytes_captured: u64,
    pub write_failures: u64,
    pub buffers_parked: u64,
    /// Buffers with audio that arrived while no output was open.
    pub buffers_dropped: u64,
    pub format: String,
}
