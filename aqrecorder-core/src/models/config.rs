use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::format::AudioFormat;

/// Default hard cap on a single capture buffer, in bytes.
pub const DEFAULT_MAX_BUFFER_SIZE: u32 = 0x50000;

/// Container used for the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerType {
    /// Core Audio Format: holds PCM and packet-described VBR streams.
    Caf,
    /// RIFF WAVE: linear PCM only.
    Wav,
}

impl ContainerType {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Caf => "caf",
            Self::Wav => "wav",
        }
    }
}

/// Configuration for a recorder.
#[derive(Debug, Clone)]
pub struct RecorderConfiguration {
    /// Requested sample rate in Hz (default: 16000). The hardware may refine it.
    pub sample_rate: f64,

    /// Bit depth for PCM capture (default: 16). Valid values: 16, 24, 32.
    pub bit_depth: u16,

    /// Number of channels (default: 1).
    pub channels: u16,

    /// Output container (default: CAF).
    pub container: ContainerType,

    /// Number of capture buffers kept in rotation (default: 3).
    pub buffer_count: usize,

    /// Target duration of one capture buffer in seconds (default: 0.5).
    pub buffer_duration_secs: f64,

    /// Upper bound on a single buffer's size in bytes.
    pub max_buffer_size: u32,

    /// Level metering poll period (default: 25ms).
    pub metering_period: Duration,

    /// Enable level metering and the power sampler (default: true).
    pub enable_metering: bool,

    /// Write `<file>.metadata.json` next to the recording on stop (default: false).
    pub write_metadata_sidecar: bool,
}

impl RecorderConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate <= 0.0 || !self.sample_rate.is_finite() {
            return Err("sample rate must be positive".into());
        }
        if ![16, 24, 32].contains(&self.bit_depth) {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.buffer_count < 2 {
            return Err(format!("at least 2 buffers required, got {}", self.buffer_count));
        }
        if !(self.buffer_duration_secs.is_finite() && self.buffer_duration_secs > 0.0) {
            return Err("buffer duration must be positive".into());
        }
        if self.max_buffer_size == 0 {
            return Err("max buffer size must be positive".into());
        }
        if self.enable_metering && self.metering_period.is_zero() {
            return Err("metering period must be non-zero".into());
        }
        Ok(())
    }

    /// The linear PCM format requested by this configuration.
    pub fn requested_format(&self) -> AudioFormat {
        AudioFormat::linear_pcm(self.sample_rate, self.bit_depth as u32, self.channels as u32)
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            sample_rate: 16000.0,
            bit_depth: 16,
            channels: 1,
            container: ContainerType::Caf,
            buffer_count: 3,
            buffer_duration_secs: 0.5,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            metering_period: Duration::from_millis(25),
            enable_metering: true,
            write_metadata_sidecar: false,
        }
    }
}
