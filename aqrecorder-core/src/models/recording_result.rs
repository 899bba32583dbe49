use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::ContainerType;
use super::format::AudioFormat;

/// Result returned when a recording stops.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: Option<PathBuf>,
    pub packets_written: u64,
    pub duration_secs: f64,
    pub metadata: RecordingMetadata,
    pub checksum: Option<String>,
}

/// Metadata stored alongside a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub duration_secs: f64,
    pub file_path: Option<String>,
    pub checksum: Option<String>,
    pub created_at: String,
    pub container: Option<ContainerType>,
    pub sample_rate: f64,
    pub channels: u32,
    pub bits_per_channel: u32,
    pub packets_written: u64,
    pub write_failures: u64,
}

impl RecordingMetadata {
    pub fn new(
        format: &AudioFormat,
        container: Option<ContainerType>,
        file_path: Option<&str>,
        checksum: Option<&str>,
        packets_written: u64,
        write_failures: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            duration_secs: format.duration_of_packets(packets_written),
            file_path: file_path.map(str::to_string),
            checksum: checksum.map(str::to_string),
            created_at: chrono::Utc::now().to_rfc3339(),
            container,
            sample_rate: format.sample_rate,
            channels: format.channels_per_frame,
            bits_per_channel: format.bits_per_channel,
            packets_written,
            write_failures,
        }
    }
}
