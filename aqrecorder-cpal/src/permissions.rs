//! Microphone access probe.
//!
//! cpal has no permission API. Access is inferred from whether the input
//! device will report a stream configuration.

use cpal::traits::DeviceTrait;

use aqrecorder_core::models::error::CaptureError;
use aqrecorder_core::traits::audio_session::{AudioSession, RecordPermission};

use crate::device_enumerator::DeviceEnumerator;
use crate::error::BackendError;

/// What probing an input device found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceProbe {
    NoDevice,
    Refused,
    Usable,
}

fn permission_from_probe(probe: DeviceProbe) -> RecordPermission {
    match probe {
        DeviceProbe::Usable => RecordPermission::Granted,
        DeviceProbe::Refused => RecordPermission::Denied,
        DeviceProbe::NoDevice => RecordPermission::Undetermined,
    }
}

fn probe_from_lookup_error(err: &BackendError) -> DeviceProbe {
    match err {
        BackendError::NoInputDevice | BackendError::DeviceNotFound(_) => DeviceProbe::NoDevice,
        other if other.is_access_denied() => DeviceProbe::Refused,
        other => {
            log::warn!("Input device lookup failed: {}", other);
            DeviceProbe::NoDevice
        }
    }
}

fn probe_input(device_id: Option<&str>) -> DeviceProbe {
    let device = match DeviceEnumerator::new().input_device(device_id) {
        Ok(device) => device,
        Err(e) => return probe_from_lookup_error(&e),
    };
    match device.default_input_config() {
        Ok(_) => DeviceProbe::Usable,
        Err(e) => {
            log::warn!("Input device refused config query: {}", e);
            DeviceProbe::Refused
        }
    }
}

/// Check whether the default microphone can be opened.
pub fn check_microphone_permission() -> RecordPermission {
    permission_from_probe(probe_input(None))
}

/// Audio session backed by one host input device.
///
/// Pair it with a `CpalQueueProvider` for the same device id so the
/// permission check probes the device that will actually be opened.
#[derive(Debug, Clone, Default)]
pub struct HostAudioSession {
    device_id: Option<String>,
}

impl HostAudioSession {
    /// Session for the system default input.
    pub fn default_device() -> Self {
        Self::default()
    }

    /// Session for a device id as listed by `DeviceEnumerator`.
    pub fn for_device(id: impl Into<String>) -> Self {
        Self {
            device_id: Some(id.into()),
        }
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }
}

impl AudioSession for HostAudioSession {
    fn record_permission(&self) -> RecordPermission {
        permission_from_probe(probe_input(self.device_id()))
    }

    fn set_active(&self, active: bool) -> Result<(), CaptureError> {
        log::debug!(
            "Audio session for {} {}",
            self.device_id().unwrap_or("default input"),
            if active { "activated" } else { "deactivated" }
        );
        Ok(())
    }
}
