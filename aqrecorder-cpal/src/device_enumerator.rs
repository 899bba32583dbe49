//! Input device enumeration via the cpal host.
//!
//! cpal identifies devices by name only, so names double as ids. Repeated
//! names get a numeric suffix to keep ids unique.

use cpal::traits::{DeviceTrait, HostTrait};

use aqrecorder_core::models::audio_models::AudioSource;

use crate::error::BackendError;

/// Audio device enumerator over the default cpal host.
pub struct DeviceEnumerator {
    host: cpal::Host,
}

impl DeviceEnumerator {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// List capture-capable devices, marking the system default.
    pub fn list_input_devices(&self) -> Result<Vec<AudioSource>, BackendError> {
        let names: Vec<String> = self
            .host
            .input_devices()?
            .filter_map(|device| device.name().ok())
            .collect();
        let default_name = self.default_input_device_name();
        Ok(sources_from_names(names, default_name.as_deref()))
    }

    pub fn default_input_device_name(&self) -> Option<String> {
        self.host
            .default_input_device()
            .and_then(|device| device.name().ok())
    }

    /// Resolve a device by id as returned from `list_input_devices`, or the
    /// default input when `id` is `None`.
    pub fn input_device(&self, id: Option<&str>) -> Result<cpal::Device, BackendError> {
        let Some(id) = id else {
            return self.host.default_input_device().ok_or(BackendError::NoInputDevice);
        };

        let devices: Vec<cpal::Device> = self.host.input_devices()?.collect();
        let names: Vec<String> = devices
            .iter()
            .map(|device| device.name().unwrap_or_default())
            .collect();
        sources_from_names(names, None)
            .iter()
            .position(|source| source.id == id)
            .and_then(|index| devices.into_iter().nth(index))
            .ok_or_else(|| BackendError::DeviceNotFound(id.to_string()))
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

fn sources_from_names(names: Vec<String>, default_name: Option<&str>) -> Vec<AudioSource> {
    let mut sources: Vec<AudioSource> = Vec::with_capacity(names.len());
    let mut default_claimed = false;

    for name in names {
        let seen = sources.iter().filter(|s| s.name == name).count();
        let id = if seen == 0 {
            name.clone()
        } else {
            format!("{} #{}", name, seen + 1)
        };
        let is_default = !default_claimed && default_name == Some(name.as_str());
        default_claimed |= is_default;
        sources.push(AudioSource { id, name, is_default });
    }
    sources
}
