//! Loudness measurement over captured sample blocks.

use std::sync::atomic::{AtomicU32, Ordering};

use aqrecorder_core::models::audio_models::{LevelMeterState, SILENCE_DB};

/// Convert a linear amplitude (0.0..=1.0) to dBFS, floored at `SILENCE_DB`.
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    if amplitude <= 0.0 {
        return SILENCE_DB;
    }
    (20.0 * amplitude.log10()).max(SILENCE_DB)
}

/// Running RMS and peak over one block of samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct LevelAccumulator {
    sum_squares: f64,
    peak: f32,
    count: u64,
}

impl LevelAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sample: f32) {
        let magnitude = sample.abs().min(1.0);
        self.sum_squares += (magnitude as f64) * (magnitude as f64);
        self.peak = self.peak.max(magnitude);
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn finish(&self) -> LevelMeterState {
        if self.count == 0 {
            return LevelMeterState::default();
        }
        let rms = (self.sum_squares / self.count as f64).sqrt() as f32;
        LevelMeterState {
            average_power_db: amplitude_to_db(rms),
            peak_power_db: amplitude_to_db(self.peak),
        }
    }
}

/// Latest meter reading, written by the audio callback and read by the sampler.
#[derive(Debug)]
pub struct MeterCell {
    average: AtomicU32,
    peak: AtomicU32,
}

impl MeterCell {
    pub fn new() -> Self {
        let silent = LevelMeterState::default();
        Self {
            average: AtomicU32::new(silent.average_power_db.to_bits()),
            peak: AtomicU32::new(silent.peak_power_db.to_bits()),
        }
    }

    pub fn store(&self, level: LevelMeterState) {
        self.average.store(level.average_power_db.to_bits(), Ordering::Relaxed);
        self.peak.store(level.peak_power_db.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> LevelMeterState {
        LevelMeterState {
            average_power_db: f32::from_bits(self.average.load(Ordering::Relaxed)),
            peak_power_db: f32::from_bits(self.peak.load(Ordering::Relaxed)),
        }
    }
}

impl Default for MeterCell {
    fn default() -> Self {
        Self::new()
    }
}
