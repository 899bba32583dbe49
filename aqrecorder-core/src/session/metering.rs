use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::models::audio_models::LevelMeterState;
use crate::models::error::CaptureError;

/// Receives the average power in dB on every metering tick.
///
/// Called on the sampler's own thread; redispatch to a UI thread if needed.
pub type PowerObserver = Arc<dyn Fn(f32) + Send + Sync + 'static>;

/// Periodic poll of a level meter, independent of the capture thread.
///
/// A tick whose query fails is skipped silently; metering never reports
/// errors to the recorder.
pub struct MeteringSampler {
    running: Arc<AtomicBool>,
    ticks_skipped: Arc<AtomicU64>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MeteringSampler {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            ticks_skipped: Arc::new(AtomicU64::new(0)),
            handle: None,
        }
    }

    /// Poll `source` every `period` and forward the average power to `on_sample`.
    ///
    /// Restarts the timer if it is already running.
    pub fn start<S>(&mut self, period: Duration, source: S, on_sample: PowerObserver) -> Result<(), CaptureError>
    where
        S: Fn() -> Result<LevelMeterState, CaptureError> + Send + 'static,
    {
        self.stop();

        let running = Arc::new(AtomicBool::new(true));
        self.running = Arc::clone(&running);
        let ticks_skipped = Arc::clone(&self.ticks_skipped);

        let handle = thread::Builder::new()
            .name("aq-metering".into())
            .spawn(move || {
                let mut next_tick = Instant::now() + period;
                while running.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if now < next_tick {
                        thread::park_timeout(next_tick - now);
                        continue;
                    }
                    next_tick += period;
                    if next_tick < now {
                        next_tick = now + period;
                    }

                    match source() {
                        Ok(level) => on_sample(level.average_power_db),
                        Err(e) => {
                            ticks_skipped.fetch_add(1, Ordering::Relaxed);
                            log::debug!("Skipping metering tick: {}", e);
                        }
                    }
                }
            })
            .map_err(|e| CaptureError::InitializationFailed(format!("failed to spawn metering thread: {}", e)))?;

        self.handle = Some(handle);
        Ok(())
    }

    /// Cancel the timer. Safe to call repeatedly or before `start`.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            // Stopping from inside the observer must not join its own thread.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            handle.thread().unpark();
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.running.load(Ordering::Acquire)
    }

    /// Ticks dropped because the level query failed.
    pub fn ticks_skipped(&self) -> u64 {
        self.ticks_skipped.load(Ordering::Relaxed)
    }
}

impl Default for MeteringSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MeteringSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn collecting_observer() -> (PowerObserver, Arc<Mutex<Vec<f32>>>) {
        let samples = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&samples);
        let observer: PowerObserver = Arc::new(move |db| sink.lock().push(db));
        (observer, samples)
    }

    #[test]
    fn delivers_average_power_each_tick() {
        let (observer, samples) = collecting_observer();
        let mut sampler = MeteringSampler::new();
        sampler
            .start(
                Duration::from_millis(5),
                || {
                    Ok(LevelMeterState {
                        average_power_db: -20.0,
                        peak_power_db: -6.0,
                    })
                },
                observer,
            )
            .unwrap();
        assert!(sampler.is_running());

        thread::sleep(Duration::from_millis(80));
        sampler.stop();

        let samples = samples.lock();
        assert!(samples.len() >= 2, "expected several ticks, got {}", samples.len());
        assert!(samples.iter().all(|&db| db == -20.0));
    }

    #[test]
    fn failed_queries_are_skipped() {
        let (observer, samples) = collecting_observer();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut sampler = MeteringSampler::new();
        sampler
            .start(
                Duration::from_millis(5),
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(CaptureError::MeteringUnavailable("queue disposed".into()))
                },
                observer,
            )
            .unwrap();

        thread::sleep(Duration::from_millis(60));
        assert!(sampler.is_running());
        sampler.stop();

        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert!(sampler.ticks_skipped() >= 2);
        assert!(samples.lock().is_empty());
    }

    #[test]
    fn no_samples_after_stop() {
        let (observer, samples) = collecting_observer();
        let mut sampler = MeteringSampler::new();
        sampler
            .start(Duration::from_millis(2), || Ok(LevelMeterState::default()), observer)
            .unwrap();
        thread::sleep(Duration::from_millis(20));
        sampler.stop();

        let count = samples.lock().len();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(samples.lock().len(), count);
        assert!(!sampler.is_running());
    }

    #[test]
    fn stop_is_idempotent_and_safe_before_start() {
        let mut sampler = MeteringSampler::new();
        sampler.stop();
        sampler.stop();
        assert!(!sampler.is_running());
    }

    #[test]
    fn restart_replaces_previous_timer() {
        let (first, first_samples) = collecting_observer();
        let (second, second_samples) = collecting_observer();
        let mut sampler = MeteringSampler::new();

        sampler
            .start(Duration::from_millis(2), || Ok(LevelMeterState::default()), first)
            .unwrap();
        thread::sleep(Duration::from_millis(10));
        sampler
            .start(Duration::from_millis(2), || Ok(LevelMeterState::default()), second)
            .unwrap();

        let first_count = first_samples.lock().len();
        thread::sleep(Duration::from_millis(20));
        sampler.stop();

        assert_eq!(first_samples.lock().len(), first_count);
        assert!(!second_samples.lock().is_empty());
    }
}
