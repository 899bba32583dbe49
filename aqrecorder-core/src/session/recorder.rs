use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{AudioSource, RecorderDiagnostics};
use crate::models::config::RecorderConfiguration;
use crate::models::error::CaptureError;
use crate::models::format::AudioFormat;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::models::state::{RecordingState, SharedRecordingState};
use crate::processing::buffer_pool::{self, BufferPool, CaptureBuffer};
use crate::session::metering::{MeteringSampler, PowerObserver};
use crate::storage::file_writer::FileTarget;
use crate::storage::metadata;
use crate::traits::audio_session::{AudioSession, RecordPermission};
use crate::traits::input_queue::{AudioQueueProvider, BufferRequeue, InputCallback, InputQueue};
use crate::traits::packet_sink::{OutputTarget, PacketSink};
use crate::traits::recorder_delegate::RecorderDelegate;

/// State shared between the control thread and the capture thread.
///
/// The completion handler holds an `Arc` to this and nothing else, so the
/// hardware queue never needs a pointer back to the recorder.
struct CaptureContext {
    state: SharedRecordingState,
    packet_cursor: AtomicU64,
    sink: Mutex<Option<Box<dyn PacketSink>>>,
    pool: Mutex<Option<BufferPool>>,
    delegate: Mutex<Option<Arc<dyn RecorderDelegate>>>,
    buffers_completed: AtomicU64,
    bytes_captured: AtomicU64,
    write_failures: AtomicU64,
    buffers_parked: AtomicU64,
    buffers_dropped: AtomicU64,
}

impl CaptureContext {
    fn new() -> Self {
        Self {
            state: SharedRecordingState::new(),
            packet_cursor: AtomicU64::new(0),
            sink: Mutex::new(None),
            pool: Mutex::new(None),
            delegate: Mutex::new(None),
            buffers_completed: AtomicU64::new(0),
            bytes_captured: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            buffers_parked: AtomicU64::new(0),
            buffers_dropped: AtomicU64::new(0),
        }
    }

    fn reset_counters(&self) {
        self.packet_cursor.store(0, Ordering::Release);
        self.buffers_completed.store(0, Ordering::Relaxed);
        self.bytes_captured.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.buffers_parked.store(0, Ordering::Relaxed);
        self.buffers_dropped.store(0, Ordering::Relaxed);
    }

    fn delegate(&self) -> Option<Arc<dyn RecorderDelegate>> {
        self.delegate.lock().clone()
    }

    /// Completion handler body. Runs on the capture thread.
    ///
    /// Writes the buffer at the current cursor, advances the cursor by the
    /// packets written, then either returns the buffer to the hardware or,
    /// once recording has stopped, parks it in the pool. A failed write is
    /// reported and skipped; the cursor stays put and capture continues.
    fn handle_completed_buffer(&self, queue: &dyn BufferRequeue, mut buffer: CaptureBuffer) {
        self.buffers_completed.fetch_add(1, Ordering::Relaxed);

        if !buffer.is_empty() {
            let cursor = self.packet_cursor.load(Ordering::Acquire);
            let outcome = self
                .sink
                .lock()
                .as_mut()
                .map(|sink| sink.append(buffer.audio_data(), buffer.packet_descriptions(), cursor));

            match outcome {
                Some(Ok(packets)) => {
                    self.packet_cursor.fetch_add(packets as u64, Ordering::AcqRel);
                    self.bytes_captured
                        .fetch_add(buffer.valid_bytes() as u64, Ordering::Relaxed);
                }
                Some(Err(e)) => {
                    self.write_failures.fetch_add(1, Ordering::Relaxed);
                    log::error!("Failed to write buffer {} at packet {}: {}", buffer.index(), cursor, e);
                    if let Some(delegate) = self.delegate() {
                        delegate.on_error(&e);
                    }
                }
                None => {
                    self.buffers_dropped.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "No open output; dropped {} bytes from buffer {}",
                        buffer.valid_bytes(),
                        buffer.index()
                    );
                }
            }
        }

        buffer.clear();

        if !self.state.is_recording() {
            self.park(buffer);
            return;
        }

        if let Err(e) = queue.enqueue(buffer) {
            log::warn!("Failed to re-enqueue capture buffer: {}", e);
        }
    }

    fn park(&self, buffer: CaptureBuffer) {
        self.buffers_parked.fetch_add(1, Ordering::Relaxed);
        if let Some(pool) = self.pool.lock().as_ref() {
            pool.reclaim(buffer);
        }
    }
}

/// Buffered audio recorder.
///
/// Generic over the hardware backend via `AudioQueueProvider`. Owns the
/// input queue, the buffer pool, the output sink and the state machine.
///
/// ```text
/// [hardware] → filled buffer → [completion handler] → [PacketSink]
///     ↑                               │
///     └────────── re-enqueue ─────────┘   (while recording)
///
/// [MeteringSampler] → queue level meter → PowerObserver
/// ```
///
/// `start` and `stop` must be called from one control thread at a time.
pub struct Recorder<P: AudioQueueProvider> {
    provider: P,
    session: Arc<dyn AudioSession>,
    config: RecorderConfiguration,
    format: Option<AudioFormat>,
    active_format: Option<AudioFormat>,
    context: Arc<CaptureContext>,
    queue: Option<Arc<dyn InputQueue>>,
    sampler: MeteringSampler,
    power_observer: Arc<Mutex<Option<PowerObserver>>>,
}

impl<P: AudioQueueProvider> Recorder<P> {
    pub fn new(provider: P, session: Arc<dyn AudioSession>) -> Self {
        Self {
            provider,
            session,
            config: RecorderConfiguration::default(),
            format: None,
            active_format: None,
            context: Arc::new(CaptureContext::new()),
            queue: None,
            sampler: MeteringSampler::new(),
            power_observer: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_configuration(
        provider: P,
        session: Arc<dyn AudioSession>,
        config: RecorderConfiguration,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        let mut recorder = Self::new(provider, session);
        recorder.config = config;
        Ok(recorder)
    }

    pub fn configuration(&self) -> &RecorderConfiguration {
        &self.config
    }

    /// Replace the configuration. Only allowed while idle.
    pub fn configure(&mut self, config: RecorderConfiguration) -> Result<(), CaptureError> {
        if !self.state().is_idle() {
            return Err(CaptureError::ConfigurationFailed(
                "can only configure while idle".into(),
            ));
        }
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        self.config = config;
        self.format = None;
        Ok(())
    }

    /// Request an explicit format instead of the one built from the configuration.
    pub fn set_format(&mut self, format: AudioFormat) -> Result<(), CaptureError> {
        if !self.state().is_idle() {
            return Err(CaptureError::ConfigurationFailed(
                "can only change format while idle".into(),
            ));
        }
        format.validate().map_err(CaptureError::ConfigurationFailed)?;
        self.format = Some(format);
        Ok(())
    }

    /// The negotiated format while recording, otherwise the requested one.
    pub fn format(&self) -> AudioFormat {
        self.active_format
            .or(self.format)
            .unwrap_or_else(|| self.config.requested_format())
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecorderDelegate>) {
        *self.context.delegate.lock() = Some(delegate);
    }

    /// Register the single power observer, replacing any previous one.
    pub fn set_power_observer(&mut self, observer: Option<PowerObserver>) {
        *self.power_observer.lock() = observer;
    }

    pub fn state(&self) -> RecordingState {
        self.context.state.current()
    }

    pub fn is_recording(&self) -> bool {
        self.context.state.is_recording()
    }

    /// Packets written to the output so far this session.
    pub fn packet_cursor(&self) -> u64 {
        self.context.packet_cursor.load(Ordering::Acquire)
    }

    pub fn diagnostics(&self) -> RecorderDiagnostics {
        let ctx = &self.context;
        RecorderDiagnostics {
            buffers_completed: ctx.buffers_completed.load(Ordering::Relaxed),
            packets_written: ctx.packet_cursor.load(Ordering::Acquire),
            bytes_captured: ctx.bytes_captured.load(Ordering::Relaxed),
            write_failures: ctx.write_failures.load(Ordering::Relaxed),
            buffers_parked: ctx.buffers_parked.load(Ordering::Relaxed),
            buffers_dropped: ctx.buffers_dropped.load(Ordering::Relaxed),
            format: self.active_format.map(|f| f.to_string()).unwrap_or_default(),
        }
    }

    /// The input device, if the backend reports one available.
    pub fn available_input(&self) -> Option<AudioSource> {
        self.provider
            .is_available()
            .then(|| self.provider.device_info())
    }

    /// Record to `path` in the configured container.
    pub fn start_recording(&mut self, path: impl Into<PathBuf>) -> Result<(), CaptureError> {
        let target = FileTarget::new(path, self.config.container);
        self.start(&target)
    }

    /// Start recording into `target`. Transitions: idle → preparing → recording.
    ///
    /// A no-op if a recording is already running. Any failing step releases
    /// what was acquired and leaves the recorder idle.
    pub fn start(&mut self, target: &dyn OutputTarget) -> Result<(), CaptureError> {
        let state = self.state();
        if !state.is_idle() {
            log::debug!("start ignored: recorder is {}", state);
            return Ok(());
        }

        self.config.validate().map_err(CaptureError::ConfigurationFailed)?;
        if self.session.record_permission() == RecordPermission::Denied {
            return Err(CaptureError::PermissionDenied);
        }

        self.set_state(RecordingState::Preparing);
        match self.prepare_and_start(target) {
            Ok(()) => {
                log::info!("Recording started ({})", self.format());
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to start recording: {}", e);
                self.rollback();
                self.set_state(RecordingState::Idle);
                Err(e)
            }
        }
    }

    /// Stop recording and finalize the output. Transitions: recording → stopping → idle.
    ///
    /// Returns `Ok(None)` if nothing was recording. Blocks until the
    /// hardware has delivered every filled buffer.
    pub fn stop(&mut self) -> Result<Option<RecordingResult>, CaptureError> {
        // Flip state before touching the hardware so a racing completion
        // handler parks its buffer instead of re-enqueueing it.
        if !self
            .context
            .state
            .transition(RecordingState::Recording, RecordingState::Stopping)
        {
            log::debug!("stop ignored: recorder is {}", self.state());
            return Ok(None);
        }
        self.notify_state(RecordingState::Stopping);

        self.sampler.stop();

        if let Some(queue) = self.queue.take() {
            if let Err(e) = queue.stop() {
                log::error!("Failed to stop input queue: {}", e);
            }
            if let Err(e) = queue.dispose() {
                log::error!("Failed to dispose input queue: {}", e);
            }
        }

        if let Some(pool) = self.context.pool.lock().take() {
            pool.release();
        }

        let sink = self.context.sink.lock().take();
        let result = self.finish(sink);

        if let Err(e) = self.session.set_active(false) {
            log::warn!("Failed to deactivate audio session: {}", e);
        }
        self.active_format = None;
        self.set_state(RecordingState::Idle);

        let result = result?;
        if let Some(delegate) = self.context.delegate() {
            delegate.on_recording_finished(&result);
        }
        Ok(Some(result))
    }

    // --- Internal helpers ---

    fn prepare_and_start(&mut self, target: &dyn OutputTarget) -> Result<(), CaptureError> {
        self.session.set_active(true)?;

        let requested = *self
            .format
            .get_or_insert_with(|| self.config.requested_format());

        let queue = self.provider.new_input(&requested, self.completion_handler())?;
        self.queue = Some(Arc::clone(&queue));

        let format = queue.format()?;
        format
            .validate()
            .map_err(|e| CaptureError::InitializationFailed(format!("hardware format rejected: {}", e)))?;
        if format != requested {
            log::info!("Hardware refined format from {} to {}", requested, format);
        }

        let sink = target.open(&format)?;
        *self.context.sink.lock() = Some(sink);

        let buffer_size = buffer_pool::derive_buffer_size(
            &format,
            self.config.buffer_duration_secs,
            self.config.max_buffer_size,
            || queue.max_output_packet_size(),
        )?;
        let pool = BufferPool::allocate(
            self.config.buffer_count,
            buffer_size,
            buffer_pool::description_capacity(&format, self.config.buffer_duration_secs),
        );
        let buffers = pool.take_all();
        *self.context.pool.lock() = Some(pool);
        for buffer in buffers {
            queue.enqueue(buffer)?;
        }
        log::debug!(
            "Enqueued {} buffers of {} bytes",
            self.config.buffer_count,
            buffer_size
        );

        if self.config.enable_metering {
            self.start_metering(&queue);
        }

        self.context.reset_counters();
        self.active_format = Some(format);

        // Recording must be visible before the first completion can fire.
        self.set_state(RecordingState::Recording);
        queue.start()
    }

    fn start_metering(&mut self, queue: &Arc<dyn InputQueue>) {
        if let Err(e) = queue.set_level_metering(true) {
            log::warn!("Level metering unavailable: {}", e);
            return;
        }

        let weak_queue = Arc::downgrade(queue);
        let source = move || match weak_queue.upgrade() {
            Some(queue) => queue.current_level(),
            None => Err(CaptureError::MeteringUnavailable("queue disposed".into())),
        };
        let slot = Arc::clone(&self.power_observer);
        let on_sample: PowerObserver = Arc::new(move |db| {
            let observer = slot.lock().clone();
            if let Some(observer) = observer {
                observer(db);
            }
        });

        if let Err(e) = self.sampler.start(self.config.metering_period, source, on_sample) {
            log::warn!("Failed to start metering sampler: {}", e);
        }
    }

    fn completion_handler(&self) -> InputCallback {
        let context = Arc::clone(&self.context);
        Arc::new(move |queue: &dyn BufferRequeue, buffer: CaptureBuffer| {
            context.handle_completed_buffer(queue, buffer);
        })
    }

    /// Release everything a failed `start` acquired.
    fn rollback(&mut self) {
        self.context.state.set(RecordingState::Stopping);
        self.sampler.stop();

        if let Some(queue) = self.queue.take() {
            if let Err(e) = queue.stop() {
                log::warn!("Failed to stop input queue during rollback: {}", e);
            }
            if let Err(e) = queue.dispose() {
                log::warn!("Failed to dispose input queue during rollback: {}", e);
            }
        }
        if let Some(mut sink) = self.context.sink.lock().take() {
            if let Err(e) = sink.close() {
                log::warn!("Failed to close output during rollback: {}", e);
            }
        }
        if let Some(pool) = self.context.pool.lock().take() {
            pool.release();
        }
        if let Err(e) = self.session.set_active(false) {
            log::warn!("Failed to deactivate audio session: {}", e);
        }
        self.active_format = None;
    }

    /// Close the sink and assemble the recording result.
    fn finish(&self, sink: Option<Box<dyn PacketSink>>) -> Result<RecordingResult, CaptureError> {
        let format = self.format();
        let packets_written = self.packet_cursor();
        let write_failures = self.context.write_failures.load(Ordering::Relaxed);

        let (file_path, checksum, container) = match sink {
            Some(mut sink) => {
                sink.close()?;
                (
                    sink.path().map(Path::to_path_buf),
                    sink.checksum().map(str::to_string),
                    sink.container(),
                )
            }
            None => (None, None, None),
        };

        let path_string = file_path.as_ref().map(|p| p.to_string_lossy().into_owned());
        let metadata = RecordingMetadata::new(
            &format,
            container,
            path_string.as_deref(),
            checksum.as_deref(),
            packets_written,
            write_failures,
        );

        if self.config.write_metadata_sidecar {
            if let Some(path) = &file_path {
                if let Err(e) = metadata::write_metadata(&metadata, path) {
                    log::warn!("Failed to write metadata sidecar: {}", e);
                }
            }
        }

        log::info!(
            "Recording stopped: {} packets ({:.2}s), {} write failures",
            packets_written,
            metadata.duration_secs,
            write_failures
        );

        Ok(RecordingResult {
            file_path,
            packets_written,
            duration_secs: metadata.duration_secs,
            metadata,
            checksum,
        })
    }

    fn set_state(&self, state: RecordingState) {
        self.context.state.set(state);
        self.notify_state(state);
    }

    fn notify_state(&self, state: RecordingState) {
        if let Some(delegate) = self.context.delegate() {
            delegate.on_state_changed(state);
        }
    }
}

impl<P: AudioQueueProvider> Drop for Recorder<P> {
    fn drop(&mut self) {
        if self.is_recording() {
            if let Err(e) = self.stop() {
                log::warn!("Failed to stop recorder on drop: {}", e);
            }
        }
    }
}
