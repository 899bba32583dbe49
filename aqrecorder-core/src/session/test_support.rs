//! Scripted hardware queue for exercising the recorder without a device.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{AudioSource, LevelMeterState};
use crate::models::error::CaptureError;
use crate::models::format::AudioFormat;
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecordingState;
use crate::processing::buffer_pool::{CaptureBuffer, PacketDescription};
use crate::traits::audio_session::{AudioSession, RecordPermission};
use crate::traits::input_queue::{AudioQueueProvider, BufferRequeue, InputCallback, InputQueue};
use crate::traits::packet_sink::{OutputTarget, PacketSink};
use crate::traits::recorder_delegate::RecorderDelegate;

#[derive(Default)]
pub struct MockHardware {
    pub queues: Mutex<Vec<Arc<MockQueue>>>,
    pub negotiated: Mutex<Option<AudioFormat>>,
    pub fail_new_input: Mutex<Option<CaptureError>>,
    pub fail_start: AtomicBool,
    pub level: Mutex<LevelMeterState>,
}

impl MockHardware {
    pub fn queue(&self) -> Arc<MockQueue> {
        Arc::clone(self.queues.lock().last().expect("no queue created"))
    }

    pub fn queue_count(&self) -> usize {
        self.queues.lock().len()
    }
}

#[derive(Clone, Default)]
pub struct MockProvider {
    pub hardware: Arc<MockHardware>,
}

impl AudioQueueProvider for MockProvider {
    fn is_available(&self) -> bool {
        true
    }

    fn new_input(&self, format: &AudioFormat, callback: InputCallback) -> Result<Arc<dyn InputQueue>, CaptureError> {
        if let Some(e) = self.hardware.fail_new_input.lock().clone() {
            return Err(e);
        }
        let negotiated = *self.hardware.negotiated.lock();
        let format = negotiated.unwrap_or(*format);
        let queue = Arc::new(MockQueue {
            format,
            callback,
            hardware: Arc::clone(&self.hardware),
            queued: Mutex::new(VecDeque::new()),
            in_flight: Mutex::new(Vec::new()),
            enqueue_count: AtomicUsize::new(0),
            rejected_enqueues: AtomicUsize::new(0),
            metering: AtomicBool::new(false),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        });
        self.hardware.queues.lock().push(Arc::clone(&queue));
        Ok(queue)
    }

    fn device_info(&self) -> AudioSource {
        AudioSource {
            id: "mock".into(),
            name: "Mock Input".into(),
            is_default: true,
        }
    }
}

pub struct MockQueue {
    format: AudioFormat,
    callback: InputCallback,
    hardware: Arc<MockHardware>,
    queued: Mutex<VecDeque<CaptureBuffer>>,
    in_flight: Mutex<Vec<CaptureBuffer>>,
    pub enqueue_count: AtomicUsize,
    pub rejected_enqueues: AtomicUsize,
    pub metering: AtomicBool,
    pub started: AtomicBool,
    pub stopped: AtomicBool,
    pub disposed: AtomicBool,
}

impl MockQueue {
    pub fn queued(&self) -> usize {
        self.queued.lock().len()
    }

    pub fn queued_capacities(&self) -> Vec<usize> {
        self.queued.lock().iter().map(CaptureBuffer::capacity).collect()
    }

    /// Fill the next queued buffer with `bytes` and complete it.
    pub fn complete_next(&self, bytes: usize) -> bool {
        match self.fill_next(bytes) {
            Some(buffer) => {
                self.deliver(buffer);
                true
            }
            None => false,
        }
    }

    /// Fill the next queued buffer but hold it as in flight. `stop` delivers it.
    pub fn hold_next(&self, bytes: usize) -> bool {
        match self.fill_next(bytes) {
            Some(buffer) => {
                self.in_flight.lock().push(buffer);
                true
            }
            None => false,
        }
    }

    /// Fill the next queued buffer and hand it back without delivering.
    pub fn fill_next(&self, bytes: usize) -> Option<CaptureBuffer> {
        let mut buffer = self.queued.lock().pop_front()?;
        let payload: Vec<u8> = (0..bytes).map(|i| (i % 251) as u8).collect();
        buffer.fill(&payload);
        Some(buffer)
    }

    /// Fill the next queued buffer with whole packets of `sizes` bytes and
    /// complete it. Packet `n` is filled with the byte `n`.
    pub fn complete_next_packets(&self, sizes: &[usize]) -> bool {
        let Some(mut buffer) = self.queued.lock().pop_front() else {
            return false;
        };
        for (n, size) in sizes.iter().enumerate() {
            assert!(buffer.push_packet(&vec![n as u8; *size], 1024), "packet does not fit");
        }
        self.deliver(buffer);
        true
    }

    pub fn deliver(&self, buffer: CaptureBuffer) {
        (self.callback)(self, buffer);
    }
}

impl BufferRequeue for MockQueue {
    fn enqueue(&self, buffer: CaptureBuffer) -> Result<(), CaptureError> {
        if self.disposed.load(Ordering::SeqCst) {
            self.rejected_enqueues.fetch_add(1, Ordering::SeqCst);
            return Err(CaptureError::DeviceNotAvailable);
        }
        self.enqueue_count.fetch_add(1, Ordering::SeqCst);
        self.queued.lock().push_back(buffer);
        Ok(())
    }
}

impl InputQueue for MockQueue {
    fn format(&self) -> Result<AudioFormat, CaptureError> {
        Ok(self.format)
    }

    fn max_output_packet_size(&self) -> Result<u32, CaptureError> {
        Ok(512)
    }

    fn set_level_metering(&self, enabled: bool) -> Result<(), CaptureError> {
        self.metering.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    fn current_level(&self) -> Result<LevelMeterState, CaptureError> {
        if self.disposed.load(Ordering::SeqCst) || !self.metering.load(Ordering::SeqCst) {
            return Err(CaptureError::MeteringUnavailable("metering off".into()));
        }
        Ok(*self.hardware.level.lock())
    }

    fn start(&self) -> Result<(), CaptureError> {
        if self.hardware.fail_start.load(Ordering::SeqCst) {
            return Err(CaptureError::InitializationFailed("device busy".into()));
        }
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), CaptureError> {
        self.stopped.store(true, Ordering::SeqCst);
        let drained: Vec<CaptureBuffer> = self.in_flight.lock().drain(..).collect();
        for buffer in drained {
            self.deliver(buffer);
        }
        Ok(())
    }

    fn dispose(&self) -> Result<(), CaptureError> {
        self.disposed.store(true, Ordering::SeqCst);
        self.queued.lock().clear();
        Ok(())
    }
}

pub struct FixedSession(pub RecordPermission);

impl AudioSession for FixedSession {
    fn record_permission(&self) -> RecordPermission {
        self.0
    }
}

/// Records every append; optionally fails a chosen one.
#[derive(Default)]
pub struct SinkLog {
    pub appends: Mutex<Vec<(u64, usize)>>,
    pub closed: AtomicBool,
}

pub struct ScriptedTarget {
    pub log: Arc<SinkLog>,
    pub fail_append: Option<usize>,
    pub fail_open: bool,
}

impl ScriptedTarget {
    pub fn new() -> Self {
        Self {
            log: Arc::new(SinkLog::default()),
            fail_append: None,
            fail_open: false,
        }
    }
}

struct ScriptedSink {
    log: Arc<SinkLog>,
    bytes_per_packet: usize,
    fail_append: Option<usize>,
    calls: usize,
}

impl OutputTarget for ScriptedTarget {
    fn open(&self, format: &AudioFormat) -> Result<Box<dyn PacketSink>, CaptureError> {
        if self.fail_open {
            return Err(CaptureError::CreateFailed("read-only volume".into()));
        }
        Ok(Box::new(ScriptedSink {
            log: Arc::clone(&self.log),
            bytes_per_packet: format.bytes_per_packet().max(1) as usize,
            fail_append: self.fail_append,
            calls: 0,
        }))
    }
}

impl PacketSink for ScriptedSink {
    fn append(&mut self, data: &[u8], descriptions: &[PacketDescription], at_packet: u64) -> Result<u32, CaptureError> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_append == Some(call) {
            return Err(CaptureError::WriteFailed("disk full".into()));
        }
        let packets = if descriptions.is_empty() {
            data.len() / self.bytes_per_packet
        } else {
            descriptions.len()
        };
        self.log.appends.lock().push((at_packet, packets));
        Ok(packets as u32)
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct EventLog {
    pub states: Mutex<Vec<RecordingState>>,
    pub errors: Mutex<Vec<CaptureError>>,
    pub finished: Mutex<Vec<RecordingResult>>,
}

impl RecorderDelegate for EventLog {
    fn on_state_changed(&self, state: RecordingState) {
        self.states.lock().push(state);
    }

    fn on_error(&self, error: &CaptureError) {
        self.errors.lock().push(error.clone());
    }

    fn on_recording_finished(&self, result: &RecordingResult) {
        self.finished.lock().push(result.clone());
    }
}
