//! cpal-backed input queue.
//!
//! Three parties cooperate:
//!
//! ```text
//! cpal callback ──fills──▶ Filler ──Filled(buf)──▶ "aq-capture" thread ──▶ InputCallback
//!      ▲                     ▲                                              │
//!      │                     └──────────── free buffers ◀── Requeue ◀───────┘
//! "aq-stream" thread (owns the !Send cpal::Stream; Start / Stop / Dispose)
//! ```
//!
//! Samples are converted to 16-bit little-endian PCM at the device's rate
//! and channel count. When every buffer is in flight, incoming frames are
//! dropped and counted as overruns.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, StreamConfig};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;

use aqrecorder_core::models::audio_models::{AudioSource, LevelMeterState};
use aqrecorder_core::models::error::CaptureError;
use aqrecorder_core::models::format::AudioFormat;
use aqrecorder_core::processing::buffer_pool::CaptureBuffer;
use aqrecorder_core::traits::input_queue::{AudioQueueProvider, BufferRequeue, InputCallback, InputQueue};

use crate::device_enumerator::DeviceEnumerator;
use crate::error::BackendError;
use crate::level_meter::{LevelAccumulator, MeterCell};

const BYTES_PER_SAMPLE: usize = 2;

/// Opens cpal input queues on the default (or a named) input device.
pub struct CpalQueueProvider {
    device_id: Option<String>,
}

impl CpalQueueProvider {
    /// Provider for the system default input device.
    pub fn default_device() -> Self {
        Self { device_id: None }
    }

    /// Provider for a device id as listed by `DeviceEnumerator`.
    pub fn with_device(id: impl Into<String>) -> Self {
        Self {
            device_id: Some(id.into()),
        }
    }

    fn resolve_device(&self) -> Result<cpal::Device, BackendError> {
        DeviceEnumerator::new().input_device(self.device_id.as_deref())
    }
}

impl AudioQueueProvider for CpalQueueProvider {
    fn is_available(&self) -> bool {
        self.resolve_device().is_ok()
    }

    fn new_input(&self, format: &AudioFormat, callback: InputCallback) -> Result<Arc<dyn InputQueue>, CaptureError> {
        let device = self.resolve_device()?;
        let queue = CpalInputQueue::open(device, format, callback)?;
        Ok(Arc::new(queue))
    }

    fn device_info(&self) -> AudioSource {
        let enumerator = DeviceEnumerator::new();
        let default_name = enumerator.default_input_device_name();
        match &self.device_id {
            Some(id) => AudioSource {
                id: id.clone(),
                name: id.clone(),
                is_default: default_name.as_deref() == Some(id.as_str()),
            },
            None => AudioSource {
                id: "default-input".into(),
                name: default_name.unwrap_or_else(|| "Default Input".into()),
                is_default: true,
            },
        }
    }
}

/// State shared by the queue handle, the audio callback and the requeue capability.
#[derive(Default)]
struct QueueShared {
    disposed: AtomicBool,
    metering: AtomicBool,
    meter: MeterCell,
    overrun_frames: AtomicU64,
}

/// Capability handed to the completion handler for returning buffers.
#[derive(Clone)]
struct Requeue {
    free: Sender<CaptureBuffer>,
    shared: Arc<QueueShared>,
}

impl BufferRequeue for Requeue {
    fn enqueue(&self, buffer: CaptureBuffer) -> Result<(), CaptureError> {
        if self.shared.disposed.load(Ordering::Acquire) {
            return Err(CaptureError::DeviceNotAvailable);
        }
        self.free
            .send(buffer)
            .map_err(|_| CaptureError::DeviceNotAvailable)
    }
}

enum Delivery {
    Filled(CaptureBuffer),
    /// Acknowledged once every buffer sent before it has been delivered.
    Drained(Sender<()>),
}

enum StreamCommand {
    Start(Sender<Result<(), BackendError>>),
    Stop(Sender<Result<(), BackendError>>),
    Dispose,
}

/// Packs converted frames into capture buffers. Lives inside the cpal callback.
struct Filler {
    channels: usize,
    current: Option<CaptureBuffer>,
    free: Receiver<CaptureBuffer>,
    filled: Sender<Delivery>,
    shared: Arc<QueueShared>,
}

impl Filler {
    fn frame_bytes(&self) -> usize {
        self.channels * BYTES_PER_SAMPLE
    }

    /// Append interleaved samples, shipping each buffer as it fills.
    fn push_interleaved<I: Iterator<Item = f32>>(&mut self, samples: I) {
        let frame_bytes = self.frame_bytes();
        let mut meter = LevelAccumulator::new();
        let mut position = 0;
        let mut dropping = false;

        for sample in samples {
            meter.add(sample);
            if position == 0 {
                dropping = !self.ensure_buffer(frame_bytes);
                if dropping {
                    self.shared.overrun_frames.fetch_add(1, Ordering::Relaxed);
                }
            }
            if !dropping {
                if let Some(buffer) = self.current.as_mut() {
                    buffer.fill(&sample_to_i16(sample).to_le_bytes());
                }
            }
            position += 1;
            if position == self.channels {
                position = 0;
                if !dropping {
                    self.ship_if_full(frame_bytes);
                }
            }
        }

        if !meter.is_empty() && self.shared.metering.load(Ordering::Relaxed) {
            self.shared.meter.store(meter.finish());
        }
    }

    fn ensure_buffer(&mut self, frame_bytes: usize) -> bool {
        if self.current.is_none() {
            self.current = self.free.try_recv().ok();
        }
        matches!(&self.current, Some(buffer) if buffer.remaining() >= frame_bytes)
    }

    fn ship_if_full(&mut self, frame_bytes: usize) {
        let full = matches!(&self.current, Some(buffer) if buffer.remaining() < frame_bytes);
        if full {
            if let Some(buffer) = self.current.take() {
                let _ = self.filled.send(Delivery::Filled(buffer));
            }
        }
    }

    /// Ship the partial buffer and queue a drain marker behind it.
    fn flush(&mut self) -> Option<Receiver<()>> {
        if self.current.as_ref().is_some_and(|buffer| !buffer.is_empty()) {
            if let Some(buffer) = self.current.take() {
                let _ = self.filled.send(Delivery::Filled(buffer));
            }
        }
        let (ack_tx, ack_rx) = bounded(1);
        self.filled.send(Delivery::Drained(ack_tx)).ok()?;
        Some(ack_rx)
    }
}

/// Convert a float sample to 16-bit PCM, clamping out-of-range input.
fn sample_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// One supported input configuration, reduced to what negotiation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ConfigRange {
    channels: u16,
    min_rate: u32,
    max_rate: u32,
    native_i16: bool,
}

/// Index of the range that carries `rate` and `channels`, preferring native 16-bit.
fn pick_config(ranges: &[ConfigRange], rate: u32, channels: u16) -> Option<usize> {
    let matches = |range: &ConfigRange| {
        range.channels == channels && range.min_rate <= rate && rate <= range.max_rate
    };
    ranges
        .iter()
        .position(|range| matches(range) && range.native_i16)
        .or_else(|| ranges.iter().position(matches))
}

fn is_supported_sample_format(format: SampleFormat) -> bool {
    matches!(
        format,
        SampleFormat::I16 | SampleFormat::U16 | SampleFormat::I32 | SampleFormat::F32
    )
}

/// Pick a stream config for `requested`, falling back to the device default.
fn negotiate_config(device: &cpal::Device, requested: &AudioFormat) -> Result<(StreamConfig, SampleFormat), BackendError> {
    let rate = requested.sample_rate.round() as u32;
    let channels = requested.channels_per_frame as u16;

    match device.supported_input_configs() {
        Ok(ranges) => {
            let ranges: Vec<_> = ranges
                .filter(|range| is_supported_sample_format(range.sample_format()))
                .collect();
            let candidates: Vec<ConfigRange> = ranges
                .iter()
                .map(|range| ConfigRange {
                    channels: range.channels(),
                    min_rate: range.min_sample_rate().0,
                    max_rate: range.max_sample_rate().0,
                    native_i16: range.sample_format() == SampleFormat::I16,
                })
                .collect();
            if let Some(index) = pick_config(&candidates, rate, channels) {
                let chosen = ranges[index].clone().with_sample_rate(cpal::SampleRate(rate));
                return Ok((chosen.config(), chosen.sample_format()));
            }
        }
        Err(e) => log::warn!("Could not list supported input configs: {}", e),
    }

    let fallback = device.default_input_config()?;
    if !is_supported_sample_format(fallback.sample_format()) {
        return Err(BackendError::UnsupportedSampleFormat(format!(
            "{:?}",
            fallback.sample_format()
        )));
    }
    log::info!(
        "Device cannot capture {} Hz / {} ch, using {} Hz / {} ch",
        rate,
        channels,
        fallback.sample_rate().0,
        fallback.channels()
    );
    Ok((fallback.config(), fallback.sample_format()))
}

/// Input queue over one cpal input stream.
pub struct CpalInputQueue {
    format: AudioFormat,
    requeue: Requeue,
    commands: Sender<StreamCommand>,
    stream_thread: Mutex<Option<JoinHandle<()>>>,
    delivery_thread: Mutex<Option<JoinHandle<()>>>,
}

impl CpalInputQueue {
    /// Build the stream for `requested` on `device`. The stream is created
    /// paused; buffers flow after `enqueue` and `start`.
    pub fn open(device: cpal::Device, requested: &AudioFormat, callback: InputCallback) -> Result<Self, CaptureError> {
        if !requested.is_linear_pcm() || requested.is_variable_bit_rate() {
            return Err(BackendError::UnsupportedFormat(format!(
                "only linear PCM capture is supported, got {}",
                requested
            ))
            .into());
        }

        let (stream_config, sample_format) = negotiate_config(&device, requested)?;
        let format = AudioFormat::linear_pcm(
            stream_config.sample_rate.0 as f64,
            (BYTES_PER_SAMPLE * 8) as u32,
            stream_config.channels as u32,
        );

        let shared = Arc::new(QueueShared::default());
        let (free_tx, free_rx) = unbounded();
        let (filled_tx, filled_rx) = unbounded();
        let (command_tx, command_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);

        let filler = Arc::new(Mutex::new(Filler {
            channels: stream_config.channels.max(1) as usize,
            current: None,
            free: free_rx,
            filled: filled_tx,
            shared: Arc::clone(&shared),
        }));
        let requeue = Requeue {
            free: free_tx,
            shared,
        };

        let delivery_requeue = requeue.clone();
        let delivery = thread::Builder::new()
            .name("aq-capture".into())
            .spawn(move || run_delivery(filled_rx, callback, delivery_requeue))
            .map_err(|e| BackendError::Thread(e.to_string()))?;

        let queue = Self {
            format,
            requeue,
            commands: command_tx,
            stream_thread: Mutex::new(None),
            delivery_thread: Mutex::new(Some(delivery)),
        };

        let stream = thread::Builder::new()
            .name("aq-stream".into())
            .spawn(move || run_stream(device, stream_config, sample_format, filler, command_rx, ready_tx))
            .map_err(|e| BackendError::Thread(e.to_string()))?;
        *queue.stream_thread.lock() = Some(stream);

        match ready_rx.recv() {
            Ok(Ok(())) => {
                log::info!("Opened input stream: {} ({:?} samples)", format, sample_format);
                Ok(queue)
            }
            Ok(Err(e)) => {
                log::error!("Failed to open input stream: {}", e);
                Err(e.into())
            }
            Err(_) => Err(BackendError::Thread("stream thread exited during setup".into()).into()),
        }
    }

    /// Frames dropped because every buffer was in flight.
    pub fn overrun_frames(&self) -> u64 {
        self.requeue.shared.overrun_frames.load(Ordering::Relaxed)
    }

    fn is_disposed(&self) -> bool {
        self.requeue.shared.disposed.load(Ordering::Acquire)
    }

    fn request(&self, command: fn(Sender<Result<(), BackendError>>) -> StreamCommand) -> Result<(), CaptureError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(command(reply_tx))
            .map_err(|_| CaptureError::DeviceNotAvailable)?;
        let result = reply_rx.recv().map_err(|_| CaptureError::DeviceNotAvailable)?;
        result.map_err(CaptureError::from)
    }
}

impl BufferRequeue for CpalInputQueue {
    fn enqueue(&self, buffer: CaptureBuffer) -> Result<(), CaptureError> {
        self.requeue.enqueue(buffer)
    }
}

impl InputQueue for CpalInputQueue {
    fn format(&self) -> Result<AudioFormat, CaptureError> {
        Ok(self.format)
    }

    fn max_output_packet_size(&self) -> Result<u32, CaptureError> {
        Ok(self.format.bytes_per_packet())
    }

    fn set_level_metering(&self, enabled: bool) -> Result<(), CaptureError> {
        self.requeue.shared.metering.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    fn current_level(&self) -> Result<LevelMeterState, CaptureError> {
        let shared = &self.requeue.shared;
        if shared.disposed.load(Ordering::Acquire) {
            return Err(CaptureError::MeteringUnavailable("queue disposed".into()));
        }
        if !shared.metering.load(Ordering::Relaxed) {
            return Err(CaptureError::MeteringUnavailable("level metering is off".into()));
        }
        Ok(shared.meter.load())
    }

    fn start(&self) -> Result<(), CaptureError> {
        if self.is_disposed() {
            return Err(CaptureError::DeviceNotAvailable);
        }
        self.request(StreamCommand::Start)
    }

    fn stop(&self) -> Result<(), CaptureError> {
        if self.is_disposed() {
            return Ok(());
        }
        self.request(StreamCommand::Stop)?;
        let overruns = self.overrun_frames();
        if overruns > 0 {
            log::warn!("Input overran by {} frames", overruns);
        }
        Ok(())
    }

    fn dispose(&self) -> Result<(), CaptureError> {
        if self.requeue.shared.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let _ = self.commands.send(StreamCommand::Dispose);
        join_unless_current(self.stream_thread.lock().take());
        join_unless_current(self.delivery_thread.lock().take());
        Ok(())
    }
}

impl Drop for CpalInputQueue {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}

fn join_unless_current(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        if handle.thread().id() != thread::current().id() {
            let _ = handle.join();
        }
    }
}

/// Delivers filled buffers to the completion handler, in order.
fn run_delivery(filled: Receiver<Delivery>, callback: InputCallback, requeue: Requeue) {
    for delivery in filled.iter() {
        match delivery {
            Delivery::Filled(buffer) => callback(&requeue, buffer),
            Delivery::Drained(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// Owns the cpal stream for its whole life.
fn run_stream(
    device: cpal::Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    filler: Arc<Mutex<Filler>>,
    commands: Receiver<StreamCommand>,
    ready: Sender<Result<(), BackendError>>,
) {
    let stream = match build_stream(&device, &config, sample_format, Arc::clone(&filler)) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    // Some hosts start streams immediately.
    if let Err(e) = stream.pause() {
        log::debug!("Initial pause not supported: {}", e);
    }
    let _ = ready.send(Ok(()));

    for command in commands.iter() {
        match command {
            StreamCommand::Start(reply) => {
                let _ = reply.send(stream.play().map_err(BackendError::from));
            }
            StreamCommand::Stop(reply) => {
                let paused = stream.pause().map_err(BackendError::from);
                let drained = filler.lock().flush();
                if let Some(ack) = drained {
                    let _ = ack.recv();
                }
                let _ = reply.send(paused);
            }
            StreamCommand::Dispose => break,
        }
    }
    drop(stream);
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    filler: Arc<Mutex<Filler>>,
) -> Result<cpal::Stream, BackendError> {
    match sample_format {
        SampleFormat::I16 => build_stream_typed::<i16>(device, config, filler),
        SampleFormat::U16 => build_stream_typed::<u16>(device, config, filler),
        SampleFormat::I32 => build_stream_typed::<i32>(device, config, filler),
        SampleFormat::F32 => build_stream_typed::<f32>(device, config, filler),
        other => Err(BackendError::UnsupportedSampleFormat(format!("{:?}", other))),
    }
}

fn build_stream_typed<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    filler: Arc<Mutex<Filler>>,
) -> Result<cpal::Stream, BackendError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // Stop holds the lock while flushing; the stream is paused then.
            let Some(mut filler) = filler.try_lock() else {
                return;
            };
            filler.push_interleaved(data.iter().map(|sample| f32::from_sample_(*sample)));
        },
        |err| log::error!("Input stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(channels: usize, buffers: &[usize]) -> (Filler, Sender<CaptureBuffer>, Receiver<Delivery>, Arc<QueueShared>) {
        let shared = Arc::new(QueueShared::default());
        let (free_tx, free_rx) = unbounded();
        let (filled_tx, filled_rx) = unbounded();
        for (index, capacity) in buffers.iter().enumerate() {
            free_tx.send(CaptureBuffer::new(index, *capacity, 0)).unwrap();
        }
        let filler = Filler {
            channels,
            current: None,
            free: free_rx,
            filled: filled_tx,
            shared: Arc::clone(&shared),
        };
        (filler, free_tx, filled_rx, shared)
    }

    fn filled(delivery: Delivery) -> CaptureBuffer {
        match delivery {
            Delivery::Filled(buffer) => buffer,
            Delivery::Drained(_) => panic!("expected a filled buffer"),
        }
    }

    #[test]
    fn converts_and_clamps_samples() {
        assert_eq!(sample_to_i16(0.0), 0);
        assert_eq!(sample_to_i16(1.0), i16::MAX);
        assert_eq!(sample_to_i16(-1.0), -i16::MAX);
        assert_eq!(sample_to_i16(3.5), i16::MAX);
        assert_eq!(sample_to_i16(-3.5), -i16::MAX);
    }

    #[test]
    fn ships_buffers_as_they_fill() {
        let (mut filler, _free, filled_rx, _) = filler(1, &[4, 4]);
        filler.push_interleaved([0.5, -0.5, 1.0].into_iter());

        let first = filled(filled_rx.try_recv().unwrap());
        assert_eq!(first.valid_bytes(), 4);
        assert_eq!(&first.audio_data()[..2], &sample_to_i16(0.5).to_le_bytes());
        assert!(filled_rx.try_recv().is_err());
        assert_eq!(filler.current.as_ref().map(CaptureBuffer::valid_bytes), Some(2));
    }

    #[test]
    fn keeps_frames_whole_across_buffers() {
        // 6-byte buffers hold one stereo frame (4 bytes) with 2 to spare.
        let (mut filler, _free, filled_rx, _) = filler(2, &[6, 6]);
        filler.push_interleaved([0.1, 0.2, 0.3, 0.4].into_iter());

        assert_eq!(filled(filled_rx.try_recv().unwrap()).valid_bytes(), 4);
        assert_eq!(filled(filled_rx.try_recv().unwrap()).valid_bytes(), 4);
    }

    #[test]
    fn counts_overrun_when_no_buffer_is_free() {
        let (mut filler, free, filled_rx, shared) = filler(1, &[2]);
        filler.push_interleaved([0.1, 0.2, 0.3].into_iter());

        assert_eq!(filled_rx.len(), 1);
        assert_eq!(shared.overrun_frames.load(Ordering::Relaxed), 2);

        free.send(CaptureBuffer::new(1, 2, 0)).unwrap();
        filler.push_interleaved([0.4].into_iter());
        assert_eq!(filled_rx.len(), 2);
    }

    #[test]
    fn flush_ships_partial_buffer_before_drain_marker() {
        let (mut filler, _free, filled_rx, _) = filler(1, &[8]);
        filler.push_interleaved([0.25].into_iter());

        let ack = filler.flush().unwrap();
        assert_eq!(filled(filled_rx.try_recv().unwrap()).valid_bytes(), 2);
        match filled_rx.try_recv().unwrap() {
            Delivery::Drained(tx) => tx.send(()).unwrap(),
            Delivery::Filled(_) => panic!("expected drain marker"),
        }
        assert!(ack.recv().is_ok());
    }

    #[test]
    fn flush_without_audio_sends_only_the_marker() {
        let (mut filler, _free, filled_rx, _) = filler(1, &[8]);
        let _ack = filler.flush().unwrap();
        assert!(matches!(filled_rx.try_recv().unwrap(), Delivery::Drained(_)));
        assert!(filled_rx.try_recv().is_err());
    }

    #[test]
    fn meter_updates_only_while_enabled() {
        let (mut filler, _free, _filled, shared) = filler(1, &[64]);
        filler.push_interleaved([0.5; 4].into_iter());
        assert_eq!(shared.meter.load(), LevelMeterState::default());

        shared.metering.store(true, Ordering::Relaxed);
        filler.push_interleaved([0.5; 4].into_iter());
        assert!((shared.meter.load().peak_power_db + 6.02).abs() < 0.01);
    }

    #[test]
    fn requeue_refuses_after_dispose() {
        let shared = Arc::new(QueueShared::default());
        let (free_tx, free_rx) = unbounded();
        let requeue = Requeue {
            free: free_tx,
            shared: Arc::clone(&shared),
        };

        requeue.enqueue(CaptureBuffer::new(0, 4, 0)).unwrap();
        shared.disposed.store(true, Ordering::Release);
        assert_eq!(
            requeue.enqueue(CaptureBuffer::new(1, 4, 0)),
            Err(CaptureError::DeviceNotAvailable)
        );
        assert_eq!(free_rx.len(), 1);
    }

    #[test]
    fn delivery_thread_runs_callback_in_order_and_acks_drain() {
        let shared = Arc::new(QueueShared::default());
        let (free_tx, free_rx) = unbounded();
        let (filled_tx, filled_rx) = unbounded();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_callback = Arc::clone(&seen);
        let callback: InputCallback = Arc::new(move |queue: &dyn BufferRequeue, buffer: CaptureBuffer| {
            seen_by_callback.lock().push(buffer.index());
            queue.enqueue(buffer).unwrap();
        });
        let requeue = Requeue {
            free: free_tx,
            shared,
        };
        let handle = thread::spawn(move || run_delivery(filled_rx, callback, requeue));

        for index in 0..3 {
            filled_tx.send(Delivery::Filled(CaptureBuffer::new(index, 4, 0))).unwrap();
        }
        let (ack_tx, ack_rx) = bounded(1);
        filled_tx.send(Delivery::Drained(ack_tx)).unwrap();
        ack_rx.recv().unwrap();

        assert_eq!(*seen.lock(), vec![0, 1, 2]);
        assert_eq!(free_rx.len(), 3);

        drop(filled_tx);
        handle.join().unwrap();
    }

    #[test]
    fn picks_matching_range_preferring_native_i16() {
        let ranges = [
            ConfigRange { channels: 2, min_rate: 8000, max_rate: 48000, native_i16: true },
            ConfigRange { channels: 1, min_rate: 8000, max_rate: 48000, native_i16: false },
            ConfigRange { channels: 1, min_rate: 16000, max_rate: 16000, native_i16: true },
        ];
        assert_eq!(pick_config(&ranges, 16000, 1), Some(2));
        assert_eq!(pick_config(&ranges, 44100, 1), Some(1));
        assert_eq!(pick_config(&ranges, 96000, 1), None);
        assert_eq!(pick_config(&ranges, 16000, 4), None);
    }

    #[test]
    fn accepts_common_sample_formats_only() {
        assert!(is_supported_sample_format(SampleFormat::F32));
        assert!(is_supported_sample_format(SampleFormat::I16));
        assert!(!is_supported_sample_format(SampleFormat::F64));
        assert!(!is_supported_sample_format(SampleFormat::U8));
    }
}
