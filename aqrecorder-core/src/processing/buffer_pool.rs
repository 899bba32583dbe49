//! Fixed-size capture buffers and the pool that owns them between sessions.
//!
//! Buffers are allocated once when a recording is prepared and then rotate
//! between the hardware queue and the recorder for the whole session. A
//! buffer that completes after recording stopped is parked back in the pool
//! and released with it.

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::format::{AudioFormat, PacketLayout};

/// Location and size of one packet inside a buffer (variable bit rate only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketDescription {
    pub start_offset: u64,
    pub variable_frames_in_packet: u32,
    pub data_byte_size: u32,
}

/// A fixed-capacity byte region plus fill metadata.
#[derive(Debug)]
pub struct CaptureBuffer {
    index: usize,
    data: Box<[u8]>,
    valid_bytes: usize,
    packet_descriptions: Vec<PacketDescription>,
}

impl CaptureBuffer {
    pub fn new(index: usize, capacity: usize, description_capacity: usize) -> Self {
        Self {
            index,
            data: vec![0u8; capacity].into_boxed_slice(),
            valid_bytes: 0,
            packet_descriptions: Vec::with_capacity(description_capacity),
        }
    }

    /// Position of this buffer within its pool.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn valid_bytes(&self) -> usize {
        self.valid_bytes
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.valid_bytes
    }

    pub fn is_full(&self) -> bool {
        self.valid_bytes == self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid_bytes == 0
    }

    /// The bytes filled since the buffer was last cleared.
    pub fn audio_data(&self) -> &[u8] {
        &self.data[..self.valid_bytes]
    }

    pub fn packet_descriptions(&self) -> &[PacketDescription] {
        &self.packet_descriptions
    }

    /// Copy as much of `bytes` as fits; returns the number of bytes taken.
    pub fn fill(&mut self, bytes: &[u8]) -> usize {
        let count = bytes.len().min(self.remaining());
        self.data[self.valid_bytes..self.valid_bytes + count].copy_from_slice(&bytes[..count]);
        self.valid_bytes += count;
        count
    }

    /// Append one whole variable-size packet with its description.
    ///
    /// Returns false without copying if the packet does not fit.
    pub fn push_packet(&mut self, packet: &[u8], frames: u32) -> bool {
        if packet.len() > self.remaining() {
            return false;
        }
        let start_offset = self.valid_bytes as u64;
        self.fill(packet);
        self.packet_descriptions.push(PacketDescription {
            start_offset,
            variable_frames_in_packet: frames,
            data_byte_size: packet.len() as u32,
        });
        true
    }

    /// Mark the buffer empty for reuse. Keeps the allocation.
    pub fn clear(&mut self) {
        self.valid_bytes = 0;
        self.packet_descriptions.clear();
    }
}

/// Compute the capture buffer size for `seconds` of audio.
///
/// `sample_rate × packet size × seconds`, clamped to `max_buffer_size`. For
/// variable bit rate formats the packet size comes from `max_packet_size`,
/// which is only invoked in that case.
pub fn derive_buffer_size<F>(
    format: &AudioFormat,
    seconds: f64,
    max_buffer_size: u32,
    max_packet_size: F,
) -> Result<u32, CaptureError>
where
    F: FnOnce() -> Result<u32, CaptureError>,
{
    let packet_size = match format.layout {
        PacketLayout::ConstantBitRate { bytes_per_packet } => bytes_per_packet,
        PacketLayout::VariableBitRate => max_packet_size()?,
    };
    if packet_size == 0 {
        return Err(CaptureError::InitializationFailed(
            "queue reported a zero packet size".into(),
        ));
    }

    let bytes_for_time = format.sample_rate * packet_size as f64 * seconds;
    let size = if bytes_for_time >= max_buffer_size as f64 {
        max_buffer_size
    } else {
        bytes_for_time as u32
    };
    Ok(size.max(packet_size.min(max_buffer_size)))
}

/// Number of packet descriptions a buffer may need to carry.
pub fn description_capacity(format: &AudioFormat, seconds: f64) -> usize {
    match format.layout {
        PacketLayout::ConstantBitRate { .. } => 0,
        PacketLayout::VariableBitRate => {
            let frames_per_packet = format.frames_per_packet.max(1) as f64;
            (format.sample_rate * seconds / frames_per_packet).ceil() as usize + 1
        }
    }
}

/// The fixed set of capture buffers for one recording session.
#[derive(Debug)]
pub struct BufferPool {
    buffer_size: u32,
    buffer_count: usize,
    parked: Mutex<Vec<CaptureBuffer>>,
}

impl BufferPool {
    pub fn allocate(buffer_count: usize, buffer_size: u32, description_capacity: usize) -> Self {
        let buffers = (0..buffer_count)
            .map(|index| CaptureBuffer::new(index, buffer_size as usize, description_capacity))
            .collect();
        Self {
            buffer_size,
            buffer_count,
            parked: Mutex::new(buffers),
        }
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    pub fn buffer_count(&self) -> usize {
        self.buffer_count
    }

    /// Hand out every parked buffer, leaving the pool's storage in place.
    pub fn take_all(&self) -> Vec<CaptureBuffer> {
        self.parked.lock().drain(..).collect()
    }

    /// Park a buffer the hardware no longer owns.
    pub fn reclaim(&self, mut buffer: CaptureBuffer) {
        buffer.clear();
        self.parked.lock().push(buffer);
    }

    pub fn parked_count(&self) -> usize {
        self.parked.lock().len()
    }

    /// Drop every parked buffer; returns how many were released.
    pub fn release(&self) -> usize {
        let mut parked = self.parked.lock();
        let count = parked.len();
        parked.clear();
        count
    }
}
