use std::path::Path;

use crate::models::config::ContainerType;
use crate::models::error::CaptureError;
use crate::models::format::AudioFormat;
use crate::processing::buffer_pool::PacketDescription;

/// Append-only destination for captured packets.
pub trait PacketSink: Send {
    /// Write `data` starting at packet `at_packet`; returns packets written.
    ///
    /// `descriptions` is empty for constant bit rate formats.
    fn append(
        &mut self,
        data: &[u8],
        descriptions: &[PacketDescription],
        at_packet: u64,
    ) -> Result<u32, CaptureError>;

    /// Flush and release the destination. Safe to call more than once.
    fn close(&mut self) -> Result<(), CaptureError>;

    /// Path of the backing file, if there is one.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// SHA-256 of the finished file, available after `close`.
    fn checksum(&self) -> Option<&str> {
        None
    }

    fn container(&self) -> Option<ContainerType> {
        None
    }
}

/// Where a recording goes. Opened once the hardware format is known.
pub trait OutputTarget {
    fn open(&self, format: &AudioFormat) -> Result<Box<dyn PacketSink>, CaptureError>;
}
