use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::config::ContainerType;
use crate::models::error::CaptureError;
use crate::models::format::{AudioFormat, PacketLayout};
use crate::processing::buffer_pool::PacketDescription;
use crate::processing::{caf_format, wav_format};
use crate::traits::packet_sink::{OutputTarget, PacketSink};

/// Append-only audio file writer tracking a packet cursor.
///
/// The container header is written with placeholder sizes on `open` and
/// patched on `close`. Appends go through a `BufWriter`, so the capture
/// thread only pays for a memcpy until the buffer spills.
///
/// ## File Format
///
/// **WAV:** `[44-byte RIFF header] [PCM data]`
///
/// **CAF:** `[caff header] [desc] [data header] [packets] [pakt (VBR only)]`
pub struct StreamingFileWriter {
    file_path: PathBuf,
    container: ContainerType,
    format: AudioFormat,
    file: Option<BufWriter<File>>,
    data_offset: u64,
    write_position: u64,
    audio_bytes: u64,
    packets_written: u64,
    packet_table: Vec<PacketDescription>,
    checksum: Option<String>,
}

impl StreamingFileWriter {
    /// Create (truncating) `file_path` tagged with `format`.
    pub fn open(
        file_path: impl Into<PathBuf>,
        format: &AudioFormat,
        container: ContainerType,
    ) -> Result<Self, CaptureError> {
        let file_path = file_path.into();
        format.validate().map_err(CaptureError::CreateFailed)?;

        let header = match container {
            ContainerType::Wav => {
                wav_format::check_format(format).map_err(CaptureError::CreateFailed)?;
                wav_format::generate_wav_header(format, 0).to_vec()
            }
            ContainerType::Caf => caf_format::generate_caf_header(format),
        };

        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::CreateFailed(format!("failed to create directory: {}", e)))?;
        }

        let file = File::create(&file_path)
            .map_err(|e| CaptureError::CreateFailed(format!("failed to create file: {}", e)))?;
        let mut file = BufWriter::new(file);
        file.write_all(&header)
            .map_err(|e| CaptureError::CreateFailed(format!("failed to write header: {}", e)))?;

        log::info!(
            "Opened {} recording at {} ({})",
            container.extension(),
            file_path.display(),
            format
        );

        Ok(Self {
            file_path,
            container,
            format: *format,
            file: Some(file),
            data_offset: header.len() as u64,
            write_position: header.len() as u64,
            audio_bytes: 0,
            packets_written: 0,
            packet_table: Vec::new(),
            checksum: None,
        })
    }

    /// Write the valid bytes of a buffer starting at packet `at_packet`.
    ///
    /// Constant bit rate formats derive the packet count from the byte
    /// count; a trailing partial packet is not written. Variable bit rate
    /// formats write one packet per description and must be appended in
    /// order.
    pub fn append(
        &mut self,
        data: &[u8],
        descriptions: &[PacketDescription],
        at_packet: u64,
    ) -> Result<u32, CaptureError> {
        if self.file.is_none() {
            return Err(CaptureError::WriteFailed("file is not open".into()));
        }

        match self.format.layout {
            PacketLayout::ConstantBitRate { bytes_per_packet } => {
                let packets = data.len() / bytes_per_packet as usize;
                if packets == 0 {
                    return Ok(0);
                }
                let byte_count = packets * bytes_per_packet as usize;
                self.write_at(at_packet * bytes_per_packet as u64, &data[..byte_count])?;
                self.packets_written = self.packets_written.max(at_packet + packets as u64);
                Ok(packets as u32)
            }
            PacketLayout::VariableBitRate => {
                if descriptions.is_empty() {
                    return Ok(0);
                }
                if at_packet != self.packets_written {
                    return Err(CaptureError::WriteFailed(format!(
                        "variable bit rate packets must be appended in order: expected packet {}, got {}",
                        self.packets_written, at_packet
                    )));
                }
                for description in descriptions {
                    let start = description.start_offset as usize;
                    let end = start + description.data_byte_size as usize;
                    if end > data.len() {
                        return Err(CaptureError::WriteFailed(format!(
                            "packet description {}..{} exceeds buffer of {} bytes",
                            start,
                            end,
                            data.len()
                        )));
                    }
                }

                let packets_before = self.packets_written;
                let bytes_before = self.audio_bytes;
                let table_before = self.packet_table.len();
                for description in descriptions {
                    let start = description.start_offset as usize;
                    let end = start + description.data_byte_size as usize;
                    let file_offset = self.audio_bytes;
                    if let Err(e) = self.write_at(file_offset, &data[start..end]) {
                        // A failed buffer leaves no packets behind, so the
                        // caller can retry from the same cursor.
                        self.packets_written = packets_before;
                        self.audio_bytes = bytes_before;
                        self.packet_table.truncate(table_before);
                        return Err(e);
                    }
                    self.packet_table.push(PacketDescription {
                        start_offset: file_offset,
                        ..*description
                    });
                    self.packets_written += 1;
                }
                Ok(descriptions.len() as u32)
            }
        }
    }

    /// Patch the header, flush, and release the file handle. Idempotent.
    pub fn close(&mut self) -> Result<(), CaptureError> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };

        self.finalize_header(&mut file)
            .map_err(|e| CaptureError::WriteFailed(format!("failed to finalize header: {}", e)))?;
        let file = file
            .into_inner()
            .map_err(|e| CaptureError::WriteFailed(format!("failed to flush: {}", e)))?;
        file.sync_all()
            .map_err(|e| CaptureError::WriteFailed(format!("failed to sync: {}", e)))?;
        drop(file);

        self.checksum = Some(sha256_file(&self.file_path)?);
        log::info!(
            "Closed {}: {} packets, {} bytes of audio",
            self.file_path.display(),
            self.packets_written,
            self.audio_bytes
        );
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Packets written so far (the write cursor's high-water mark).
    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    /// Audio bytes written so far, excluding headers.
    pub fn bytes_written(&self) -> u64 {
        self.audio_bytes
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    fn write_at(&mut self, audio_offset: u64, bytes: &[u8]) -> Result<(), CaptureError> {
        let absolute = self.data_offset + audio_offset;
        let needs_seek = absolute != self.write_position;
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| CaptureError::WriteFailed("file is not open".into()))?;

        let seek_to = needs_seek.then_some(absolute);
        match seek_and_write(file, seek_to, bytes) {
            Ok(()) => {
                self.write_position = absolute + bytes.len() as u64;
                self.audio_bytes = self.audio_bytes.max(audio_offset + bytes.len() as u64);
                Ok(())
            }
            Err(e) => {
                // Position is unknown after a partial write; force a seek next time.
                self.write_position = u64::MAX;
                Err(CaptureError::WriteFailed(format!("write failed: {}", e)))
            }
        }
    }

    fn finalize_header(&self, file: &mut BufWriter<File>) -> io::Result<()> {
        match self.container {
            ContainerType::Wav => {
                file.seek(SeekFrom::Start(wav_format::RIFF_SIZE_OFFSET))?;
                file.write_all(&wav_format::riff_chunk_size(self.audio_bytes).to_le_bytes())?;
                file.seek(SeekFrom::Start(wav_format::DATA_SIZE_OFFSET))?;
                file.write_all(&wav_format::data_chunk_size(self.audio_bytes).to_le_bytes())?;
            }
            ContainerType::Caf => {
                if self.format.is_variable_bit_rate() {
                    let pakt = caf_format::generate_pakt_chunk(&self.format, &self.packet_table);
                    file.seek(SeekFrom::Start(self.data_offset + self.audio_bytes))?;
                    file.write_all(&pakt)?;
                }
                file.seek(SeekFrom::Start(caf_format::DATA_SIZE_OFFSET))?;
                file.write_all(&caf_format::data_chunk_size(self.audio_bytes).to_be_bytes())?;
            }
        }
        file.flush()
    }
}

impl PacketSink for StreamingFileWriter {
    fn append(
        &mut self,
        data: &[u8],
        descriptions: &[PacketDescription],
        at_packet: u64,
    ) -> Result<u32, CaptureError> {
        StreamingFileWriter::append(self, data, descriptions, at_packet)
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        StreamingFileWriter::close(self)
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.file_path)
    }

    fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    fn container(&self) -> Option<ContainerType> {
        Some(self.container)
    }
}

impl Drop for StreamingFileWriter {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                log::warn!("Failed to close {} on drop: {}", self.file_path.display(), e);
            }
        }
    }
}

/// A file on disk in a given container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    pub path: PathBuf,
    pub container: ContainerType,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>, container: ContainerType) -> Self {
        Self {
            path: path.into(),
            container,
        }
    }
}

impl OutputTarget for FileTarget {
    fn open(&self, format: &AudioFormat) -> Result<Box<dyn PacketSink>, CaptureError> {
        let writer = StreamingFileWriter::open(self.path.clone(), format, self.container)?;
        Ok(Box::new(writer))
    }
}

fn seek_and_write(file: &mut BufWriter<File>, seek_to: Option<u64>, bytes: &[u8]) -> io::Result<()> {
    if let Some(position) = seek_to {
        file.seek(SeekFrom::Start(position))?;
    }
    file.write_all(bytes)
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, CaptureError> {
    let mut file = File::open(path)
        .map_err(|e| CaptureError::WriteFailed(format!("failed to read file for checksum: {}", e)))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| CaptureError::WriteFailed(format!("failed to read file for checksum: {}", e)))?;
    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
