//! RIFF WAVE container layout.
//!
//! A 44-byte header is written with a zero data size when the file is
//! opened; the size fields are patched when it is closed. Only constant
//! bit rate linear PCM fits in this container.

use crate::models::format::AudioFormat;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Offset of the RIFF chunk size field.
pub const RIFF_SIZE_OFFSET: u64 = 4;

/// Offset of the `data` sub-chunk size field.
pub const DATA_SIZE_OFFSET: u64 = 40;

/// Check that `format` can be stored in a WAV file.
pub fn check_format(format: &AudioFormat) -> Result<(), String> {
    if !format.is_linear_pcm() || format.is_variable_bit_rate() {
        return Err(format!("WAV cannot hold {}", format));
    }
    if format.sample_rate > u32::MAX as f64 || format.channels_per_frame > u16::MAX as u32 {
        return Err(format!("format out of range for WAV: {}", format));
    }
    format.validate()
}

/// Generate a 44-byte WAV RIFF header.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    file size - 8 (36 + data_size)
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * block_align
/// [32-33]  block_align = bytes per frame
/// [34-35]  bits per channel
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(format: &AudioFormat, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let sample_rate = format.sample_rate as u32;
    let channels = format.channels_per_frame as u16;
    let block_align = format.bytes_per_frame as u16;
    let byte_rate = sample_rate * block_align as u32;
    let bit_depth = format.bits_per_channel as u16;
    let chunk_size = 36u32.saturating_add(data_size);

    let mut header = [0u8; WAV_HEADER_SIZE];

    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// RIFF chunk size for a file holding `data_size` bytes of audio.
pub fn riff_chunk_size(data_size: u64) -> u32 {
    (data_size + WAV_HEADER_SIZE as u64 - 8).min(u32::MAX as u64) as u32
}

/// Clamp the data size to the 32-bit field.
pub fn data_chunk_size(data_size: u64) -> u32 {
    data_size.min(u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn header_magic() {
        let header = generate_wav_header(&AudioFormat::linear_pcm(16000.0, 16, 1), 0);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
    }

    #[test]
    fn header_16khz_mono_16bit() {
        let header = generate_wav_header(&AudioFormat::linear_pcm(16000.0, 16, 1), 3200);

        assert_eq!(u16::from_le_bytes([header[20], header[21]]), 1);
        assert_eq!(u16::from_le_bytes([header[22], header[23]]), 1);
        assert_eq!(read_u32(&header, 24), 16000);
        assert_eq!(read_u32(&header, 28), 32000);
        assert_eq!(u16::from_le_bytes([header[32], header[33]]), 2);
        assert_eq!(u16::from_le_bytes([header[34], header[35]]), 16);
        assert_eq!(read_u32(&header, 40), 3200);
        assert_eq!(read_u32(&header, 4), 36 + 3200);
    }

    #[test]
    fn size_helpers() {
        assert_eq!(riff_chunk_size(100), 136);
        assert_eq!(data_chunk_size(u64::MAX), u32::MAX);
    }

    #[test]
    fn rejects_variable_bit_rate() {
        let aac = AudioFormat::variable_bit_rate(*b"aac ", 44100.0, 2, 1024);
        assert!(check_format(&aac).is_err());
        assert!(check_format(&AudioFormat::linear_pcm(44100.0, 24, 2)).is_ok());
    }
}
