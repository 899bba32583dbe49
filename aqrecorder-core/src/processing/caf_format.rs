//! Core Audio Format (CAF) container layout.
//!
//! All fields are big-endian. The file is laid out as
//! ```text
//! [8]   file header: "caff", version 1, flags 0
//! [44]  desc chunk: header + 32-byte stream description
//! [16]  data chunk header: "data", size (-1 while open), edit count
//! [..]  packet data
//! [..]  pakt chunk (variable bit rate only, written on close)
//! ```
//! The data chunk size is patched on close.

use crate::models::format::{AudioFormat, FormatFlags};
use crate::processing::buffer_pool::PacketDescription;

pub const FILE_HEADER_SIZE: usize = 8;
pub const CHUNK_HEADER_SIZE: usize = 12;
const DESC_BODY_SIZE: usize = 32;
const EDIT_COUNT_SIZE: usize = 4;

/// Offset of the data chunk's 64-bit size field.
pub const DATA_SIZE_OFFSET: u64 = (FILE_HEADER_SIZE + CHUNK_HEADER_SIZE + DESC_BODY_SIZE + 4) as u64;

/// Offset of the first audio byte.
pub const AUDIO_DATA_OFFSET: u64 =
    (FILE_HEADER_SIZE + CHUNK_HEADER_SIZE + DESC_BODY_SIZE + CHUNK_HEADER_SIZE + EDIT_COUNT_SIZE) as u64;

const CAF_LPCM_FLAG_IS_FLOAT: u32 = 1 << 0;
const CAF_LPCM_FLAG_IS_LITTLE_ENDIAN: u32 = 1 << 1;

/// Everything written before the first audio byte.
pub fn generate_caf_header(format: &AudioFormat) -> Vec<u8> {
    let mut header = Vec::with_capacity(AUDIO_DATA_OFFSET as usize);

    header.extend_from_slice(b"caff");
    header.extend_from_slice(&1u16.to_be_bytes());
    header.extend_from_slice(&0u16.to_be_bytes());

    header.extend_from_slice(b"desc");
    header.extend_from_slice(&(DESC_BODY_SIZE as i64).to_be_bytes());
    header.extend_from_slice(&format.sample_rate.to_be_bytes());
    header.extend_from_slice(&format.format_id.four_cc());
    header.extend_from_slice(&caf_format_flags(format).to_be_bytes());
    header.extend_from_slice(&format.bytes_per_packet().to_be_bytes());
    header.extend_from_slice(&format.frames_per_packet.to_be_bytes());
    header.extend_from_slice(&format.channels_per_frame.to_be_bytes());
    header.extend_from_slice(&format.bits_per_channel.to_be_bytes());

    header.extend_from_slice(b"data");
    header.extend_from_slice(&(-1i64).to_be_bytes());
    header.extend_from_slice(&0u32.to_be_bytes());

    header
}

/// Flags as CAF defines them for linear PCM; zero for other formats.
pub fn caf_format_flags(format: &AudioFormat) -> u32 {
    if !format.is_linear_pcm() {
        return 0;
    }
    let mut flags = 0;
    if format.flags.contains(FormatFlags::IS_FLOAT) {
        flags |= CAF_LPCM_FLAG_IS_FLOAT;
    }
    if !format.flags.contains(FormatFlags::IS_BIG_ENDIAN) {
        flags |= CAF_LPCM_FLAG_IS_LITTLE_ENDIAN;
    }
    flags
}

/// Data chunk size for `audio_bytes` bytes of packet data.
pub fn data_chunk_size(audio_bytes: u64) -> i64 {
    (audio_bytes + EDIT_COUNT_SIZE as u64) as i64
}

/// Build the packet table chunk for a variable bit rate stream.
pub fn generate_pakt_chunk(format: &AudioFormat, packets: &[PacketDescription]) -> Vec<u8> {
    let mut table = Vec::with_capacity(packets.len() * 2);
    let mut valid_frames: i64 = 0;
    for packet in packets {
        if format.bytes_per_packet() == 0 {
            encode_varint(packet.data_byte_size as u64, &mut table);
        }
        let frames = if format.frames_per_packet == 0 {
            encode_varint(packet.variable_frames_in_packet as u64, &mut table);
            packet.variable_frames_in_packet
        } else {
            format.frames_per_packet
        };
        valid_frames += frames as i64;
    }

    let body_size = 8 + 8 + 4 + 4 + table.len();
    let mut chunk = Vec::with_capacity(CHUNK_HEADER_SIZE + body_size);
    chunk.extend_from_slice(b"pakt");
    chunk.extend_from_slice(&(body_size as i64).to_be_bytes());
    chunk.extend_from_slice(&(packets.len() as i64).to_be_bytes());
    chunk.extend_from_slice(&valid_frames.to_be_bytes());
    chunk.extend_from_slice(&0i32.to_be_bytes());
    chunk.extend_from_slice(&0i32.to_be_bytes());
    chunk.extend_from_slice(&table);
    chunk
}

/// Big-endian base-128 integer with a continuation bit on all but the last byte.
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    loop {
        groups[count] = (value & 0x7f) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(groups[i] | continuation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn be_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn be_i64(bytes: &[u8], at: usize) -> i64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[at..at + 8]);
        i64::from_be_bytes(raw)
    }

    #[test]
    fn header_layout_for_16k_mono_pcm() {
        let header = generate_caf_header(&AudioFormat::linear_pcm(16000.0, 16, 1));
        assert_eq!(header.len() as u64, AUDIO_DATA_OFFSET);
        assert_eq!(&header[0..4], b"caff");
        assert_eq!(&header[8..12], b"desc");
        assert_eq!(be_i64(&header, 12), 32);

        let mut rate = [0u8; 8];
        rate.copy_from_slice(&header[20..28]);
        assert_eq!(f64::from_be_bytes(rate), 16000.0);
        assert_eq!(&header[28..32], b"lpcm");
        assert_eq!(be_u32(&header, 32), CAF_LPCM_FLAG_IS_LITTLE_ENDIAN);
        assert_eq!(be_u32(&header, 36), 2);
        assert_eq!(be_u32(&header, 40), 1);
        assert_eq!(be_u32(&header, 44), 1);
        assert_eq!(be_u32(&header, 48), 16);

        assert_eq!(&header[52..56], b"data");
        assert_eq!(be_i64(&header, DATA_SIZE_OFFSET as usize), -1);
    }

    #[test]
    fn varint_encoding() {
        let mut out = Vec::new();
        encode_varint(0, &mut out);
        encode_varint(127, &mut out);
        encode_varint(128, &mut out);
        encode_varint(300, &mut out);
        assert_eq!(out, vec![0x00, 0x7f, 0x81, 0x00, 0x82, 0x2c]);
    }

    #[test]
    fn pakt_chunk_for_vbr_stream() {
        let format = AudioFormat::variable_bit_rate(*b"aac ", 44100.0, 2, 1024);
        let packets = [
            PacketDescription {
                start_offset: 0,
                variable_frames_in_packet: 0,
                data_byte_size: 100,
            },
            PacketDescription {
                start_offset: 100,
                variable_frames_in_packet: 0,
                data_byte_size: 300,
            },
        ];
        let chunk = generate_pakt_chunk(&format, &packets);
        assert_eq!(&chunk[0..4], b"pakt");
        assert_eq!(be_i64(&chunk, 12), 2);
        assert_eq!(be_i64(&chunk, 20), 2048);
        assert_eq!(&chunk[36..], &[100, 0x82, 0x2c]);
        assert_eq!(be_i64(&chunk, 4) as usize, chunk.len() - CHUNK_HEADER_SIZE);
    }

    #[test]
    fn data_chunk_size_counts_edit_field() {
        assert_eq!(data_chunk_size(16000), 16004);
    }
}
