use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Four-character format code, as stored in container headers.
pub type FourCc = [u8; 4];

/// Audio data format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatId {
    /// Uncompressed linear PCM.
    LinearPcm,
    /// Any encoded format delivered by the hardware as opaque packets.
    Encoded(FourCc),
}

impl FormatId {
    pub fn four_cc(&self) -> FourCc {
        match self {
            Self::LinearPcm => *b"lpcm",
            Self::Encoded(code) => *code,
        }
    }
}

/// Sample layout flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FormatFlags(u32);

impl FormatFlags {
    pub const IS_FLOAT: Self = Self(1 << 0);
    pub const IS_BIG_ENDIAN: Self = Self(1 << 1);
    pub const IS_SIGNED_INTEGER: Self = Self(1 << 2);
    pub const IS_PACKED: Self = Self(1 << 3);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FormatFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How packets are sized within the stream.
///
/// Buffer sizing and the write cursor branch on this rather than on a zero
/// `bytes_per_packet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketLayout {
    /// Every packet has the same byte size (linear PCM).
    ConstantBitRate { bytes_per_packet: u32 },
    /// Packet sizes vary; each buffer carries packet descriptions.
    VariableBitRate,
}

/// Format descriptor for the captured stream.
///
/// Immutable once capture starts. For linear PCM one packet is one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: f64,
    pub format_id: FormatId,
    pub flags: FormatFlags,
    pub layout: PacketLayout,
    pub frames_per_packet: u32,
    pub bytes_per_frame: u32,
    pub channels_per_frame: u32,
    pub bits_per_channel: u32,
}

impl AudioFormat {
    /// Packed, signed-integer, little-endian linear PCM.
    pub fn linear_pcm(sample_rate: f64, bits_per_channel: u32, channels: u32) -> Self {
        let bytes_per_frame = bits_per_channel / 8 * channels;
        Self {
            sample_rate,
            format_id: FormatId::LinearPcm,
            flags: FormatFlags::IS_SIGNED_INTEGER | FormatFlags::IS_PACKED,
            layout: PacketLayout::ConstantBitRate {
                bytes_per_packet: bytes_per_frame,
            },
            frames_per_packet: 1,
            bytes_per_frame,
            channels_per_frame: channels,
            bits_per_channel,
        }
    }

    /// An encoded format whose packets vary in size.
    pub fn variable_bit_rate(format_id: FourCc, sample_rate: f64, channels: u32, frames_per_packet: u32) -> Self {
        Self {
            sample_rate,
            format_id: FormatId::Encoded(format_id),
            flags: FormatFlags::empty(),
            layout: PacketLayout::VariableBitRate,
            frames_per_packet,
            bytes_per_frame: 0,
            channels_per_frame: channels,
            bits_per_channel: 0,
        }
    }

    /// Bytes per packet as stored in headers; 0 for variable bit rate.
    pub fn bytes_per_packet(&self) -> u32 {
        match self.layout {
            PacketLayout::ConstantBitRate { bytes_per_packet } => bytes_per_packet,
            PacketLayout::VariableBitRate => 0,
        }
    }

    pub fn is_variable_bit_rate(&self) -> bool {
        matches!(self.layout, PacketLayout::VariableBitRate)
    }

    pub fn is_linear_pcm(&self) -> bool {
        self.format_id == FormatId::LinearPcm
    }

    /// Whole packets contained in `byte_count` bytes, if packets are fixed-size.
    pub fn packets_for_bytes(&self, byte_count: usize) -> Option<u64> {
        match self.layout {
            PacketLayout::ConstantBitRate { bytes_per_packet } if bytes_per_packet > 0 => {
                Some((byte_count / bytes_per_packet as usize) as u64)
            }
            _ => None,
        }
    }

    /// Playback duration of `packets` packets in seconds.
    pub fn duration_of_packets(&self, packets: u64) -> f64 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        (packets * self.frames_per_packet as u64) as f64 / self.sample_rate
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate <= 0.0 || !self.sample_rate.is_finite() {
            return Err(format!("invalid sample rate: {}", self.sample_rate));
        }
        if self.channels_per_frame == 0 {
            return Err("channel count must be positive".into());
        }
        if self.frames_per_packet == 0 {
            return Err("frames per packet must be positive".into());
        }
        if !self.is_linear_pcm() {
            return Ok(());
        }

        let PacketLayout::ConstantBitRate { bytes_per_packet } = self.layout else {
            return Err("linear PCM must be constant bit rate".into());
        };
        if self.bits_per_channel == 0 || self.bits_per_channel % 8 != 0 {
            return Err(format!("unsupported bit depth: {}", self.bits_per_channel));
        }
        if self.flags.contains(FormatFlags::IS_PACKED)
            && self.bytes_per_frame != self.bits_per_channel / 8 * self.channels_per_frame
        {
            return Err(format!(
                "bytes per frame {} inconsistent with {} channels of {} bits",
                self.bytes_per_frame, self.channels_per_frame, self.bits_per_channel
            ));
        }
        if bytes_per_packet != self.bytes_per_frame * self.frames_per_packet {
            return Err(format!(
                "bytes per packet {} inconsistent with bytes per frame {}",
                bytes_per_packet, self.bytes_per_frame
            ));
        }
        Ok(())
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = String::from_utf8_lossy(&self.format_id.four_cc()).into_owned();
        match self.layout {
            PacketLayout::ConstantBitRate { .. } => write!(
                f,
                "{} Hz, {} ch, {}-bit {}",
                self.sample_rate, self.channels_per_frame, self.bits_per_channel, code
            ),
            PacketLayout::VariableBitRate => write!(
                f,
                "{} Hz, {} ch, {} (VBR, {} frames/packet)",
                self.sample_rate, self.channels_per_frame, code, self.frames_per_packet
            ),
        }
    }
}
