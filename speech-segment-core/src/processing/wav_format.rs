//! WAV container header utilities.
//!
//! Generates and reads the canonical 44-byte RIFF/WAVE header for linear
//! PCM. All multi-byte fields are little-endian.

use crate::models::error::CaptureError;
use crate::models::format::ContainerFormatParams;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Size of the `fmt ` sub-chunk body for plain PCM.
const PCM_FMT_CHUNK_SIZE: u32 = 16;

/// Format code for linear PCM.
const PCM_FORMAT_CODE: u16 = 1;

/// Generate a 44-byte WAV RIFF header.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bits_per_sample / 8
/// [32-33]  block_align = channels * bits_per_sample / 8
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(params: &ContainerFormatParams, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let chunk_size = data_size.saturating_add(36);

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&PCM_FMT_CHUNK_SIZE.to_le_bytes());
    header[20..22].copy_from_slice(&PCM_FORMAT_CODE.to_le_bytes());
    header[22..24].copy_from_slice(&params.channels.to_le_bytes());
    header[24..28].copy_from_slice(&params.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&params.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&params.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&params.bits_per_sample.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Payload byte length for `sample_count` samples, saturated to the 32-bit field.
pub fn data_size_for(params: &ContainerFormatParams, sample_count: usize) -> u32 {
    let bytes = sample_count as u64 * params.bytes_per_sample() as u64;
    u32::try_from(bytes).unwrap_or(u32::MAX)
}

/// Fields recovered from a canonical 44-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub format: ContainerFormatParams,
    pub riff_size: u32,
    pub data_size: u32,
}

impl WavHeader {
    /// Parse and check the canonical PCM header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, CaptureError> {
        if bytes.len() < WAV_HEADER_SIZE {
            return Err(CaptureError::EncodingFailed(format!(
                "header too short: {} bytes",
                bytes.len()
            )));
        }

        expect_tag(bytes, 0, b"RIFF")?;
        expect_tag(bytes, 8, b"WAVE")?;
        expect_tag(bytes, 12, b"fmt ")?;
        expect_tag(bytes, 36, b"data")?;

        let fmt_size = read_u32(bytes, 16);
        if fmt_size != PCM_FMT_CHUNK_SIZE {
            return Err(CaptureError::EncodingFailed(format!(
                "unexpected fmt chunk size {}",
                fmt_size
            )));
        }
        let format_code = read_u16(bytes, 20);
        if format_code != PCM_FORMAT_CODE {
            return Err(CaptureError::EncodingFailed(format!(
                "not linear PCM (format code {})",
                format_code
            )));
        }

        let format = ContainerFormatParams {
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            bits_per_sample: read_u16(bytes, 34),
        };
        format.validate()?;

        if read_u32(bytes, 28) != format.byte_rate() || read_u16(bytes, 32) != format.block_align() {
            return Err(CaptureError::EncodingFailed(
                "byte rate or block align disagrees with format".into(),
            ));
        }

        Ok(Self {
            format,
            riff_size: read_u32(bytes, 4),
            data_size: read_u32(bytes, 40),
        })
    }
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<(), CaptureError> {
    if &bytes[offset..offset + 4] != tag {
        return Err(CaptureError::EncodingFailed(format!(
            "missing {:?} tag at offset {}",
            String::from_utf8_lossy(tag),
            offset
        )));
    }
    Ok(())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
