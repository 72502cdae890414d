use sha2::{Digest, Sha256};

use crate::models::error::CaptureError;
use crate::models::format::ContainerFormatParams;
use crate::models::segment::AudioSegment;
use crate::processing::wav_format::{self, WAV_HEADER_SIZE};

/// Quantize one float sample to a signed integer of `bits` width.
///
/// Clamps to `[-1.0, 1.0]`, then scales non-positive values by `2^(bits-1)`
/// and positive values by `2^(bits-1) - 1`, so `-1.0` hits the minimum and
/// `+1.0` hits the maximum without overflow. NaN maps to silence.
/// `bits` is clamped to `8..=32`.
pub fn quantize_sample(sample: f32, bits: u16) -> i32 {
    if sample.is_nan() {
        return 0;
    }
    let bits = bits.clamp(8, 32);
    let clamped = sample.clamp(-1.0, 1.0) as f64;
    let negative_scale = (1u64 << (bits - 1)) as f64;
    let positive_scale = negative_scale - 1.0;

    let scaled = if clamped <= 0.0 {
        clamped * negative_scale
    } else {
        clamped * positive_scale
    };
    scaled.round().clamp(-negative_scale, positive_scale) as i32
}

/// 16-bit case of [`quantize_sample`].
pub fn quantize_i16(sample: f32) -> i16 {
    quantize_sample(sample, 16) as i16
}

/// Append samples to `out` as little-endian PCM of the given width.
///
/// `bits` must be a depth accepted by [`ContainerFormatParams::validate`].
pub(crate) fn write_pcm(samples: &[f32], bits: u16, out: &mut Vec<u8>) {
    debug_assert!(matches!(bits, 16 | 24 | 32), "unsupported bit depth {}", bits);
    let width = (bits / 8) as usize;
    out.reserve(samples.len() * width);
    for &sample in samples {
        let value = quantize_sample(sample, bits);
        out.extend_from_slice(&value.to_le_bytes()[..width]);
    }
}

/// A complete WAV container for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedContainer {
    bytes: Vec<u8>,
    format: ContainerFormatParams,
    sample_count: usize,
}

impl EncodedContainer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the container holds a header and no samples.
    pub fn is_header_only(&self) -> bool {
        self.sample_count == 0
    }

    pub fn format(&self) -> ContainerFormatParams {
        self.format
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// The PCM payload following the header.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_SIZE..]
    }

    pub fn duration_secs(&self) -> f64 {
        self.format.duration_secs(self.sample_count)
    }

    /// SHA-256 of the whole container, lowercase hex.
    pub fn checksum(&self) -> String {
        format!("{:x}", Sha256::digest(&self.bytes))
    }
}

/// Serializes segments into WAV containers for a fixed format.
///
/// Encoding is pure: the same segment always yields the same bytes, and an
/// empty segment yields a valid header-only container.
#[derive(Debug, Clone, Copy)]
pub struct ContainerEncoder {
    format: ContainerFormatParams,
}

impl ContainerEncoder {
    pub fn new(format: ContainerFormatParams) -> Result<Self, CaptureError> {
        format.validate()?;
        Ok(Self { format })
    }

    pub fn format(&self) -> ContainerFormatParams {
        self.format
    }

    pub fn encode(&self, segment: &AudioSegment) -> EncodedContainer {
        self.encode_samples(segment.samples())
    }

    /// Encode interleaved samples directly.
    pub fn encode_samples(&self, samples: &[f32]) -> EncodedContainer {
        let data_size = wav_format::data_size_for(&self.format, samples.len());
        let header = wav_format::generate_wav_header(&self.format, data_size);

        let payload_len = samples.len() * self.format.bytes_per_sample() as usize;
        let mut bytes = Vec::with_capacity(WAV_HEADER_SIZE + payload_len);
        bytes.extend_from_slice(&header);
        write_pcm(samples, self.format.bits_per_sample, &mut bytes);

        EncodedContainer {
            bytes,
            format: self.format,
            sample_count: samples.len(),
        }
    }
}
