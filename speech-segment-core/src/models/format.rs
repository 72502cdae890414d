use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// PCM layout written into every container header of a session.
///
/// Chosen once when recording starts. Every container produced by the
/// session describes exactly this layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerFormatParams {
    /// Sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Interleaved channel count (default: 1).
    pub channels: u16,

    /// Bits per PCM sample (default: 16). Valid values: 16, 24, 32.
    pub bits_per_sample: u16,
}

impl ContainerFormatParams {
    /// 44.1 kHz mono 16-bit, the layout speech uploads use.
    pub const SPEECH_MONO_16: Self = Self {
        sample_rate: 44_100,
        channels: 1,
        bits_per_sample: 16,
    };

    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.sample_rate == 0 {
            return Err(CaptureError::ConfigurationFailed(
                "sample rate must be positive".into(),
            ));
        }
        if !(1..=8).contains(&self.channels) {
            return Err(CaptureError::ConfigurationFailed(format!(
                "unsupported channel count: {}",
                self.channels
            )));
        }
        if ![16, 24, 32].contains(&self.bits_per_sample) {
            return Err(CaptureError::ConfigurationFailed(format!(
                "unsupported bit depth: {}",
                self.bits_per_sample
            )));
        }
        if self.sample_rate.checked_mul(self.block_align() as u32).is_none() {
            return Err(CaptureError::ConfigurationFailed(format!(
                "byte rate of {} Hz x {} bytes overflows the header field",
                self.sample_rate,
                self.block_align()
            )));
        }
        Ok(())
    }

    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// `channels * bits_per_sample / 8`
    pub fn block_align(&self) -> u16 {
        self.channels * self.bytes_per_sample()
    }

    /// `sample_rate * channels * bits_per_sample / 8`, saturating for
    /// layouts that fail [`validate`](Self::validate).
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(self.block_align() as u32)
    }

    /// Playback length of `sample_count` interleaved samples.
    pub fn duration_secs(&self, sample_count: usize) -> f64 {
        let frames = sample_count as f64 / self.channels.max(1) as f64;
        frames / self.sample_rate.max(1) as f64
    }
}

impl Default for ContainerFormatParams {
    fn default() -> Self {
        Self::SPEECH_MONO_16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_is_speech_mono() {
        let params = ContainerFormatParams::default();
        assert_eq!(params.sample_rate, 44_100);
        assert_eq!(params.channels, 1);
        assert_eq!(params.bits_per_sample, 16);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn derived_fields() {
        let mono = ContainerFormatParams::SPEECH_MONO_16;
        assert_eq!(mono.block_align(), 2);
        assert_eq!(mono.byte_rate(), 88_200);

        let stereo_24 = ContainerFormatParams::new(48_000, 2, 24);
        assert_eq!(stereo_24.block_align(), 6);
        assert_eq!(stereo_24.byte_rate(), 288_000);
    }

    #[test]
    fn rejects_invalid_layouts() {
        assert!(ContainerFormatParams::new(0, 1, 16).validate().is_err());
        assert!(ContainerFormatParams::new(44_100, 0, 16).validate().is_err());
        assert!(ContainerFormatParams::new(44_100, 1, 8).validate().is_err());
        assert!(ContainerFormatParams::new(44_100, 1, 12).validate().is_err());
    }

    #[test]
    fn rejects_byte_rate_overflow() {
        let huge = ContainerFormatParams::new(u32::MAX / 2, 8, 32);
        assert!(matches!(huge.validate(), Err(CaptureError::ConfigurationFailed(_))));

        let largest_mono = ContainerFormatParams::new(u32::MAX / 2, 1, 16);
        assert!(largest_mono.validate().is_ok());
        assert_eq!(largest_mono.byte_rate(), (u32::MAX / 2) * 2);
    }

    #[test]
    fn duration_counts_frames() {
        let mono = ContainerFormatParams::new(16_000, 1, 16);
        assert_relative_eq!(mono.duration_secs(8_000), 0.5);

        let stereo = ContainerFormatParams::new(16_000, 2, 16);
        assert_relative_eq!(stereo.duration_secs(8_000), 0.25);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let params: ContainerFormatParams =
            serde_json::from_str(r#"{ "sample_rate": 16000 }"#).unwrap();
        assert_eq!(params, ContainerFormatParams::new(16_000, 1, 16));
    }
}
