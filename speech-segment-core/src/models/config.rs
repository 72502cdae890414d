use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;
use super::format::ContainerFormatParams;

/// What happens to a partially accumulated segment when recording stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopPolicy {
    /// Encode and deliver the partial segment (skipped if empty).
    #[default]
    Flush,
    /// Drop whatever was captured since the last drain.
    Discard,
}

/// Configuration for a recording session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfiguration {
    /// Container layout; fixed for the whole session.
    pub format: ContainerFormatParams,

    /// Period of the drain timer in milliseconds (default: 3000).
    pub drain_interval_ms: u64,

    /// Partial segment handling on stop (default: flush).
    pub stop_policy: StopPolicy,

    /// Seconds of audio to pre-allocate in the frame buffer (default: 5,
    /// at most [`MAX_BUFFER_HINT_SECS`]).
    pub buffer_hint_secs: u32,
}

/// Upper bound on `buffer_hint_secs`.
pub const MAX_BUFFER_HINT_SECS: u32 = 60;

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), CaptureError> {
        self.format.validate()?;
        if self.drain_interval_ms == 0 {
            return Err(CaptureError::ConfigurationFailed(
                "drain interval must be positive".into(),
            ));
        }
        if self.buffer_hint_secs > MAX_BUFFER_HINT_SECS {
            return Err(CaptureError::ConfigurationFailed(format!(
                "buffer hint of {}s exceeds {}s",
                self.buffer_hint_secs, MAX_BUFFER_HINT_SECS
            )));
        }
        self.buffer_capacity()?;
        Ok(())
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.drain_interval_ms)
    }

    /// Initial frame buffer capacity in samples.
    pub fn buffer_capacity(&self) -> Result<usize, CaptureError> {
        (self.format.sample_rate as usize)
            .checked_mul(self.format.channels as usize)
            .and_then(|n| n.checked_mul(self.buffer_hint_secs as usize))
            .ok_or_else(|| CaptureError::ConfigurationFailed("frame buffer capacity overflows".into()))
    }

    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::ConfigurationFailed(format!("invalid session config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        let json = fs::read_to_string(path).map_err(|e| {
            CaptureError::ConfigurationFailed(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            format: ContainerFormatParams::default(),
            drain_interval_ms: 3000,
            stop_policy: StopPolicy::Flush,
            buffer_hint_secs: 5,
        }
    }
}

/// Settings handed to the transcription and translation collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Language hint for transcription (ISO 639-1).
    pub language: String,
    pub transcription_model: String,
    pub translation_model: String,
    pub source_language_name: String,
    pub target_language_name: String,
    /// Environment variable holding the bearer token.
    pub credential_env: String,
}

impl ServiceSettings {
    /// System instruction for the translation model.
    pub fn translation_instruction(&self) -> String {
        format!(
            "You are a helpful assistant that translates {} to {}. Keep {} words that are spoken as {}.",
            self.source_language_name,
            self.target_language_name,
            self.target_language_name,
            self.target_language_name
        )
    }

    /// User prompt wrapping the recognized text.
    pub fn translation_prompt(&self, text: &str) -> String {
        format!(
            "Translate the following {} text to {}: \"{}\"",
            self.source_language_name, self.target_language_name, text
        )
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        let required = [
            ("language", &self.language),
            ("transcription_model", &self.transcription_model),
            ("translation_model", &self.translation_model),
            ("credential_env", &self.credential_env),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CaptureError::ConfigurationFailed(format!("{} must be set", name)));
            }
        }
        Ok(())
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            language: "ar".into(),
            transcription_model: "whisper-1".into(),
            translation_model: "gpt-3.5-turbo".into(),
            source_language_name: "Arabic".into(),
            target_language_name: "English".into(),
            credential_env: "SPEECH_API_KEY".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_validate() {
        let config = SessionConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.drain_interval(), Duration::from_secs(3));
        assert_eq!(config.buffer_capacity().unwrap(), 44_100 * 5);
        assert!(ServiceSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_interval_rejected() {
        let config = SessionConfiguration {
            drain_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CaptureError::ConfigurationFailed(_))));
    }

    #[test]
    fn oversized_buffer_hint_rejected() {
        let err = SessionConfiguration::from_json(r#"{ "buffer_hint_secs": 4000000000 }"#);
        assert!(matches!(err, Err(CaptureError::ConfigurationFailed(_))));

        let at_limit = SessionConfiguration {
            buffer_hint_secs: MAX_BUFFER_HINT_SECS,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
        assert_eq!(at_limit.buffer_capacity().unwrap(), 44_100 * 60);

        let zero = SessionConfiguration {
            buffer_hint_secs: 0,
            ..Default::default()
        };
        assert_eq!(zero.buffer_capacity().unwrap(), 0);
    }

    #[test]
    fn parses_partial_json() {
        let config = SessionConfiguration::from_json(
            r#"{ "drain_interval_ms": 1500, "stop_policy": "discard", "format": { "sample_rate": 16000 } }"#,
        )
        .unwrap();
        assert_eq!(config.drain_interval_ms, 1500);
        assert_eq!(config.stop_policy, StopPolicy::Discard);
        assert_eq!(config.format.sample_rate, 16_000);
        assert_eq!(config.format.bits_per_sample, 16);
    }

    #[test]
    fn invalid_json_layout_rejected() {
        let err = SessionConfiguration::from_json(r#"{ "format": { "bits_per_sample": 8 } }"#);
        assert!(err.is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "drain_interval_ms": 250 }}"#).unwrap();
        let config = SessionConfiguration::load(file.path()).unwrap();
        assert_eq!(config.drain_interval_ms, 250);
    }

    #[test]
    fn translation_prompts() {
        let settings = ServiceSettings::default();
        assert_eq!(
            settings.translation_prompt("مرحبا"),
            "Translate the following Arabic text to English: \"مرحبا\""
        );
        assert!(settings.translation_instruction().contains("Keep English words"));
    }

    #[test]
    fn blank_model_rejected() {
        let settings = ServiceSettings {
            transcription_model: " ".into(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
