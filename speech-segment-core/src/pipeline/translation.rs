use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::models::config::ServiceSettings;
use crate::models::credential::BearerCredential;
use crate::models::error::{CaptureError, ServiceError};
use crate::models::segment::EncodedSegment;
use crate::models::transcript::{SegmentTranscript, TranscriptLog};
use crate::traits::segment_sink::SegmentSink;
use crate::traits::session_delegate::SessionDelegate;
use crate::traits::speech_service::{
    TranscriptionRequest, Transcriber, TranslationRequest, Translator,
};

/// Segment sink that transcribes each container, translates the text and
/// appends both to a running transcript.
///
/// ```text
/// [EncodedSegment] → [Transcriber] → text → [Translator] → [TranscriptLog]
/// ```
///
/// A failed call only costs its own segment; the transcript and the
/// recording session carry on with the next one.
pub struct TranslationPipeline<T: Transcriber, L: Translator> {
    transcriber: T,
    translator: L,
    settings: ServiceSettings,
    credential: BearerCredential,
    transcript: Arc<Mutex<TranscriptLog>>,
    delegate: Option<Arc<dyn SessionDelegate>>,
}

impl<T: Transcriber, L: Translator> TranslationPipeline<T, L> {
    /// Build a pipeline whose bearer token is read from
    /// `settings.credential_env`.
    pub fn new(transcriber: T, translator: L, settings: ServiceSettings) -> Result<Self, CaptureError> {
        settings.validate()?;
        let credential = BearerCredential::from_env(&settings.credential_env)?;
        Self::with_credential(transcriber, translator, settings, credential)
    }

    pub fn with_credential(
        transcriber: T,
        translator: L,
        settings: ServiceSettings,
        credential: BearerCredential,
    ) -> Result<Self, CaptureError> {
        settings.validate()?;
        Ok(Self {
            transcriber,
            translator,
            settings,
            credential,
            transcript: Arc::new(Mutex::new(TranscriptLog::new())),
            delegate: None,
        })
    }

    /// Receive `on_transcript` for every completed segment.
    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Snapshot of the transcript so far.
    pub fn transcript(&self) -> TranscriptLog {
        self.transcript.lock().clone()
    }

    /// Shared handle for readers that outlive the pipeline borrow.
    pub fn transcript_handle(&self) -> Arc<Mutex<TranscriptLog>> {
        Arc::clone(&self.transcript)
    }

    /// Forget previous results, e.g. when a new recording starts.
    pub fn reset(&self) {
        self.transcript.lock().clear();
    }

    /// Transcribe and translate one segment.
    pub fn process(&self, segment: &EncodedSegment) -> Result<SegmentTranscript, ServiceError> {
        let request = TranscriptionRequest {
            file_name: segment.file_name(),
            language: &self.settings.language,
            model: &self.settings.transcription_model,
            credential: &self.credential,
        };
        let recognized = self.transcriber.transcribe(segment, &request)?;
        let recognized = recognized.trim();
        if recognized.is_empty() {
            return Err(ServiceError::EmptyTranscription);
        }

        let request = TranslationRequest {
            model: &self.settings.translation_model,
            instruction: self.settings.translation_instruction(),
            prompt: self.settings.translation_prompt(recognized),
            text: recognized,
            credential: &self.credential,
        };
        let translated = self.translator.translate(&request)?;

        let entry = SegmentTranscript {
            segment_id: segment.info.id,
            index: segment.info.index,
            source_text: recognized.to_string(),
            translated_text: translated.trim().to_string(),
            completed_at: Utc::now(),
        };
        self.transcript.lock().push(entry.clone());

        log::debug!(
            "segment {} transcribed ({} chars) and translated ({} chars)",
            entry.index,
            entry.source_text.chars().count(),
            entry.translated_text.chars().count()
        );
        if let Some(ref delegate) = self.delegate {
            delegate.on_transcript(&entry);
        }
        Ok(entry)
    }
}

impl<T: Transcriber, L: Translator> SegmentSink for TranslationPipeline<T, L> {
    fn deliver(&self, segment: &EncodedSegment) -> Result<(), CaptureError> {
        self.process(segment).map(|_| ()).map_err(CaptureError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::ContainerFormatParams;
    use crate::models::segment::AudioSegment;
    use crate::processing::encoder::ContainerEncoder;
    use crate::processing::wav_format::WavHeader;
    use uuid::Uuid;

    /// Returns scripted results in order and records what it was sent.
    #[derive(Default)]
    struct ScriptedTranscriber {
        results: Mutex<Vec<Result<String, ServiceError>>>,
        seen: Mutex<Vec<(String, String, String)>>,
        auth_headers: Mutex<Vec<String>>,
    }

    impl ScriptedTranscriber {
        fn with(results: Vec<Result<String, ServiceError>>) -> Self {
            Self {
                results: Mutex::new(results),
                ..Default::default()
            }
        }
    }

    impl Transcriber for ScriptedTranscriber {
        fn transcribe(
            &self,
            segment: &EncodedSegment,
            request: &TranscriptionRequest<'_>,
        ) -> Result<String, ServiceError> {
            // Uploads must always be well-formed containers.
            WavHeader::parse(segment.container.as_bytes()).expect("valid header");
            self.seen.lock().push((
                request.file_name.clone(),
                request.language.to_string(),
                request.model.to_string(),
            ));
            self.auth_headers.lock().push(request.credential.header_value());
            self.results.lock().remove(0)
        }
    }

    #[derive(Default)]
    struct UppercaseTranslator {
        prompts: Mutex<Vec<String>>,
        fail_with: Mutex<Option<ServiceError>>,
    }

    impl Translator for UppercaseTranslator {
        fn translate(&self, request: &TranslationRequest<'_>) -> Result<String, ServiceError> {
            if let Some(err) = self.fail_with.lock().take() {
                return Err(err);
            }
            assert_eq!(request.credential.header_value(), "Bearer sk-test");
            self.prompts.lock().push(request.prompt.clone());
            Ok(request.text.to_uppercase())
        }
    }

    #[derive(Default)]
    struct TranscriptCollector {
        seen: Mutex<Vec<u64>>,
    }

    impl SessionDelegate for TranscriptCollector {
        fn on_transcript(&self, transcript: &SegmentTranscript) {
            self.seen.lock().push(transcript.index);
        }
    }

    fn pipeline_with(
        transcriber: ScriptedTranscriber,
        translator: UppercaseTranslator,
    ) -> TranslationPipeline<ScriptedTranscriber, UppercaseTranslator> {
        let credential = BearerCredential::new("sk-test").unwrap();
        TranslationPipeline::with_credential(transcriber, translator, ServiceSettings::default(), credential).unwrap()
    }

    fn segment(index: u64) -> EncodedSegment {
        let audio = AudioSegment::from_chunks([vec![0.2f32; 32]]);
        let container = ContainerEncoder::new(ContainerFormatParams::SPEECH_MONO_16)
            .unwrap()
            .encode(&audio);
        EncodedSegment::new(Uuid::new_v4(), index, &audio, container)
    }

    #[test]
    fn transcribes_then_translates_and_accumulates() {
        let transcriber = ScriptedTranscriber::with(vec![Ok(" hello ".into()), Ok("world".into())]);
        let mut pipeline =
            pipeline_with(transcriber, UppercaseTranslator::default());
        let collector = Arc::new(TranscriptCollector::default());
        pipeline.set_delegate(collector.clone());

        pipeline.deliver(&segment(0)).unwrap();
        let entry = pipeline.process(&segment(1)).unwrap();
        assert_eq!(entry.translated_text, "WORLD");

        let transcript = pipeline.transcript();
        assert_eq!(transcript.source_text(), "hello world");
        assert_eq!(transcript.translated_text(), "HELLO WORLD");
        assert_eq!(*collector.seen.lock(), vec![0, 1]);

        let seen = pipeline.transcriber.seen.lock();
        assert_eq!(
            seen[0],
            ("segment_00000.wav".to_string(), "ar".to_string(), "whisper-1".to_string())
        );
        assert_eq!(pipeline.transcriber.auth_headers.lock()[0], "Bearer sk-test");
        assert_eq!(
            pipeline.translator.prompts.lock()[0],
            "Translate the following Arabic text to English: \"hello\""
        );
    }

    #[test]
    fn empty_transcription_is_distinguished() {
        let transcriber = ScriptedTranscriber::with(vec![Ok("   ".into())]);
        let pipeline =
            pipeline_with(transcriber, UppercaseTranslator::default());

        assert_eq!(pipeline.process(&segment(0)), Err(ServiceError::EmptyTranscription));
        assert!(pipeline.translator.prompts.lock().is_empty());
        assert!(pipeline.transcript().is_empty());
    }

    #[test]
    fn service_failures_surface_as_capture_errors() {
        let transcriber = ScriptedTranscriber::with(vec![Err(ServiceError::Unauthorized), Ok("again".into())]);
        let translator = UppercaseTranslator::default();
        *translator.fail_with.lock() = Some(ServiceError::RateLimited);
        let pipeline = pipeline_with(transcriber, translator);

        assert_eq!(
            pipeline.deliver(&segment(0)),
            Err(CaptureError::Service(ServiceError::Unauthorized))
        );
        assert_eq!(
            pipeline.deliver(&segment(1)),
            Err(CaptureError::Service(ServiceError::RateLimited))
        );
        assert!(pipeline.transcript().is_empty());
    }

    #[test]
    fn failure_does_not_block_next_segment() {
        let transcriber = ScriptedTranscriber::with(vec![
            Err(ServiceError::Network("connection reset".into())),
            Ok("second".into()),
        ]);
        let pipeline =
            pipeline_with(transcriber, UppercaseTranslator::default());

        assert!(pipeline.deliver(&segment(0)).is_err());
        pipeline.deliver(&segment(1)).unwrap();
        assert_eq!(pipeline.transcript().translated_text(), "SECOND");
    }

    #[test]
    fn reset_clears_transcript() {
        let transcriber = ScriptedTranscriber::with(vec![Ok("one".into())]);
        let pipeline =
            pipeline_with(transcriber, UppercaseTranslator::default());
        pipeline.deliver(&segment(0)).unwrap();
        let handle = pipeline.transcript_handle();
        assert_eq!(handle.lock().len(), 1);

        pipeline.reset();
        assert!(handle.lock().is_empty());
    }

    #[test]
    fn invalid_settings_rejected() {
        let settings = ServiceSettings {
            language: String::new(),
            ..Default::default()
        };
        assert!(TranslationPipeline::new(ScriptedTranscriber::default(), UppercaseTranslator::default(), settings).is_err());
    }

    #[test]
    fn unset_credential_is_reported() {
        let settings = ServiceSettings {
            credential_env: "SPEECH_SEGMENT_PIPELINE_UNSET_KEY".into(),
            ..Default::default()
        };
        let result = TranslationPipeline::new(ScriptedTranscriber::default(), UppercaseTranslator::default(), settings);
        assert!(matches!(
            result,
            Err(CaptureError::Service(ServiceError::MissingCredential(_)))
        ));
    }

    #[test]
    fn credential_read_from_environment() {
        std::env::set_var("SPEECH_SEGMENT_PIPELINE_SET_KEY", "sk-test");
        let settings = ServiceSettings {
            credential_env: "SPEECH_SEGMENT_PIPELINE_SET_KEY".into(),
            ..Default::default()
        };
        let transcriber = ScriptedTranscriber::with(vec![Ok("hola".into())]);
        let pipeline = TranslationPipeline::new(transcriber, UppercaseTranslator::default(), settings).unwrap();

        pipeline.deliver(&segment(0)).unwrap();
        assert_eq!(*pipeline.transcriber.auth_headers.lock(), vec!["Bearer sk-test".to_string()]);
    }
}
