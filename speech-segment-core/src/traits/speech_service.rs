use crate::models::credential::BearerCredential;
use crate::models::error::ServiceError;
use crate::models::segment::EncodedSegment;

/// Parameters sent with a container to the transcription service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionRequest<'a> {
    /// Attachment name, e.g. `segment_00003.wav`.
    pub file_name: String,
    /// Source language hint (ISO 639-1).
    pub language: &'a str,
    pub model: &'a str,
    /// Sent as the `Authorization` header.
    pub credential: &'a BearerCredential,
}

/// Parameters sent with recognized text to the translation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest<'a> {
    pub model: &'a str,
    /// System instruction describing the translation task.
    pub instruction: String,
    /// User prompt carrying the recognized text.
    pub prompt: String,
    /// The recognized text on its own.
    pub text: &'a str,
    pub credential: &'a BearerCredential,
}

/// Remote speech-to-text collaborator.
pub trait Transcriber: Send + Sync {
    fn transcribe(
        &self,
        segment: &EncodedSegment,
        request: &TranscriptionRequest<'_>,
    ) -> Result<String, ServiceError>;
}

/// Remote text translation collaborator.
pub trait Translator: Send + Sync {
    fn translate(&self, request: &TranslationRequest<'_>) -> Result<String, ServiceError>;
}
