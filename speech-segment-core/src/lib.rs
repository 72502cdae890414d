//! # speech-segment-core
//!
//! Rolling speech capture core.
//!
//! Accumulates microphone chunks in a frame buffer, drains them on a fixed
//! period into segments, encodes every segment as a canonical 16-bit PCM WAV
//! container and hands it to a segment sink (disk, or a transcription +
//! translation pipeline). Microphone backends and remote services plug in
//! through the traits in [`traits`].
//!
//! ## Architecture
//!
//! ```text
//! speech-segment-core (this crate)
//! ├── traits/       ← CaptureSource, SegmentSink, SessionDelegate, Transcriber, Translator
//! ├── models/       ← CaptureError, SessionState, SessionConfiguration, AudioSegment, etc.
//! ├── processing/   ← FrameBuffer, ContainerEncoder, WAV header generation
//! ├── session/      ← RecordingSession (scoped capture + drain timer)
//! ├── pipeline/     ← TranslationPipeline
//! └── storage/      ← SegmentFileWriter, metadata
//! ```

pub mod models;
pub mod pipeline;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{ServiceSettings, SessionConfiguration, StopPolicy};
pub use models::credential::BearerCredential;
pub use models::error::{CaptureError, ServiceError};
pub use models::format::ContainerFormatParams;
pub use models::segment::{AudioSegment, EncodedSegment, SegmentInfo};
pub use models::state::SessionState;
pub use models::transcript::{SegmentTranscript, TranscriptLog};
pub use pipeline::translation::TranslationPipeline;
pub use processing::encoder::{ContainerEncoder, EncodedContainer};
pub use processing::frame_buffer::FrameBuffer;
pub use processing::wav_format::WavHeader;
pub use session::recording::{RecordingSession, SessionDiagnostics, SessionSummary};
pub use storage::segment_writer::SegmentFileWriter;
pub use traits::capture_source::{CaptureSource, ChunkCallback};
pub use traits::segment_sink::{NullSink, SegmentSink};
pub use traits::session_delegate::SessionDelegate;
pub use traits::speech_service::{TranscriptionRequest, Transcriber, TranslationRequest, Translator};
