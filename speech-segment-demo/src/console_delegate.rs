use speech_segment_core::{CaptureError, SegmentInfo, SegmentTranscript, SessionDelegate, SessionState};

/// SessionDelegate that reports events through the log.
pub struct ConsoleDelegate;

impl SessionDelegate for ConsoleDelegate {
    fn on_state_changed(&self, state: &SessionState) {
        log::info!("session {} ({} segments)", state.name(), state.segments_delivered());
    }

    fn on_segment_delivered(&self, info: &SegmentInfo) {
        log::info!(
            "{}: {:.2}s, {} bytes, sha256 {}",
            info.file_name(),
            info.duration_secs,
            info.byte_length,
            &info.checksum[..12]
        );
    }

    fn on_transcript(&self, transcript: &SegmentTranscript) {
        log::info!("[{}] {} => {}", transcript.index, transcript.source_text, transcript.translated_text);
    }

    fn on_error(&self, error: &CaptureError) {
        log::error!("{}", error);
    }
}
