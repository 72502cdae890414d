use crate::models::error::CaptureError;
use crate::models::segment::SegmentInfo;
use crate::models::state::SessionState;
use crate::models::transcript::SegmentTranscript;

/// Observer for recording session and pipeline events.
///
/// Methods are called from the drain thread or the thread stopping the
/// session, never the capture callback. Implementations should marshal to a
/// UI thread themselves if needed. All methods default to no-ops.
pub trait SessionDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, _state: &SessionState) {}

    /// Called after a segment was handed to the sink successfully.
    fn on_segment_delivered(&self, _info: &SegmentInfo) {}

    /// Called when a segment finished transcription and translation.
    fn on_transcript(&self, _transcript: &SegmentTranscript) {}

    /// Called when capture, delivery or a remote service fails.
    fn on_error(&self, _error: &CaptureError) {}
}
