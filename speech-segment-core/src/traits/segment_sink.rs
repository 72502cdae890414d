use crate::models::error::CaptureError;
use crate::models::segment::EncodedSegment;

/// Receives every non-empty segment a recording session produces.
///
/// Called from the drain thread, and once more from the stopping thread for
/// the final flush; never concurrently. An error is reported to the session
/// delegate and does not affect later segments.
pub trait SegmentSink: Send + Sync {
    fn deliver(&self, segment: &EncodedSegment) -> Result<(), CaptureError>;
}

/// Sink that drops segments. Useful when only the delegate events matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SegmentSink for NullSink {
    fn deliver(&self, segment: &EncodedSegment) -> Result<(), CaptureError> {
        log::trace!("discarding segment {}", segment.info.index);
        Ok(())
    }
}
