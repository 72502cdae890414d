use std::sync::Arc;

use crate::models::error::CaptureError;

/// Callback invoked with each captured chunk of mono f32 samples.
///
/// Fires on the capture driver's own thread at its own cadence. It must
/// return quickly: the session only appends the chunk to the frame buffer.
pub type ChunkCallback = Arc<dyn Fn(&[f32]) + Send + Sync + 'static>;

/// A microphone (or any other producer) delivering normalized mono samples
/// at the session's configured sample rate.
pub trait CaptureSource: Send {
    /// Whether the device can be opened right now.
    fn is_available(&self) -> bool;

    /// Start delivering chunks to `callback`.
    ///
    /// Returns `CaptureError::PermissionDenied` when the user refused
    /// microphone access.
    fn start(&mut self, callback: ChunkCallback) -> Result<(), CaptureError>;

    /// Stop delivering chunks. No callback may fire after this returns.
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Human-readable device name for logs.
    fn device_name(&self) -> String;
}
