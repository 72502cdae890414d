use crate::models::segment::AudioSegment;

/// Accumulates capture chunks until the next drain.
///
/// Not synchronized on its own. Share it between the capture callback and
/// the drain timer as `Arc<parking_lot::Mutex<FrameBuffer>>`; `drain_and_reset`
/// then runs under a single lock, so a chunk is never split across segments.
///
/// Capacity is retained across drains: the replacement storage is sized like
/// the previous segment, so a steady callback rate appends without growing.
#[derive(Debug)]
pub struct FrameBuffer {
    samples: Vec<f32>,
    chunk_ends: Vec<usize>,
    capacity_hint: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-size for `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            chunk_ends: Vec::new(),
            capacity_hint: capacity,
        }
    }

    /// Append one chunk in arrival order. Values are not range checked.
    pub fn append(&mut self, chunk: &[f32]) {
        if chunk.is_empty() {
            return;
        }
        self.samples.extend_from_slice(chunk);
        self.chunk_ends.push(self.samples.len());
    }

    /// Take the accumulated segment and reset to empty.
    ///
    /// Returns `None` when nothing was appended since the last drain, so the
    /// caller can skip encoding and delivery entirely.
    pub fn drain_and_reset(&mut self) -> Option<AudioSegment> {
        if self.samples.is_empty() {
            return None;
        }

        self.capacity_hint = self.capacity_hint.max(self.samples.len());
        let chunk_hint = self.chunk_ends.len();

        let samples = std::mem::replace(&mut self.samples, Vec::with_capacity(self.capacity_hint));
        let chunk_ends = std::mem::replace(&mut self.chunk_ends, Vec::with_capacity(chunk_hint));
        Some(AudioSegment::from_parts(samples, chunk_ends))
    }

    /// Drop everything accumulated since the last drain.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.chunk_ends.clear();
    }

    /// Samples currently buffered.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
