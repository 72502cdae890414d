use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::format::ContainerFormatParams;
use crate::processing::encoder::EncodedContainer;

/// One bounded accumulation of captured audio between two drains.
///
/// Samples are kept flat in arrival order; `chunk_ends` records where each
/// delivered chunk stopped so the original chunking can be recovered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioSegment {
    samples: Vec<f32>,
    chunk_ends: Vec<usize>,
}

impl AudioSegment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a segment from chunks in recording order.
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[f32]>,
    {
        let mut segment = Self::new();
        for chunk in chunks {
            segment.push_chunk(chunk.as_ref());
        }
        segment
    }

    pub(crate) fn from_parts(samples: Vec<f32>, chunk_ends: Vec<usize>) -> Self {
        Self { samples, chunk_ends }
    }

    pub(crate) fn push_chunk(&mut self, chunk: &[f32]) {
        if chunk.is_empty() {
            return;
        }
        self.samples.extend_from_slice(chunk);
        self.chunk_ends.push(self.samples.len());
    }

    /// All samples, in order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Iterate over the chunks as they were appended.
    pub fn chunks(&self) -> impl Iterator<Item = &[f32]> + '_ {
        let starts = std::iter::once(0).chain(self.chunk_ends.iter().copied());
        starts
            .zip(self.chunk_ends.iter().copied())
            .map(move |(start, end)| &self.samples[start..end])
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_ends.len()
    }

    /// Total sample count (sum of chunk lengths).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Metadata describing one delivered segment.
///
/// Serializable for JSON sidecars and for logging alongside transcripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub id: Uuid,
    pub session_id: Uuid,
    pub index: u64,
    pub captured_at: DateTime<Utc>,
    pub format: ContainerFormatParams,
    pub sample_count: usize,
    pub chunk_count: usize,
    pub duration_secs: f64,
    pub byte_length: usize,
    pub checksum: String,
}

impl SegmentInfo {
    /// Attachment name used when the container is uploaded.
    pub fn file_name(&self) -> String {
        format!("segment_{:05}.wav", self.index)
    }
}

/// An encoded container together with its segment metadata.
///
/// This is what segment sinks receive.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSegment {
    pub info: SegmentInfo,
    pub container: EncodedContainer,
}

impl EncodedSegment {
    /// Describe `container`, which was encoded from `segment`.
    pub fn new(session_id: Uuid, index: u64, segment: &AudioSegment, container: EncodedContainer) -> Self {
        let info = SegmentInfo {
            id: Uuid::new_v4(),
            session_id,
            index,
            captured_at: Utc::now(),
            format: container.format(),
            sample_count: segment.len(),
            chunk_count: segment.chunk_count(),
            duration_secs: container.duration_secs(),
            byte_length: container.len(),
            checksum: container.checksum(),
        };
        Self { info, container }
    }

    pub fn file_name(&self) -> String {
        self.info.file_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_round_trip() {
        let segment = AudioSegment::from_chunks([vec![0.5f32, -0.5], vec![1.0]]);
        assert_eq!(segment.len(), 3);
        assert_eq!(segment.chunk_count(), 2);

        let chunks: Vec<&[f32]> = segment.chunks().collect();
        assert_eq!(chunks, vec![&[0.5f32, -0.5][..], &[1.0f32][..]]);
    }

    #[test]
    fn empty_chunks_are_not_recorded() {
        let segment = AudioSegment::from_chunks([vec![], vec![0.25f32], vec![]]);
        assert_eq!(segment.chunk_count(), 1);
        assert_eq!(segment.samples(), &[0.25]);
    }

    #[test]
    fn out_of_range_samples_are_kept() {
        let segment = AudioSegment::from_chunks([[3.0f32, -7.5]]);
        assert_eq!(segment.samples(), &[3.0, -7.5]);
    }

    #[test]
    fn encoded_segment_metadata() {
        use crate::processing::encoder::ContainerEncoder;

        let segment = AudioSegment::from_chunks([vec![0.1f32; 441], vec![0.2; 441]]);
        let container = ContainerEncoder::new(ContainerFormatParams::SPEECH_MONO_16)
            .unwrap()
            .encode(&segment);
        let session_id = Uuid::new_v4();
        let encoded = EncodedSegment::new(session_id, 7, &segment, container);

        assert_eq!(encoded.info.session_id, session_id);
        assert_eq!(encoded.info.sample_count, 882);
        assert_eq!(encoded.info.chunk_count, 2);
        assert_eq!(encoded.info.byte_length, 44 + 882 * 2);
        assert!((encoded.info.duration_secs - 0.02).abs() < 1e-9);
        assert_eq!(encoded.file_name(), "segment_00007.wav");
        assert_eq!(encoded.info.checksum, encoded.container.checksum());
    }

    #[test]
    fn empty_segment() {
        let segment = AudioSegment::new();
        assert!(segment.is_empty());
        assert_eq!(segment.chunks().count(), 0);
    }
}
