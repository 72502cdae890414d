use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recognized and translated text for one delivered segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTranscript {
    pub segment_id: Uuid,
    pub index: u64,
    pub source_text: String,
    pub translated_text: String,
    pub completed_at: DateTime<Utc>,
}

/// Running transcript of a session, in segment order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLog {
    entries: Vec<SegmentTranscript>,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping entries ordered by segment index.
    pub fn push(&mut self, entry: SegmentTranscript) {
        let pos = self.entries.partition_point(|e| e.index <= entry.index);
        self.entries.insert(pos, entry);
    }

    pub fn entries(&self) -> &[SegmentTranscript] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All recognized text joined with single spaces.
    pub fn source_text(&self) -> String {
        join_text(self.entries.iter().map(|e| e.source_text.as_str()))
    }

    /// All translations joined with single spaces.
    pub fn translated_text(&self) -> String {
        join_text(self.entries.iter().map(|e| e.translated_text.as_str()))
    }
}

fn join_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
