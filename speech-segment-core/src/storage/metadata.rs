use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::segment::SegmentInfo;

/// Sidecar path for a segment file: `segment_00003.wav` → `segment_00003.metadata.json`.
pub fn metadata_path(segment_path: &Path) -> PathBuf {
    segment_path.with_extension("metadata.json")
}

/// Write segment metadata as a JSON sidecar file next to the segment.
pub fn write_metadata(info: &SegmentInfo, segment_path: &Path) -> Result<(), CaptureError> {
    let json = serde_json::to_string_pretty(info)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(metadata_path(segment_path), json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read segment metadata from a JSON sidecar file.
pub fn read_metadata(segment_path: &Path) -> Result<SegmentInfo, CaptureError> {
    let json = fs::read_to_string(metadata_path(segment_path))
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    let info: SegmentInfo = serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))?;
    Ok(info)
}
