use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::CaptureError;
use crate::models::segment::EncodedSegment;
use crate::storage::metadata;
use crate::traits::segment_sink::SegmentSink;

/// Segment sink that stores every container on disk.
///
/// ## Layout
///
/// ```text
/// {directory}/{session_id}/segment_00000.wav
/// {directory}/{session_id}/segment_00000.metadata.json
/// {directory}/{session_id}/segment_00001.wav
/// ...
/// ```
///
/// Files are written to a temporary name and renamed, so a reader never sees
/// a half-written container.
#[derive(Debug, Clone)]
pub struct SegmentFileWriter {
    directory: PathBuf,
    write_metadata: bool,
}

impl SegmentFileWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            write_metadata: true,
        }
    }

    /// Skip the JSON sidecar files.
    pub fn without_metadata(mut self) -> Self {
        self.write_metadata = false;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Where `segment` is (or would be) stored.
    pub fn path_for(&self, segment: &EncodedSegment) -> PathBuf {
        self.directory
            .join(segment.info.session_id.to_string())
            .join(segment.file_name())
    }

    /// Write the container (and sidecar) and return its path.
    pub fn write(&self, segment: &EncodedSegment) -> Result<PathBuf, CaptureError> {
        let path = self.path_for(segment);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;
        }

        let tmp_path = path.with_extension("wav.part");
        fs::write(&tmp_path, segment.container.as_bytes())
            .map_err(|e| CaptureError::StorageError(format!("failed to write segment: {}", e)))?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(CaptureError::StorageError(format!("failed to finalize segment: {}", e)));
        }

        if self.write_metadata {
            metadata::write_metadata(&segment.info, &path)?;
        }

        log::debug!("wrote {} ({} bytes)", path.display(), segment.container.len());
        Ok(path)
    }
}

impl SegmentSink for SegmentFileWriter {
    fn deliver(&self, segment: &EncodedSegment) -> Result<(), CaptureError> {
        self.write(segment).map(|_| ())
    }
}

/// Re-hash a stored segment and compare against its sidecar checksum.
pub fn verify_segment_file(path: &Path) -> Result<bool, CaptureError> {
    let bytes = fs::read(path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read segment: {}", e)))?;
    let info = metadata::read_metadata(path)?;
    let checksum = format!("{:x}", Sha256::digest(&bytes));
    Ok(checksum == info.checksum && bytes.len() == info.byte_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::ContainerFormatParams;
    use crate::models::segment::AudioSegment;
    use crate::processing::encoder::ContainerEncoder;
    use uuid::Uuid;

    fn encoded(index: u64) -> EncodedSegment {
        let audio = AudioSegment::from_chunks([vec![0.5f32, -0.5], vec![1.0]]);
        let container = ContainerEncoder::new(ContainerFormatParams::SPEECH_MONO_16)
            .unwrap()
            .encode(&audio);
        EncodedSegment::new(Uuid::new_v4(), index, &audio, container)
    }

    #[test]
    fn writes_container_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SegmentFileWriter::new(dir.path());
        let segment = encoded(3);

        let path = writer.write(&segment).unwrap();
        assert!(path.ends_with("segment_00003.wav"));
        assert_eq!(fs::read(&path).unwrap(), segment.container.as_bytes());
        assert!(!path.with_extension("wav.part").exists());

        let info = metadata::read_metadata(&path).unwrap();
        assert_eq!(info, segment.info);
        assert!(verify_segment_file(&path).unwrap());
    }

    #[test]
    fn stored_file_opens_with_standard_reader() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SegmentFileWriter::new(dir.path());
        let path = writer.write(&encoded(0)).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 44_100);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![16384, -16384, 32767]);
    }

    #[test]
    fn tampered_file_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SegmentFileWriter::new(dir.path());
        let path = writer.write(&encoded(1)).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        assert!(!verify_segment_file(&path).unwrap());
    }

    #[test]
    fn sink_without_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SegmentFileWriter::new(dir.path()).without_metadata();
        let segment = encoded(2);
        writer.deliver(&segment).unwrap();

        let path = writer.path_for(&segment);
        assert!(path.exists());
        assert!(!metadata::metadata_path(&path).exists());
    }

    #[test]
    fn unwritable_directory_reports_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();

        let writer = SegmentFileWriter::new(&blocker);
        assert!(matches!(writer.write(&encoded(0)), Err(CaptureError::StorageError(_))));
    }

    #[test]
    fn failed_rename_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SegmentFileWriter::new(dir.path());
        let segment = encoded(3);

        // A non-empty directory where the container should land.
        let target = writer.path_for(&segment);
        fs::create_dir_all(target.join("occupied")).unwrap();

        assert!(matches!(writer.write(&segment), Err(CaptureError::StorageError(_))));
        assert!(!target.with_extension("wav.part").exists());
        assert!(target.is_dir());
    }
}
