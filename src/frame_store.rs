use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::ascii_frame::AsciiFrame;
use crate::error::ConfigurationError;
use crate::schema::{VideoAsciiResponse, VideoMetadata};

/// Immutable, ordered frames plus the metadata they were sampled with.
///
/// Cloning is cheap: the frames live behind an `Arc` and are shared
/// read-only between the controller and whoever renders them.
#[derive(Debug, Clone)]
pub struct FrameStore {
    frames: Arc<[AsciiFrame]>,
    metadata: VideoMetadata,
}

impl FrameStore {
    pub fn new(frames: Vec<AsciiFrame>, metadata: VideoMetadata) -> Self {
        Self {
            frames: frames.into(),
            metadata,
        }
    }

    pub fn frames(&self) -> &[AsciiFrame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&AsciiFrame> {
        self.frames.get(index)
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_colored(&self) -> bool {
        self.frames.first().is_some_and(AsciiFrame::is_colored)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let fps = self.metadata.sampled_fps;
        if !fps.is_finite() || fps <= 0.0 || Duration::try_from_secs_f64(1.0 / fps).is_err() {
            return Err(ConfigurationError::InvalidSampledFps(fps));
        }

        if self.metadata.frame_count != self.frames.len() {
            return Err(ConfigurationError::FrameCountMismatch {
                declared: self.metadata.frame_count,
                actual: self.frames.len(),
            });
        }

        if self.frames.is_empty() {
            return Err(ConfigurationError::EmptyStore);
        }

        for (position, pair) in self.frames.windows(2).enumerate() {
            if pair[1].index <= pair[0].index {
                return Err(ConfigurationError::NonMonotonicIndex {
                    position: position + 1,
                    index: pair[1].index,
                    previous: pair[0].index,
                });
            }
        }

        Ok(())
    }
}

/// Reads a conversion-service response from disk. Shape errors fail here;
/// metadata consistency is checked when the store is loaded for playback.
pub fn load_frame_store(path: &Path) -> Result<FrameStore> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read frames {}", path.display()))?;
    let response: VideoAsciiResponse = serde_json::from_str(&contents).map_err(|error| {
        anyhow!(
            "failed to parse json in {} at line {}, column {}: {}",
            path.display(),
            error.line(),
            error.column(),
            error
        )
    })?;

    let store = response
        .into_frame_store()
        .with_context(|| format!("failed to decode frames in {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        frames = store.len(),
        colored = store.is_colored(),
        "read frame store"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::{load_frame_store, FrameStore};
    use crate::ascii_frame::AsciiFrame;
    use crate::error::ConfigurationError;
    use crate::schema::VideoMetadata;
    use tempfile::tempdir;

    fn metadata(frame_count: usize, sampled_fps: f64) -> VideoMetadata {
        VideoMetadata {
            original_size_bytes: 0,
            duration_seconds: frame_count as f64 / sampled_fps,
            original_fps: 30.0,
            sampled_fps,
            frame_count,
            width: 1,
            height: 1,
        }
    }

    fn frames(count: u64) -> Vec<AsciiFrame> {
        (0..count)
            .map(|i| AsciiFrame::plain(i, i as f64 / 10.0, "#"))
            .collect()
    }

    #[test]
    fn validate_accepts_consistent_store() {
        assert_eq!(FrameStore::new(frames(3), metadata(3, 10.0)).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_fps() {
        for fps in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-20] {
            let store = FrameStore::new(frames(1), metadata(1, fps));
            assert!(matches!(
                store.validate(),
                Err(ConfigurationError::InvalidSampledFps(_))
            ));
        }
    }

    #[test]
    fn validate_rejects_count_mismatch_and_empty() {
        let store = FrameStore::new(frames(4), metadata(5, 10.0));
        assert_eq!(
            store.validate(),
            Err(ConfigurationError::FrameCountMismatch {
                declared: 5,
                actual: 4
            })
        );
        let empty = FrameStore::new(Vec::new(), metadata(0, 10.0));
        assert_eq!(empty.validate(), Err(ConfigurationError::EmptyStore));
    }

    #[test]
    fn validate_rejects_repeated_indices() {
        let mut frames = frames(3);
        frames[2].index = 1;
        let store = FrameStore::new(frames, metadata(3, 10.0));
        assert_eq!(
            store.validate(),
            Err(ConfigurationError::NonMonotonicIndex {
                position: 2,
                index: 1,
                previous: 1
            })
        );
    }

    #[test]
    fn load_reports_json_location() {
        let dir = tempdir().expect("tempdir should create");
        let path = dir.path().join("frames.json");
        std::fs::write(&path, "{\n  \"frames\": [\n    oops\n").expect("write");
        let error = load_frame_store(&path).unwrap_err().to_string();
        assert!(error.contains("line 3"), "{error}");
    }

    #[test]
    fn load_reads_valid_file() {
        let dir = tempdir().expect("tempdir should create");
        let path = dir.path().join("frames.json");
        std::fs::write(
            &path,
            r#"{"frames":[{"index":0,"timestamp":0.0,"ascii":"ab"}],
                "metadata":{"sampledFps":10,"frameCount":1,"width":2,"height":1}}"#,
        )
        .expect("write");
        let store = load_frame_store(&path).expect("store should load");
        assert_eq!(store.len(), 1);
        assert!(!store.is_colored());
        assert_eq!(store.validate(), Ok(()));
    }
}
