//! Wire shape of the conversion service's video response.
//!
//! Field names match the service JSON (`originalSize`, `sampledFps`,
//! `lines[][].char`, ...). Decoding checks shape only; consistency between
//! metadata and frames is the controller's job at load time.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ascii_frame::{AsciiFrame, Cell, Glyph};
use crate::frame_store::FrameStore;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoAsciiResponse {
    pub frames: Vec<WireFrame>,
    pub metadata: VideoMetadata,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireFrame {
    pub index: u64,
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascii: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<Vec<WireCell>>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireCell {
    #[serde(rename = "char")]
    pub character: String,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    #[serde(rename = "originalSize", alias = "originalSizeBytes", default)]
    pub original_size_bytes: u64,
    #[serde(rename = "duration", alias = "durationSeconds", default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub original_fps: f64,
    pub sampled_fps: f64,
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
}

impl VideoMetadata {
    /// Minimum time between two frame advances. Saturates at `Duration::MAX`
    /// for rates that `FrameStore::validate` rejects.
    pub fn frame_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.sampled_fps).unwrap_or(Duration::MAX)
    }

    pub fn summary(&self) -> String {
        format!(
            "Duration: {:.1}s  Frames: {} @ {} FPS  Dimensions: {}x{}",
            self.duration_seconds, self.frame_count, self.sampled_fps, self.width, self.height
        )
    }
}

impl WireFrame {
    pub fn into_frame(self) -> Result<AsciiFrame> {
        match (self.ascii, self.lines) {
            (Some(text), None) => Ok(AsciiFrame::plain(self.index, self.timestamp, text)),
            (None, Some(lines)) => {
                let rows = lines
                    .into_iter()
                    .enumerate()
                    .map(|(row, line)| {
                        line.into_iter()
                            .enumerate()
                            .map(|(col, cell)| {
                                cell.into_cell()
                                    .with_context(|| format!("row {row}, column {col}"))
                            })
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(AsciiFrame::colored(self.index, self.timestamp, rows))
            }
            (Some(_), Some(_)) => bail!("frame carries both 'ascii' and 'lines'"),
            (None, None) => bail!("frame carries neither 'ascii' nor 'lines'"),
        }
    }
}

impl WireCell {
    fn into_cell(self) -> Result<Cell> {
        Ok(Cell {
            character: Glyph::parse(&self.character)?,
            r: self.r,
            g: self.g,
            b: self.b,
        })
    }
}

impl VideoAsciiResponse {
    pub fn into_frame_store(self) -> Result<FrameStore> {
        let frames = self
            .frames
            .into_iter()
            .enumerate()
            .map(|(position, frame)| {
                let index = frame.index;
                frame
                    .into_frame()
                    .with_context(|| format!("invalid frame {index} at position {position}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FrameStore::new(frames, self.metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::VideoAsciiResponse;
    use crate::ascii_frame::FrameContent;

    #[test]
    fn decodes_service_json_for_both_modes() {
        let json = r#"{
            "frames": [
                { "index": 0, "timestamp": 0.0, "ascii": " .:\n-=+" },
                { "index": 1, "timestamp": 0.1, "lines": [[{ "char": "@", "r": 255, "g": 0, "b": 0 }]] }
            ],
            "metadata": {
                "originalSize": 2048, "duration": 0.2, "originalFps": 29.97,
                "sampledFps": 10, "frameCount": 2, "width": 3, "height": 2
            }
        }"#;
        let response: VideoAsciiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.metadata.original_size_bytes, 2048);
        assert_eq!(response.metadata.sampled_fps, 10.0);

        let store = response.into_frame_store().unwrap();
        assert_eq!(store.len(), 2);
        assert!(matches!(store.frames()[0].content, FrameContent::PlainText(_)));
        assert_eq!(store.frames()[1].cell_count(), 1);
    }

    #[test]
    fn metadata_summary_matches_player_panel() {
        let json = r#"{ "duration": 12.34, "sampledFps": 10, "frameCount": 123, "width": 80, "height": 40 }"#;
        let metadata: super::VideoMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(
            metadata.summary(),
            "Duration: 12.3s  Frames: 123 @ 10 FPS  Dimensions: 80x40"
        );
        assert_eq!(metadata.frame_interval().as_millis(), 100);
    }

    #[test]
    fn frame_interval_saturates_instead_of_overflowing() {
        let json = r#"{ "sampledFps": 1e-20, "frameCount": 1, "width": 1, "height": 1 }"#;
        let metadata: super::VideoMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.frame_interval(), std::time::Duration::MAX);
    }

    #[test]
    fn accepts_spelled_out_metadata_aliases() {
        let json = r#"{
            "frames": [],
            "metadata": { "originalSizeBytes": 1, "durationSeconds": 2.5,
                          "sampledFps": 12, "frameCount": 0, "width": 1, "height": 1 }
        }"#;
        let response: VideoAsciiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.metadata.duration_seconds, 2.5);
        assert_eq!(response.metadata.original_fps, 0.0);
    }

    #[test]
    fn rejects_frames_with_ambiguous_content() {
        let json = r#"{
            "frames": [{ "index": 0, "timestamp": 0.0, "ascii": "x", "lines": [] }],
            "metadata": { "sampledFps": 10, "frameCount": 1, "width": 1, "height": 1 }
        }"#;
        let response: VideoAsciiResponse = serde_json::from_str(json).unwrap();
        let error = response.into_frame_store().unwrap_err();
        assert!(format!("{error:#}").contains("both 'ascii' and 'lines'"));
    }

    #[test]
    fn rejects_out_of_range_channels_at_decode() {
        let json = r#"{
            "frames": [{ "index": 0, "timestamp": 0.0, "lines": [[{ "char": "x", "r": 256, "g": 0, "b": 0 }]] }],
            "metadata": { "sampledFps": 10, "frameCount": 1, "width": 1, "height": 1 }
        }"#;
        assert!(serde_json::from_str::<VideoAsciiResponse>(json).is_err());
    }

    #[test]
    fn reports_cell_position_for_bad_glyphs() {
        let json = r#"{
            "frames": [{ "index": 4, "timestamp": 0.0, "lines": [[{ "char": "x", "r": 0, "g": 0, "b": 0 }, { "char": "xy", "r": 0, "g": 0, "b": 0 }]] }],
            "metadata": { "sampledFps": 10, "frameCount": 1, "width": 2, "height": 1 }
        }"#;
        let response: VideoAsciiResponse = serde_json::from_str(json).unwrap();
        let message = format!("{:#}", response.into_frame_store().unwrap_err());
        assert!(message.contains("invalid frame 4 at position 0"), "{message}");
        assert!(message.contains("row 0, column 1"), "{message}");
    }
}
