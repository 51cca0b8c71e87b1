use std::fmt;

use anyhow::{bail, Result};
use unicode_segmentation::UnicodeSegmentation;

/// The character drawn in one cell: exactly one printable grapheme cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph(GlyphRepr);

#[derive(Debug, Clone, PartialEq, Eq)]
enum GlyphRepr {
    Char(char),
    Cluster(Box<str>),
}

impl Glyph {
    pub fn parse(value: &str) -> Result<Self> {
        let mut graphemes = value.graphemes(true);
        let (Some(first), None) = (graphemes.next(), graphemes.next()) else {
            bail!("cell character must be exactly one grapheme, got {value:?}");
        };
        if first.chars().any(char::is_control) {
            bail!("cell character must be printable, got {value:?}");
        }

        let mut chars = first.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(Self(GlyphRepr::Char(ch))),
            _ => Ok(Self(GlyphRepr::Cluster(first.into()))),
        }
    }

    pub fn push_to(&self, out: &mut String) {
        match &self.0 {
            GlyphRepr::Char(ch) => out.push(*ch),
            GlyphRepr::Cluster(cluster) => out.push_str(cluster),
        }
    }

    /// Upper bound of the UTF-8 bytes this glyph adds to a surface.
    pub fn byte_len(&self) -> usize {
        match &self.0 {
            GlyphRepr::Char(ch) => ch.len_utf8(),
            GlyphRepr::Cluster(cluster) => cluster.len(),
        }
    }
}

impl From<char> for Glyph {
    fn from(ch: char) -> Self {
        Self(GlyphRepr::Char(ch))
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            GlyphRepr::Char(ch) => write!(f, "{ch}"),
            GlyphRepr::Cluster(cluster) => f.write_str(cluster),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub character: Glyph,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Cell {
    pub fn new(character: impl Into<Glyph>, r: u8, g: u8, b: u8) -> Self {
        Self {
            character: character.into(),
            r,
            g,
            b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameContent {
    PlainText(String),
    ColoredGrid(Vec<Vec<Cell>>),
}

/// One sampled instant of the source video.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiFrame {
    pub index: u64,
    /// Seconds from the start of the source.
    pub timestamp: f64,
    pub content: FrameContent,
}

impl AsciiFrame {
    pub fn plain(index: u64, timestamp: f64, text: impl Into<String>) -> Self {
        Self {
            index,
            timestamp,
            content: FrameContent::PlainText(text.into()),
        }
    }

    pub fn colored(index: u64, timestamp: f64, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            index,
            timestamp,
            content: FrameContent::ColoredGrid(rows),
        }
    }

    pub fn is_colored(&self) -> bool {
        matches!(self.content, FrameContent::ColoredGrid(_))
    }

    pub fn cell_count(&self) -> usize {
        match &self.content {
            FrameContent::PlainText(_) => 0,
            FrameContent::ColoredGrid(rows) => rows.iter().map(Vec::len).sum(),
        }
    }
}
