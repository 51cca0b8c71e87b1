use std::borrow::Cow;
use std::fmt::Write;

use crate::ascii_frame::{AsciiFrame, Cell, FrameContent};

/// Longest truecolor foreground sequence: `ESC[38;2;255;255;255m`.
const MAX_COLOR_SEQUENCE_LEN: usize = 19;
const RESET_SEQUENCE: &str = "\x1b[0m";
pub const ROW_BREAK: char = '\n';

/// Maps one frame to the text written to a terminal surface.
///
/// Stateless: the output depends only on the frame and the colour flag. The
/// whole frame is built into a single pre-sized buffer so a host can hand it
/// to the terminal in one write.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiRenderer;

impl AsciiRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render<'a>(&self, frame: &'a AsciiFrame, color_mode: bool) -> Cow<'a, str> {
        match &frame.content {
            FrameContent::PlainText(text) => Cow::Borrowed(text.as_str()),
            FrameContent::ColoredGrid(rows) if color_mode => Cow::Owned(render_colored(rows)),
            FrameContent::ColoredGrid(rows) => Cow::Owned(render_glyphs(rows)),
        }
    }
}

fn render_colored(rows: &[Vec<Cell>]) -> String {
    let capacity = rows
        .iter()
        .flatten()
        .map(|cell| MAX_COLOR_SEQUENCE_LEN + cell.character.byte_len())
        .sum::<usize>()
        + rows.len()
        + RESET_SEQUENCE.len();
    let mut out = String::with_capacity(capacity);

    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            out.push(ROW_BREAK);
        }
        for cell in row {
            push_foreground(&mut out, cell);
            cell.character.push_to(&mut out);
        }
    }

    if !rows.is_empty() {
        out.push_str(RESET_SEQUENCE);
    }
    out
}

fn render_glyphs(rows: &[Vec<Cell>]) -> String {
    let capacity = rows
        .iter()
        .flatten()
        .map(|cell| cell.character.byte_len())
        .sum::<usize>()
        + rows.len();
    let mut out = String::with_capacity(capacity);

    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            out.push(ROW_BREAK);
        }
        for cell in row {
            cell.character.push_to(&mut out);
        }
    }
    out
}

// Written directly rather than through crossterm's `Colored`, which drops
// colour when NO_COLOR is set; colour mode is decided by the caller.
fn push_foreground(out: &mut String, cell: &Cell) {
    // fmt::Write for String is infallible.
    let _ = write!(out, "\x1b[38;2;{};{};{}m", cell.r, cell.g, cell.b);
}
