//! Core types for vault data structures.
//!
//! This module contains fundamental types used throughout the vault system:
//! - `HeadingLevel`: Represents the level of a Markdown heading (1-6)
//! - `MyRange`: A wrapper around LSP Range with additional utilities
//! - `MDHeading`, `MDCodeBlock`, `MDRangeLink`: the per-file index entries

use std::ops::{Deref, Range};

use ropey::Rope;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Position;

/// Represents a Markdown heading level (1-6).
#[derive(Eq, PartialEq, Debug, PartialOrd, Ord, Clone, Hash)]
pub struct HeadingLevel(pub usize);

impl Default for HeadingLevel {
    fn default() -> Self {
        HeadingLevel(1)
    }
}

/// A wrapper around `tower_lsp::lsp_types::Range` with additional utilities.
///
/// Provides conversion from byte offsets to LSP positions using rope-based
/// character counting.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct MyRange(pub tower_lsp::lsp_types::Range);

impl MyRange {
    /// Creates a `MyRange` from a byte offset range using rope for position calculation.
    pub fn from_range(rope: &Rope, range: Range<usize>) -> MyRange {
        // convert from byte offset to char offset
        let char_start = rope.byte_to_char(range.start);
        let char_end = rope.byte_to_char(range.end);

        let start_line = rope.char_to_line(char_start);
        let start_offset = char_start - rope.line_to_char(start_line);

        let end_line = rope.char_to_line(char_end);
        let end_offset = char_end - rope.line_to_char(end_line);

        tower_lsp::lsp_types::Range {
            start: Position {
                line: start_line as u32,
                character: start_offset as u32,
            },
            end: Position {
                line: end_line as u32,
                character: end_offset as u32,
            },
        }
        .into()
    }

    pub fn start_line(&self) -> usize {
        self.0.start.line as usize
    }

    pub fn end_line(&self) -> usize {
        self.0.end.line as usize
    }
}

impl std::hash::Hash for MyRange {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.start.line.hash(state);
        self.0.start.character.hash(state);
        self.0.end.line.hash(state);
        self.0.end.character.hash(state);
    }
}

impl Deref for MyRange {
    type Target = tower_lsp::lsp_types::Range;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<tower_lsp::lsp_types::Range> for MyRange {
    fn from(range: tower_lsp::lsp_types::Range) -> Self {
        MyRange(range)
    }
}

/// A parsed Markdown heading with text, position range, and heading level.
///
/// `range` spans the heading line itself; its start and end lines are the
/// heading's line offsets in the heading index.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct MDHeading {
    pub heading_text: String,
    pub range: MyRange,
    pub level: HeadingLevel,
}

impl std::hash::Hash for MDHeading {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.level.hash(state);
        self.heading_text.hash(state)
    }
}

/// A fenced code block. Headings and links inside it are not indexed.
#[derive(Debug, Default, PartialEq, Eq, Clone, Hash)]
pub struct MDCodeBlock {
    pub range: MyRange,
}

/// A `[[target]]` or `![[target]]` occurrence in a file.
#[derive(Debug, Default, PartialEq, Eq, Clone, Hash)]
pub struct MDRangeLink {
    /// Everything between the brackets, alt text included
    pub raw: String,
    /// Byte offset of `raw` in the file
    pub raw_offset: usize,
    pub is_embed: bool,
    /// Span of the whole link, brackets included
    pub range: MyRange,
}

impl MDRangeLink {
    /// The target part of `raw`, without any `|alt` suffix.
    pub fn target(&self) -> &str {
        crate::link_parser::split_alt_text(&self.raw).0
    }
}

/// Trait for types that have a range (position span in the document).
pub trait Rangeable {
    fn range(&self) -> &MyRange;
    fn includes(&self, other: &impl Rangeable) -> bool {
        let self_range = self.range();
        let other_range = other.range();

        (self_range.start.line < other_range.start.line
            || (self_range.start.line == other_range.start.line
                && self_range.start.character <= other_range.start.character))
            && (self_range.end.line > other_range.end.line
                || (self_range.end.line == other_range.end.line
                    && self_range.end.character >= other_range.end.character))
    }

    fn includes_position(&self, position: Position) -> bool {
        let range = self.range();
        (range.start.line < position.line
            || (range.start.line == position.line && range.start.character <= position.character))
            && (range.end.line > position.line
                || (range.end.line == position.line && range.end.character >= position.character))
    }
}

impl Rangeable for MDHeading {
    fn range(&self) -> &MyRange {
        &self.range
    }
}

impl Rangeable for MDCodeBlock {
    fn range(&self) -> &MyRange {
        &self.range
    }
}

impl Rangeable for MDRangeLink {
    fn range(&self) -> &MyRange {
        &self.range
    }
}
