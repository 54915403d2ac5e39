//! Editor decorations: which visual replaces a typed marker, and where.
//!
//! For every range link in the visible part of a document, the range-start
//! marker (`:` or `#`) and the range separator are overridden with the visuals
//! of the link's pattern. A link the cursor sat in during the previous pass is
//! left raw so it can be edited.

use std::ops::Range;

use crate::config::{LinkGrammar, Settings};
use crate::link_parser::parse;
use crate::resolver::pattern_for;
use crate::vault::{MDRangeLink, Vault};

/// Replace `len` bytes at `offset` with `visual`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterOverride {
    pub offset: usize,
    pub len: usize,
    pub visual: String,
}

impl CharacterOverride {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Byte offsets of the primary selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
}

/// What changed in the editor since the last update.
#[derive(Debug, Clone)]
pub struct ViewUpdate<'a> {
    pub links: &'a [MDRangeLink],
    pub visible_ranges: &'a [Range<usize>],
    pub selection: Selection,
    pub doc_changed: bool,
    pub viewport_changed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DecorationState {
    pub decorations: Vec<CharacterOverride>,
    decorated_ranges: Vec<Range<usize>>,
    last_location: Selection,
}

impl DecorationState {
    /// Rebuilds decorations when the document or viewport changed, or the selection
    /// moved. Returns whether a rebuild happened.
    pub fn update(&mut self, update: &ViewUpdate, vault: &Vault, settings: &Settings) -> bool {
        let current = update.selection;
        let moved = current != self.last_location;
        self.last_location = current;

        if !(update.doc_changed || update.viewport_changed || moved) {
            return false;
        }

        let (decorations, decorated_ranges) = build_decorations(
            update.links,
            update.visible_ranges,
            vault,
            settings,
            Some(current.from),
            &self.decorated_ranges,
        );
        self.decorations = decorations;
        self.decorated_ranges = decorated_ranges;
        true
    }
}

/// Overrides for the links intersecting `visible_ranges`.
///
/// Returns the overrides and the spans of every range link seen, which the next
/// pass takes as `last_pass`.
pub fn build_decorations(
    links: &[MDRangeLink],
    visible_ranges: &[Range<usize>],
    vault: &Vault,
    settings: &Settings,
    cursor: Option<usize>,
    last_pass: &[Range<usize>],
) -> (Vec<CharacterOverride>, Vec<Range<usize>>) {
    let markers = settings.markers();
    let mut decorations = Vec::new();
    let mut decorated_ranges = Vec::new();

    let visible = |span: &Range<usize>| {
        visible_ranges
            .iter()
            .any(|range| span.start < range.end && range.start < span.end)
    };
    let in_last_pass = |span: &Range<usize>| {
        cursor.is_some_and(|cursor| {
            last_pass
                .iter()
                .any(|range| range.start == span.start && range.contains(&cursor))
        })
    };

    for link in links {
        let span = link_span(link);
        if !visible(&span) {
            continue;
        }

        let target = link.target();
        let Some(reference) = parse(target, settings) else {
            continue;
        };
        let Some(marker_index) = marker_index(target, settings) else {
            continue;
        };

        if !in_last_pass(&span) {
            let file = vault.select_file_for_note(&reference.note_name);
            let pattern = pattern_for(&reference, file, vault, settings);

            if !pattern.range_start_visual.is_empty() {
                decorations.push(CharacterOverride {
                    offset: link.raw_offset + marker_index,
                    len: markers.range_start.len(),
                    visual: pattern.range_start_visual.clone(),
                });
            }

            let separator = markers.range_separator;
            if !pattern.range_separator_visual.is_empty() && !separator.is_empty() {
                let keys_start = marker_index + markers.range_start.len();
                if let Some(separator_index) = target[keys_start..].find(separator) {
                    decorations.push(CharacterOverride {
                        offset: link.raw_offset + keys_start + separator_index,
                        len: separator.len(),
                        visual: pattern.range_separator_visual.clone(),
                    });
                }
            }
        }

        decorated_ranges.push(span);
    }

    (decorations, decorated_ranges)
}

/// Byte span of the link in its document, brackets included.
fn link_span(link: &MDRangeLink) -> Range<usize> {
    let start = link.raw_offset.saturating_sub(2);
    start..link.raw_offset + link.raw.len() + 2
}

/// Byte index of the range-start marker in a link target, as the parser splits it.
fn marker_index(target: &str, settings: &Settings) -> Option<usize> {
    match settings.grammar {
        LinkGrammar::Lines | LinkGrammar::Verses => target.rfind(':'),
        LinkGrammar::Headings => target.find('#'),
    }
}
