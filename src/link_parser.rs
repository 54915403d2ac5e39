//! Range link syntax.
//!
//! A raw reference is the text between `[[` and `]]`:
//!
//! | Grammar    | Syntax                              | Example               |
//! |------------|-------------------------------------|-----------------------|
//! | `Lines`    | `<note>:<start>[<sep><end>][\|alt]` | `My Note:10..25`      |
//! | `Headings` | `<note>#<h1>[<sep><h2>][\|alt]`     | `Note#Intro..Summary` |
//! | `Verses`   | `<book> <ch>:<v1>[-<v2>][\|alt]`    | `1 Peter 1:3-5`       |
//!
//! Only the grammar selected in [`Settings::grammar`] is tried. Anything that does
//! not parse is an ordinary link: [`parse`] returns `None` and the caller keeps
//! its default behaviour.

use tracing::debug;

use crate::config::{LinkGrammar, Settings};
use crate::vault::base_name;
use crate::verse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredReference {
    /// The note as it will be looked up in the vault, possibly a partial path
    pub note_name: String,
    /// How the note is named in display text
    pub display_name: String,
    /// A 1-based line number or a heading title, depending on the grammar
    pub range_start_key: String,
    pub range_end_key: Option<String>,
    pub explicit_alt_text: Option<String>,
}

impl StructuredReference {
    pub fn is_range(&self) -> bool {
        self.range_end_key.is_some()
    }
}

/// Splits `raw` at the first `|` that is not escaped as `\|`.
///
/// Returns the target and the alt text, with `\|` unescaped. An empty alt text is `None`.
pub fn split_alt_text(raw: &str) -> (&str, Option<String>) {
    let mut previous = None;
    let pipe = raw.char_indices().find_map(|(index, c)| {
        let found = (c == '|' && previous != Some('\\')).then_some(index);
        previous = Some(c);
        found
    });

    match pipe {
        Some(index) => {
            let alt = raw[index + 1..].replace("\\|", "|");
            (&raw[..index], Some(alt).filter(|alt| !alt.trim().is_empty()))
        }
        None => (raw, None),
    }
}

pub fn parse(raw: &str, settings: &Settings) -> Option<StructuredReference> {
    let (target, explicit_alt_text) = split_alt_text(raw);

    let parsed = match settings.grammar {
        LinkGrammar::Lines => parse_lines(target, settings),
        LinkGrammar::Headings => parse_headings(target, settings),
        LinkGrammar::Verses => verse::parse_citation(target, settings),
    };

    match parsed {
        Some(reference) => Some(StructuredReference {
            explicit_alt_text,
            ..reference
        }),
        None => {
            debug!(raw, grammar = ?settings.grammar, "not a range link");
            None
        }
    }
}

fn parse_lines(target: &str, settings: &Settings) -> Option<StructuredReference> {
    let (note, keys) = target.rsplit_once(':')?;
    let (start, end) = split_keys(keys, &settings.range_separator);

    let start = line_key(start)?;
    let end = match end {
        Some(end) => Some(line_key(end)?),
        None => None,
    };

    reference(note, start, end)
}

fn parse_headings(target: &str, settings: &Settings) -> Option<StructuredReference> {
    let (note, keys) = target.split_once('#')?;
    let (start, end) = split_keys(keys, &settings.range_separator);

    let start = start.trim();
    let end = match end.map(str::trim) {
        Some("") => return None,
        end => end,
    };

    reference(note, start, end)
}

fn split_keys<'a>(keys: &'a str, separator: &str) -> (&'a str, Option<&'a str>) {
    if separator.is_empty() {
        return (keys, None);
    }
    match keys.split_once(separator) {
        Some((start, end)) => (start, Some(end)),
        None => (keys, None),
    }
}

/// A 1-based decimal line number.
fn line_key(key: &str) -> Option<&str> {
    let key = key.trim();
    let all_digits = !key.is_empty() && key.chars().all(|c| c.is_ascii_digit());
    match key.parse::<usize>() {
        Ok(line) if all_digits && line >= 1 => Some(key),
        _ => None,
    }
}

fn reference(note: &str, start: &str, end: Option<&str>) -> Option<StructuredReference> {
    let note = note.trim();
    if note.is_empty() || start.is_empty() {
        return None;
    }

    Some(StructuredReference {
        note_name: note.to_string(),
        display_name: base_name(note).to_string(),
        range_start_key: start.to_string(),
        range_end_key: end.map(String::from),
        explicit_alt_text: None,
    })
}
