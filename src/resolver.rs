//! Resolution of parsed range links against the vault.
//!
//! Resolution maps the note name to a file and the range keys to 0-based line
//! offsets. It never fails loudly: an unknown note or start key is `None`, and an
//! unknown end key degrades the range to a single point.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{LinkGrammar, Settings, VisualPattern};
use crate::display::format_display_text;
use crate::link_parser::StructuredReference;
use crate::pattern::resolve_pattern;
use crate::vault::Vault;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub file: PathBuf,
    /// 0-based, inclusive
    pub start_line: usize,
    /// 0-based, inclusive. `None` is a single line or heading.
    pub end_line: Option<usize>,
    pub alt_text: String,
    pub reference: StructuredReference,
}

impl ResolvedReference {
    pub fn is_range(&self) -> bool {
        self.end_line.is_some()
    }
}

pub fn resolve(
    reference: &StructuredReference,
    vault: &Vault,
    settings: &Settings,
) -> Option<ResolvedReference> {
    let Some(file) = vault.select_file_for_note(&reference.note_name) else {
        debug!(note = %reference.note_name, "no file for range link");
        return None;
    };

    let (start_line, end_line) = match settings.grammar {
        LinkGrammar::Lines | LinkGrammar::Verses => resolve_lines(reference, settings)?,
        LinkGrammar::Headings => resolve_headings(reference, vault, file, settings)?,
    };

    let alt_text = match &reference.explicit_alt_text {
        Some(alt) => alt.clone(),
        None => display_text(reference, Some(file), vault, settings),
    };

    Some(ResolvedReference {
        file: file.to_path_buf(),
        start_line,
        end_line,
        alt_text,
        reference: reference.clone(),
    })
}

/// Computed display text. Needs only the pattern, so it works before the file is
/// known; `file` refines the pattern lookup for the heading grammar.
pub fn display_text(
    reference: &StructuredReference,
    file: Option<&Path>,
    vault: &Vault,
    settings: &Settings,
) -> String {
    format_display_text(
        &reference.display_name,
        &reference.range_start_key,
        reference.range_end_key.as_deref(),
        pattern_for(reference, file, vault, settings),
        settings.markers(),
    )
}

/// The visual pattern of a reference. The heading grammar matches patterns against
/// the resolved vault path when there is one; the other grammars use the note name
/// as typed.
pub fn pattern_for<'a>(
    reference: &StructuredReference,
    file: Option<&Path>,
    vault: &Vault,
    settings: &'a Settings,
) -> &'a VisualPattern {
    let target = match (settings.grammar, file.and_then(|file| vault.vault_path(file))) {
        (LinkGrammar::Headings, Some(vault_path)) => vault_path,
        _ => reference.note_name.clone(),
    };
    resolve_pattern(&target, settings)
}

/// 1-based line keys to 0-based offsets.
///
/// An exclusive end drops one more line: `Note:10..25` covers lines 10 to 24.
fn resolve_lines(
    reference: &StructuredReference,
    settings: &Settings,
) -> Option<(usize, Option<usize>)> {
    let to_offset = |key: &str| key.trim().parse::<usize>().ok()?.checked_sub(1);

    let start_line = to_offset(&reference.range_start_key)?;
    let end_line = match &reference.range_end_key {
        Some(key) => {
            let end = to_offset(key)?;
            Some(exclusive_end(end, settings))
        }
        None => None,
    };

    Some((start_line, end_line))
}

fn resolve_headings(
    reference: &StructuredReference,
    vault: &Vault,
    file: &Path,
    settings: &Settings,
) -> Option<(usize, Option<usize>)> {
    let headings = vault.select_headings(file)?;
    let find = |key: &str| {
        headings
            .iter()
            .position(|heading| heading.heading_text == key)
    };

    let Some(start_index) = find(&reference.range_start_key) else {
        debug!(
            heading = %reference.range_start_key,
            file = %file.display(),
            "start heading not found"
        );
        return None;
    };
    let start_line = headings[start_index].range.start_line();

    let end_line = reference.range_end_key.as_deref().and_then(|key| {
        let Some(end_index) = find(key) else {
            debug!(heading = key, "end heading not found, using a single heading");
            return None;
        };

        if settings.end_inclusive {
            // through the end heading's own section
            match headings.get(end_index + 1) {
                Some(next) => Some(next.range.start_line().saturating_sub(1)),
                None => Some(
                    vault
                        .select_line_count(file)
                        .unwrap_or(1)
                        .saturating_sub(1),
                ),
            }
        } else {
            Some(exclusive_end(headings[end_index].range.end_line(), settings))
        }
    });

    Some((start_line, end_line))
}

fn exclusive_end(end: usize, settings: &Settings) -> usize {
    match settings.end_inclusive {
        true => end,
        false => end.saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link_parser::parse;
    use crate::test_utils::{memory_vault, numbered_lines, SECTIONED_NOTE};

    fn resolve_raw(raw: &str, vault: &Vault, settings: &Settings) -> Option<ResolvedReference> {
        resolve(&parse(raw, settings)?, vault, settings)
    }

    fn headings(end_inclusive: bool) -> Settings {
        Settings {
            grammar: LinkGrammar::Headings,
            end_inclusive,
            ..Settings::default()
        }
    }

    #[test]
    fn line_range_is_zero_based() {
        let text = numbered_lines(30);
        let vault = memory_vault(&[("My Note.md", text.as_str())]);

        let resolved = resolve_raw("My Note:10..25", &vault, &Settings::default()).unwrap();

        assert_eq!(resolved.file, Path::new("/vault/My Note.md"));
        assert_eq!(resolved.start_line, 9);
        assert_eq!(resolved.end_line, Some(24));
        assert_eq!(resolved.alt_text, "My Note:10-25");
    }

    #[test]
    fn single_line() {
        let vault = memory_vault(&[("note.md", "a\nb\nc\nd\ne\nf")]);

        let resolved = resolve_raw("note:5", &vault, &Settings::default()).unwrap();

        assert_eq!(resolved.start_line, 4);
        assert_eq!(resolved.end_line, None);
        assert!(!resolved.is_range());
    }

    #[test]
    fn exclusive_end_drops_the_last_line() {
        let vault = memory_vault(&[("note.md", "x")]);
        let settings = Settings {
            end_inclusive: false,
            ..Settings::default()
        };

        let resolved = resolve_raw("note:10..25", &vault, &settings).unwrap();

        assert_eq!(resolved.start_line, 9);
        assert_eq!(resolved.end_line, Some(23));
    }

    #[test]
    fn unknown_note_fails() {
        let vault = memory_vault(&[("note.md", "x")]);

        assert_eq!(resolve_raw("other:1..2", &vault, &Settings::default()), None);
    }

    #[test]
    fn explicit_alt_text_wins_over_patterns() {
        let vault = memory_vault(&[("Folder/note.md", "x")]);
        let mut settings = Settings::default();
        settings.add_pattern(VisualPattern {
            range_start_visual: " @ ".to_string(),
            ..VisualPattern::for_path("Folder/")
        });

        let resolved = resolve_raw("Folder/note:1..2|mine", &vault, &settings).unwrap();
        assert_eq!(resolved.alt_text, "mine");

        let resolved = resolve_raw("Folder/note:1..2", &vault, &settings).unwrap();
        assert_eq!(resolved.alt_text, "note @ 1..2");
    }

    #[test]
    fn heading_range_includes_end_section() {
        let vault = memory_vault(&[("Note.md", SECTIONED_NOTE)]);

        let resolved = resolve_raw("Note#Intro..Summary", &vault, &headings(true)).unwrap();

        assert_eq!(resolved.start_line, 0);
        // line 7 is the Appendix heading
        assert_eq!(resolved.end_line, Some(6));
        assert_eq!(resolved.alt_text, "Note:Intro-Summary");
    }

    #[test]
    fn exclusive_heading_range_stops_before_end_heading() {
        let vault = memory_vault(&[("Note.md", SECTIONED_NOTE)]);

        let resolved = resolve_raw("Note#Body..Summary", &vault, &headings(false)).unwrap();

        assert_eq!(resolved.start_line, 2);
        assert_eq!(resolved.end_line, Some(3));
    }

    #[test]
    fn last_heading_extends_to_end_of_document() {
        let vault = memory_vault(&[("Note.md", SECTIONED_NOTE)]);

        let resolved = resolve_raw("Note#Summary..Appendix", &vault, &headings(true)).unwrap();

        assert_eq!(resolved.start_line, 4);
        assert_eq!(resolved.end_line, Some(8));
    }

    #[test]
    fn missing_end_heading_degrades_to_single_point() {
        let vault = memory_vault(&[("Note.md", SECTIONED_NOTE)]);

        let resolved = resolve_raw("Note#Body..Nowhere", &vault, &headings(true)).unwrap();

        assert_eq!(resolved.start_line, 2);
        assert_eq!(resolved.end_line, None);
    }

    #[test]
    fn closed_atx_headings_match_their_text() {
        let text = "# Intro #\ntext\n## Body ##\nbody\n## Summary ##\nend";
        let vault = memory_vault(&[("Note.md", text)]);

        let resolved = resolve_raw("Note#Body..Summary", &vault, &headings(true)).unwrap();

        assert_eq!(resolved.start_line, 2);
        assert_eq!(resolved.end_line, Some(5));
    }

    #[test]
    fn missing_start_heading_fails() {
        let vault = memory_vault(&[("Note.md", SECTIONED_NOTE)]);

        assert_eq!(
            resolve_raw("Note#Nowhere..Summary", &vault, &headings(true)),
            None
        );
        // exact, case-sensitive match
        assert_eq!(resolve_raw("Note#intro", &vault, &headings(true)), None);
    }

    #[test]
    fn heading_patterns_match_resolved_path() {
        let vault = memory_vault(&[("Deep/Folder/Note.md", SECTIONED_NOTE)]);
        let mut settings = headings(true);
        settings.add_pattern(VisualPattern {
            range_start_visual: " > ".to_string(),
            range_separator_visual: " to ".to_string(),
            path: "Deep/".to_string(),
        });

        let resolved = resolve_raw("Note#Intro..Body", &vault, &settings).unwrap();

        assert_eq!(resolved.alt_text, "Note > Intro to Body");
    }

    #[test]
    fn verse_citation_resolves_to_chapter_note() {
        let text = numbered_lines(10);
        let vault = memory_vault(&[("Bible/60 I Peter/Chapter 01.md", text.as_str())]);
        let settings = Settings {
            grammar: LinkGrammar::Verses,
            root_folder: "Bible".to_string(),
            ..Settings::default()
        };

        let resolved = resolve_raw("1 Peter 1:3-5", &vault, &settings).unwrap();

        assert_eq!(resolved.start_line, 2);
        assert_eq!(resolved.end_line, Some(4));
        assert_eq!(resolved.alt_text, "1 Peter 1:3-5");
    }
}
