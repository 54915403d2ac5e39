//! Hover for range links.
//!
//! Hovering a range link previews the lines it points at. Links that do not
//! resolve yield [`HoverTarget::Default`] so the editor's normal hover applies.
//!
//! Hover can be disabled via [`Settings::hover`]:
//!
//! ```json
//! { "hover": false }
//! ```

use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::config::Settings;
use crate::extract::read_range;
use crate::link_parser::parse;
use crate::resolver::{resolve, ResolvedReference};
use crate::vault::{MDRangeLink, Vault};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverTarget {
    /// The link under the cursor resolves; preview `file` from line `scroll`.
    Range {
        note: String,
        file: PathBuf,
        scroll: usize,
    },
    /// Not a range link, or it does not resolve.
    Default,
}

pub fn hover_target(
    vault: &Vault,
    path: &Path,
    position: Position,
    settings: &Settings,
) -> HoverTarget {
    match resolve_at(vault, path, position, settings) {
        Some((_, resolved)) => HoverTarget::Range {
            note: resolved.reference.note_name,
            file: resolved.file,
            scroll: resolved.start_line,
        },
        None => HoverTarget::Default,
    }
}

/// Markdown preview of the range under the cursor: the link's label as a heading,
/// then the referenced lines.
pub async fn hover(
    vault: &Vault,
    path: &Path,
    position: Position,
    settings: &Settings,
) -> Option<Hover> {
    if !settings.hover {
        return None;
    }

    let (link, resolved) = resolve_at(vault, path, position, settings)?;
    let lines = read_range(vault, &resolved.file, resolved.start_line, resolved.end_line).await;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format!("### {}\n\n{}", resolved.alt_text, lines.join("\n")),
        }),
        range: Some(*link.range),
    })
}

pub(crate) fn resolve_at<'a>(
    vault: &'a Vault,
    path: &Path,
    position: Position,
    settings: &Settings,
) -> Option<(&'a MDRangeLink, ResolvedReference)> {
    let link = vault.select_range_link_at_position(path, position)?;
    let reference = parse(link.target(), settings)?;
    let resolved = resolve(&reference, vault, settings)?;
    Some((link, resolved))
}
