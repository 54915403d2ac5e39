use std::path::Path;

use tower_lsp::lsp_types::{Location, Position, Range, Url};

use crate::config::Settings;
use crate::hover::resolve_at;
use crate::vault::Vault;

/// The location a range link points at: its file, spanning the start line through
/// the end of the last line in range.
pub fn goto_definition(
    vault: &Vault,
    cursor_position: Position,
    path: &Path,
    settings: &Settings,
) -> Option<Vec<Location>> {
    let (_, resolved) = resolve_at(vault, path, cursor_position, settings)?;
    let end_line = resolved.end_line.unwrap_or(resolved.start_line);

    Some(vec![Location {
        uri: Url::from_file_path(&resolved.file).ok()?,
        range: Range {
            start: Position {
                line: resolved.start_line as u32,
                character: 0,
            },
            end: Position {
                line: end_line as u32,
                character: line_length(vault, &resolved.file, end_line) as u32,
            },
        },
    }])
}

/// Length of a line in characters, without its line break. Zero for lines the
/// vault does not know.
fn line_length(vault: &Vault, file: &Path, line: usize) -> usize {
    let Some(rope) = vault.ropes.get(file) else {
        return 0;
    };
    if line >= rope.len_lines() {
        return 0;
    }

    let text = rope.line(line);
    text.chars().filter(|c| *c != '\n' && *c != '\r').count()
}
