//! Range extraction: the lines a resolved reference points at.

use std::path::Path;

use tracing::warn;

use crate::vault::Vault;

/// `lines[start..=end]` of `content`, clamped to the content.
///
/// Without an end only the start line is returned. Out-of-range boundaries
/// degrade to fewer (or no) lines, never to an error.
pub fn slice_lines(content: &str, start_line: usize, end_line: Option<usize>) -> Vec<&str> {
    let lines: Vec<&str> = content.split('\n').collect();
    let line_count = lines.len();

    if start_line >= line_count {
        return Vec::new();
    }
    let start = start_line;

    let upper = match end_line {
        Some(end) => end.saturating_add(1),
        None => start + 1,
    }
    .min(line_count);

    if upper <= start {
        return Vec::new();
    }

    lines[start..upper].to_vec()
}

/// Reads a file's current text and slices the requested lines.
///
/// The vault's snapshot is preferred; files the vault has not indexed are read from disk.
pub async fn read_range(
    vault: &Vault,
    path: &Path,
    start_line: usize,
    end_line: Option<usize>,
) -> Vec<String> {
    let content = match vault.select_text(path) {
        Some(text) => text,
        None => match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), %err, "could not read range link target");
                return Vec::new();
            }
        },
    };

    slice_lines(&content, start_line, end_line)
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_vault_dir, memory_vault, numbered_lines};

    #[test]
    fn inclusive_range_has_end_minus_start_plus_one_lines() {
        let text = numbered_lines(30);

        let lines = slice_lines(&text, 9, Some(24));

        assert_eq!(lines.len(), 24 - 9 + 1);
        assert_eq!(lines.first(), Some(&"line 10"));
        assert_eq!(lines.last(), Some(&"line 25"));
    }

    #[test]
    fn single_line_without_end() {
        let text = numbered_lines(6);

        assert_eq!(slice_lines(&text, 4, None), vec!["line 5"]);
    }

    #[test]
    fn end_is_clamped_to_content() {
        let text = numbered_lines(3);

        assert_eq!(slice_lines(&text, 1, Some(100)), vec!["line 2", "line 3"]);
        assert_eq!(slice_lines(&text, 1, Some(usize::MAX)), vec!["line 2", "line 3"]);
    }

    #[test]
    fn out_of_range_start_is_empty() {
        let text = numbered_lines(3);

        assert!(slice_lines(&text, 3, None).is_empty());
        assert!(slice_lines(&text, 50, Some(60)).is_empty());
    }

    #[test]
    fn reversed_range_is_empty() {
        let text = numbered_lines(10);

        assert!(slice_lines(&text, 5, Some(3)).is_empty());
    }

    #[test]
    fn empty_content_has_one_empty_line() {
        assert_eq!(slice_lines("", 0, None), vec![""]);
    }

    #[tokio::test]
    async fn read_range_prefers_vault_snapshot() {
        let vault = memory_vault(&[("note.md", "a\nb\nc")]);

        let lines = read_range(&vault, Path::new("/vault/note.md"), 1, Some(2)).await;

        assert_eq!(lines, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn read_range_falls_back_to_disk() {
        let (_temp_dir, vault_dir) = create_test_vault_dir();
        let path = vault_dir.join("note.md");
        std::fs::write(&path, "one\ntwo\nthree").unwrap();
        let vault = Vault::new(&vault_dir);

        assert_eq!(read_range(&vault, &path, 2, None).await, vec!["three".to_string()]);
        assert!(read_range(&vault, &vault_dir.join("missing.md"), 0, None)
            .await
            .is_empty());
    }
}
