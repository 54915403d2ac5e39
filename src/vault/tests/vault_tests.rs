use std::path::PathBuf;

use itertools::Itertools;
use tower_lsp::lsp_types::{Position, Range};

use crate::test_utils::create_test_vault;
use crate::vault::{HeadingLevel, MDFile, MDHeading, Vault};

#[test]
fn heading_parsing() {
    let text = "# Intro\n\nbody\n\n## Body ##\n\ntext\n";

    let parsed = MDFile::new(text, PathBuf::from("/vault/note.md")).headings;

    let expected = vec![
        MDHeading {
            heading_text: "Intro".into(),
            range: Range {
                start: Position {
                    line: 0,
                    character: 0,
                },
                end: Position {
                    line: 0,
                    character: 7,
                },
            }
            .into(),
            level: HeadingLevel(1),
        },
        MDHeading {
            heading_text: "Body".into(),
            range: Range {
                start: Position {
                    line: 4,
                    character: 0,
                },
                end: Position {
                    line: 4,
                    character: 10,
                },
            }
            .into(),
            level: HeadingLevel(2),
        },
    ];

    assert_eq!(parsed, expected);
}

#[test]
fn closing_hashes_are_not_heading_text() {
    let text = "## Body ##\n# Summary #   \n## C#\n### Plans ### ##x\n";

    let parsed = MDFile::new(text, PathBuf::from("/vault/note.md")).headings;

    assert_eq!(
        parsed.iter().map(|h| h.heading_text.as_str()).collect_vec(),
        vec!["Body", "Summary", "C#", "Plans ### ##x"]
    );
}

#[test]
fn hash_inside_a_line_is_not_a_heading() {
    let text = "see issue # 4\n####### too deep\n";

    let parsed = MDFile::new(text, PathBuf::from("/vault/note.md")).headings;

    assert!(parsed.is_empty());
}

#[test]
fn headings_in_code_blocks_are_skipped() {
    let text = "# Real\n\n```bash\n# comment\n```\n\n## Also Real\n";

    let parsed = MDFile::new(text, PathBuf::from("/vault/note.md"))
        .headings
        .into_iter()
        .map(|heading| heading.heading_text)
        .collect_vec();

    assert_eq!(parsed, vec!["Real".to_string(), "Also Real".to_string()]);
}

#[test]
fn range_link_parsing() {
    let text = "See [[Note:10..25]] and\n![[Other#Intro..Summary|the intro]]\n";

    let links = MDFile::new(text, PathBuf::from("/vault/note.md")).range_links;

    assert_eq!(links.len(), 2);

    assert_eq!(links[0].raw, "Note:10..25");
    assert_eq!(links[0].raw_offset, 6);
    assert!(!links[0].is_embed);
    assert_eq!(links[0].range.start, Position::new(0, 4));
    assert_eq!(links[0].range.end, Position::new(0, 19));

    assert_eq!(links[1].raw, "Other#Intro..Summary|the intro");
    assert_eq!(links[1].target(), "Other#Intro..Summary");
    assert!(links[1].is_embed);
    assert_eq!(links[1].range.start, Position::new(1, 0));
}

#[test]
fn note_lookup_order() {
    let (_temp_dir, vault_dir, vault) = create_test_vault(|dir| {
        std::fs::create_dir_all(dir.join("Archive")).unwrap();
        std::fs::create_dir_all(dir.join("Projects/Deep")).unwrap();
        std::fs::write(dir.join("Note.md"), "root").unwrap();
        std::fs::write(dir.join("Archive/Note.md"), "archived").unwrap();
        std::fs::write(dir.join("Projects/Deep/Plan.md"), "plan").unwrap();
    });

    // exact path wins over base name
    assert_eq!(
        vault.select_file_for_note("Note"),
        Some(vault_dir.join("Note.md").as_path())
    );
    assert_eq!(
        vault.select_file_for_note("Archive/Note"),
        Some(vault_dir.join("Archive/Note.md").as_path())
    );
    // base name
    assert_eq!(
        vault.select_file_for_note("Plan"),
        Some(vault_dir.join("Projects/Deep/Plan.md").as_path())
    );
    // partial path suffix
    assert_eq!(
        vault.select_file_for_note("Deep/Plan"),
        Some(vault_dir.join("Projects/Deep/Plan.md").as_path())
    );
    // case sensitive
    assert_eq!(vault.select_file_for_note("plan"), None);
    assert_eq!(vault.select_file_for_note("Missing"), None);
}

#[test]
fn hidden_directories_are_not_indexed() {
    let (_temp_dir, _vault_dir, vault) = create_test_vault(|dir| {
        std::fs::create_dir_all(dir.join(".linkrange")).unwrap();
        std::fs::write(dir.join(".linkrange/notes.md"), "# hidden").unwrap();
        std::fs::write(dir.join("visible.md"), "# shown").unwrap();
        std::fs::write(dir.join("image.png"), "not markdown").unwrap();
    });

    assert_eq!(vault.document_count(), 1);
}

#[test]
fn update_vault_reindexes_file() {
    let root = PathBuf::from("/vault");
    let path = root.join("note.md");
    let mut vault = Vault::new(&root);

    Vault::update_vault(&mut vault, (&path, "# One\n"));
    assert_eq!(vault.select_headings(&path).map(Vec::len), Some(1));

    Vault::update_vault(&mut vault, (&path, "# One\n## Two\nline\n"));
    assert_eq!(vault.select_headings(&path).map(Vec::len), Some(2));
    assert_eq!(vault.select_line_count(&path), Some(4));
    assert_eq!(vault.select_text(&path).as_deref(), Some("# One\n## Two\nline\n"));

    vault.remove_file(&path);
    assert_eq!(vault.document_count(), 0);
    assert_eq!(vault.select_text(&path), None);
}

#[test]
fn note_lookup_follows_updates_and_removals() {
    let root = PathBuf::from("/vault");
    let nested = root.join("b/Note.md");
    let top = root.join("a/Note.md");
    let mut vault = Vault::new(&root);

    Vault::update_vault(&mut vault, (&nested, "nested"));
    assert_eq!(vault.select_file_for_note("Note"), Some(nested.as_path()));

    // sorted by vault path, so `a/` now comes first
    Vault::update_vault(&mut vault, (&top, "top"));
    Vault::update_vault(&mut vault, (&top, "top again"));
    assert_eq!(vault.select_file_for_note("Note"), Some(top.as_path()));

    vault.remove_file(&top);
    assert_eq!(vault.select_file_for_note("Note"), Some(nested.as_path()));

    vault.remove_file(&nested);
    assert_eq!(vault.select_file_for_note("Note"), None);
}

#[test]
fn range_link_at_position() {
    let root = PathBuf::from("/vault");
    let path = root.join("note.md");
    let mut vault = Vault::new(&root);
    Vault::update_vault(&mut vault, (&path, "text [[A:1..2]] text [[B:3]]\n"));

    let link = vault.select_range_link_at_position(&path, Position::new(0, 24));
    assert_eq!(link.map(|link| link.raw.as_str()), Some("B:3"));

    assert_eq!(vault.select_range_link_at_position(&path, Position::new(0, 2)), None);
}
