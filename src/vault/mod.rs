mod helpers;
mod types;

#[cfg(test)]
mod tests;

pub use helpers::{base_name, get_vault_path};
pub use types::{HeadingLevel, MDCodeBlock, MDHeading, MDRangeLink, MyRange, Rangeable};

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use ropey::Rope;
use tower_lsp::lsp_types::Position;
use tracing::info;
use walkdir::WalkDir;

#[derive(Debug, PartialEq, Eq, Clone)]
/// The in memory representation of the vault: every Markdown file's heading index,
/// code blocks and wiki-link occurrences, plus a rope snapshot of its text.
///
/// The methods only select data; interpretation is left to the resolver and the
/// host-facing modules. The vault is the single document index the core reads.
pub struct Vault {
    pub md_files: HashMap<PathBuf, MDFile>,
    pub ropes: HashMap<PathBuf, Rope>,
    /// `(vault path, file)` of every indexed file, sorted by vault path
    note_index: Vec<(String, PathBuf)>,
    root_dir: PathBuf,
}

impl Vault {
    /// An empty vault rooted at `root_dir`. Files are added with [`Vault::update_vault`].
    pub fn new(root_dir: &Path) -> Vault {
        Vault {
            md_files: HashMap::new(),
            ropes: HashMap::new(),
            note_index: Vec::new(),
            root_dir: root_dir.into(),
        }
    }

    pub fn construct_vault(root_dir: &Path) -> Result<Vault, std::io::Error> {
        let md_file_paths = WalkDir::new(root_dir)
            .into_iter()
            .filter_entry(|e| {
                !e.file_name()
                    .to_str()
                    .map(|s| s.starts_with('.'))
                    .unwrap_or(false)
            })
            .flatten()
            .filter(|f| f.path().extension().and_then(|e| e.to_str()) == Some("md"))
            .collect_vec();

        let documents: Vec<(PathBuf, MDFile, Rope)> = md_file_paths
            .par_iter()
            .flat_map(|p| {
                let text = std::fs::read_to_string(p.path())?;
                let md_file = MDFile::new(&text, PathBuf::from(p.path()));
                let rope = Rope::from_str(&text);

                Ok::<(PathBuf, MDFile, Rope), std::io::Error>((p.path().into(), md_file, rope))
            })
            .collect();

        let mut vault = Vault::new(root_dir);
        for (path, md_file, rope) in documents {
            vault.insert_document(path, md_file, rope);
        }

        info!(
            root = %root_dir.display(),
            files = vault.document_count(),
            "constructed vault"
        );

        Ok(vault)
    }

    /// Re-indexes one file from its current text.
    pub fn update_vault(old: &mut Vault, new_file: (&PathBuf, &str)) {
        let new_md_file = MDFile::new(new_file.1, new_file.0.clone());
        old.insert_document(new_file.0.clone(), new_md_file, Rope::from_str(new_file.1));
    }

    pub fn remove_file(&mut self, path: &Path) {
        self.md_files.remove(path);
        self.ropes.remove(path);
        self.note_index.retain(|(_, indexed)| indexed != path);
    }

    fn insert_document(&mut self, path: PathBuf, md_file: MDFile, rope: Rope) {
        if !self.md_files.contains_key(&path) {
            if let Some(vault_path) = self.vault_path(&path) {
                let key = (vault_path, path.clone());
                if let Err(index) = self.note_index.binary_search(&key) {
                    self.note_index.insert(index, key);
                }
            }
        }
        self.md_files.insert(path.clone(), md_file);
        self.ropes.insert(path, rope);
    }
}

/// Methods using vaults data
impl Vault {
    pub fn document_count(&self) -> usize {
        self.md_files.len()
    }

    /// Vault-relative `/`-separated path of an indexed file.
    pub fn vault_path(&self, path: &Path) -> Option<String> {
        get_vault_path(&self.root_dir, path)
    }

    /// Finds the file a note name refers to. First match wins, in this order:
    ///
    /// 1. the vault path equals `note.md`
    /// 2. the file's base name equals `note`
    /// 3. the vault path ends with `note.md` (partial paths)
    ///
    /// Files are tried in sorted path order, so the result is deterministic.
    pub fn select_file_for_note(&self, note: &str) -> Option<&Path> {
        let with_extension = format!("{note}.md");
        let files = &self.note_index;

        files
            .iter()
            .find(|(vault_path, _)| *vault_path == with_extension)
            .or_else(|| {
                files
                    .iter()
                    .find(|(_, path)| path.file_stem().and_then(|s| s.to_str()) == Some(note))
            })
            .or_else(|| {
                files
                    .iter()
                    .find(|(vault_path, _)| vault_path.ends_with(&with_extension))
            })
            .map(|(_, path)| path.as_path())
    }

    pub fn select_headings(&self, path: &Path) -> Option<&Vec<MDHeading>> {
        let md_file = self.md_files.get(path)?;
        let headings = &md_file.headings;
        Some(headings)
    }

    pub fn select_range_links(&self, path: &Path) -> Vec<&MDRangeLink> {
        self.md_files
            .get(path)
            .map(|md| md.range_links.iter().collect())
            .unwrap_or_default()
    }

    pub fn select_range_link_at_position(
        &self,
        path: &Path,
        position: Position,
    ) -> Option<&MDRangeLink> {
        self.select_range_links(path)
            .into_iter()
            .find(|link| link.includes_position(position))
    }

    pub fn select_line_count(&self, path: &Path) -> Option<usize> {
        self.ropes.get(path).map(|rope| rope.len_lines())
    }

    /// The indexed text snapshot of a file.
    pub fn select_text(&self, path: &Path) -> Option<String> {
        self.ropes.get(path).map(|rope| rope.to_string())
    }
}

#[derive(Debug, PartialEq, Eq, Default, Hash, Clone)]
pub struct MDFile {
    pub headings: Vec<MDHeading>,
    pub codeblocks: Vec<MDCodeBlock>,
    pub range_links: Vec<MDRangeLink>,
    pub path: PathBuf,
}

impl MDFile {
    pub fn new(text: &str, path: PathBuf) -> MDFile {
        let rope = Rope::from_str(text);
        let code_blocks = MDCodeBlock::new(text, &rope).collect_vec();
        let headings = MDHeading::new(text, &rope)
            .filter(|it| !code_blocks.iter().any(|codeblock| codeblock.includes(it)));
        let range_links = MDRangeLink::new(text, &rope)
            .filter(|it| !code_blocks.iter().any(|codeblock| codeblock.includes(it)));

        MDFile {
            headings: headings.collect(),
            range_links: range_links.collect(),
            codeblocks: code_blocks,
            path,
        }
    }
}

impl MDHeading {
    fn new<'a>(text: &'a str, rope: &'a Rope) -> impl Iterator<Item = MDHeading> + 'a {
        static HEADING_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?m)^(?<starter>#{1,6}) (?<heading_text>.+)$").unwrap());

        HEADING_RE
            .captures_iter(text)
            .flat_map(
                |c| match (c.get(0), c.name("heading_text"), c.name("starter")) {
                    (Some(full), Some(text), Some(starter)) => Some((full, text, starter)),
                    _ => None,
                },
            )
            .map(|(full_heading, heading_match, starter)| MDHeading {
                heading_text: strip_closing_sequence(heading_match.as_str()).into(),
                range: MyRange::from_range(rope, full_heading.range()),
                level: HeadingLevel(starter.as_str().len()),
            })
    }
}

/// `Body ##` -> `Body`. A closing run of `#` only counts after whitespace, so `C#` stays.
fn strip_closing_sequence(heading_text: &str) -> &str {
    static CLOSING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s+)#+\s*$").unwrap());

    let text = heading_text.trim();
    match CLOSING_RE.find(text) {
        Some(closing) => text[..closing.start()].trim_end(),
        None => text,
    }
}

impl MDCodeBlock {
    fn new<'a>(text: &'a str, rope: &'a Rope) -> impl Iterator<Item = MDCodeBlock> + 'a {
        static CODE_BLOCK_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?m)^```[^\n]*\n(?s:.*?)^```").unwrap());

        CODE_BLOCK_RE.find_iter(text).map(|block| MDCodeBlock {
            range: MyRange::from_range(rope, block.range()),
        })
    }
}

impl MDRangeLink {
    fn new<'a>(text: &'a str, rope: &'a Rope) -> impl Iterator<Item = MDRangeLink> + 'a {
        static WIKI_LINK_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?<embed>!?)\[\[(?<raw>[^\[\]\n]+)\]\]").unwrap());

        WIKI_LINK_RE
            .captures_iter(text)
            .flat_map(|c| match (c.get(0), c.name("raw"), c.name("embed")) {
                (Some(full), Some(raw), embed) => Some((full, raw, embed)),
                _ => None,
            })
            .map(|(full, raw, embed)| MDRangeLink {
                raw: raw.as_str().to_string(),
                raw_offset: raw.start(),
                is_embed: embed.is_some_and(|embed| !embed.as_str().is_empty()),
                range: MyRange::from_range(rope, full.range()),
            })
    }
}
