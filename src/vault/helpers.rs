//! Helper utilities for the vault module.

use std::path::{Component, Path};

use pathdiff::diff_paths;

/// The vault-relative, `/`-separated path of a file, extension included.
pub fn get_vault_path(root_dir: &Path, path: &Path) -> Option<String> {
    diff_paths(path, root_dir).and_then(|diff| to_slash(&diff))
}

fn to_slash(path: &Path) -> Option<String> {
    let parts = path
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    Some(parts.join("/"))
}

/// Strips any directory prefix from a note name: `Folder/Sub/Note` -> `Note`.
pub fn base_name(note: &str) -> &str {
    note.rsplit('/').next().unwrap_or(note)
}
