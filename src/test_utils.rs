//! Shared test utilities for linkrange.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::vault::Vault;

/// Creates a temporary vault directory for testing.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the vault subdirectory
///
/// Vault construction skips hidden directories, and temp directories are
/// sometimes created under paths like `/tmp/.tmpXXXXX`, so the vault lives in a
/// non-hidden `vault` subdirectory.
pub fn create_test_vault_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let vault_dir = temp_dir.path().join("vault");
    fs::create_dir(&vault_dir).expect("Failed to create vault subdirectory");
    (temp_dir, vault_dir)
}

/// Creates a test vault from a temporary directory.
///
/// `setup_fn` receives the vault directory and creates files before the
/// vault is constructed.
///
/// ```ignore
/// let (_temp_dir, vault_dir, vault) = create_test_vault(|dir| {
///     std::fs::write(dir.join("test.md"), "# Test").unwrap();
/// });
/// ```
pub fn create_test_vault<F>(setup_fn: F) -> (TempDir, PathBuf, Vault)
where
    F: FnOnce(&PathBuf),
{
    let (temp_dir, vault_dir) = create_test_vault_dir();
    setup_fn(&vault_dir);
    let vault = Vault::construct_vault(&vault_dir).expect("Failed to construct test vault");
    (temp_dir, vault_dir, vault)
}

/// An in-memory vault at `/vault` holding the given `(vault path, text)` documents.
pub fn memory_vault(documents: &[(&str, &str)]) -> Vault {
    let root = Path::new("/vault");
    let mut vault = Vault::new(root);
    for &(path, text) in documents {
        Vault::update_vault(&mut vault, (&root.join(path), text));
    }
    vault
}

/// `count` numbered lines: `line 1`, `line 2`, ...
pub fn numbered_lines(count: usize) -> String {
    (1..=count)
        .map(|n| format!("line {n}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A note whose headings appear in the order Intro, Body, Summary, Appendix.
///
/// ```text
/// 0  # Intro
/// 1  intro text
/// 2  ## Body
/// 3  body text
/// 4  ## Summary
/// 5  summary one
/// 6  summary two
/// 7  ## Appendix
/// 8  appendix text
/// ```
pub const SECTIONED_NOTE: &str = "# Intro\nintro text\n## Body\nbody text\n## Summary\nsummary one\nsummary two\n## Appendix\nappendix text";
