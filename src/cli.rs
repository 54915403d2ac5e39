//! Command-line front end: run the server, or resolve and expand references
//! against a vault from the shell.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::Settings;
use crate::link_parser::parse;
use crate::postprocess::{replace_embed, LinkElement};
use crate::resolver::resolve;
use crate::vault::Vault;

#[derive(Parser, Debug)]
#[command(name = "linkrange", version)]
#[command(about = "Line and heading range links for Markdown vaults")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the language server over stdio
    Lsp,
    /// Resolve a reference such as `My Note:10..25` to a file and line range
    Resolve {
        reference: String,
        /// Vault root (defaults to current directory)
        #[arg(short, long)]
        vault: Option<PathBuf>,
        /// Print JSON instead of `file:start-end`
        #[arg(long)]
        json: bool,
    },
    /// Print the Markdown a range embed expands to
    Embed {
        reference: String,
        /// Vault root (defaults to current directory)
        #[arg(short, long)]
        vault: Option<PathBuf>,
    },
}

#[derive(Serialize, Debug)]
struct ResolveOutput<'a> {
    file: &'a Path,
    /// 1-based, as typed
    start: usize,
    end: Option<usize>,
    alt_text: &'a str,
}

pub fn vault_root(vault: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match vault {
        Some(vault) => Ok(vault),
        None => std::env::current_dir().context("reading current directory"),
    }
}

fn load(root: &Path) -> anyhow::Result<(Vault, Settings)> {
    let settings = Settings::new(root)?;
    let vault = Vault::construct_vault(root)
        .with_context(|| format!("indexing vault at {}", root.display()))?;
    Ok((vault, settings))
}

pub fn resolve_command(reference: &str, root: &Path, json: bool) -> anyhow::Result<String> {
    let (vault, settings) = load(root)?;

    let parsed =
        parse(reference, &settings).ok_or_else(|| anyhow!("not a range link: {reference}"))?;
    let resolved = resolve(&parsed, &vault, &settings)
        .ok_or_else(|| anyhow!("could not resolve {reference}"))?;

    if json {
        let output = ResolveOutput {
            file: &resolved.file,
            start: resolved.start_line + 1,
            end: resolved.end_line.map(|end| end + 1),
            alt_text: &resolved.alt_text,
        };
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    let lines = match resolved.end_line {
        Some(end) => format!("{}-{}", resolved.start_line + 1, end + 1),
        None => format!("{}", resolved.start_line + 1),
    };
    Ok(format!(
        "{}:{lines}\t{}",
        resolved.file.display(),
        resolved.alt_text
    ))
}

pub async fn embed_command(reference: &str, root: &Path) -> anyhow::Result<String> {
    let (vault, settings) = load(root)?;

    let Some(view) = replace_embed(&vault, &LinkElement::embed(reference), &settings).await else {
        bail!("{reference} does not resolve to a range");
    };
    Ok(view.to_markdown())
}
