//! linkrange: range links for Markdown vaults
//!
//! A range link addresses part of a note instead of the whole of it:
//!
//! - `[[My Note:10..25]]` lines 10 through 25
//! - `[[My Note#Intro..Summary]]` from the Intro heading through the Summary section
//! - `[[John 3:16-18]]` verses of a chapter note
//!
//! # Architecture
//!
//! - [`link_parser`] and [`verse`]: raw link text to a [`link_parser::StructuredReference`]
//! - [`resolver`]: structured reference plus [`vault::Vault`] to 0-based line offsets
//! - [`pattern`] and [`display`]: the visual pattern and display text of a link
//! - [`extract`]: the referenced lines themselves
//! - [`postprocess`], [`decorations`], [`hover`], [`gotodef`]: what an editor shows
//! - [`server`] and [`cli`]: the language server and command-line front ends
//! - [`config`]: layered settings and the persisted settings record
//!
//! ```ignore
//! use linkrange::{config::Settings, link_parser::parse, resolver::resolve, vault::Vault};
//!
//! let settings = Settings::new(&vault_path)?;
//! let vault = Vault::construct_vault(&vault_path)?;
//! let reference = parse("My Note:10..25", &settings).unwrap();
//! let resolved = resolve(&reference, &vault, &settings);
//! ```

// Core modules - vault index and link semantics
pub mod vault;

pub mod display;
pub mod extract;
pub mod link_parser;
pub mod pattern;
pub mod resolver;
pub mod verse;

// Editor-facing modules
pub mod decorations;
pub mod gotodef;
pub mod hover;
pub mod postprocess;
pub mod server;

// Configuration and front ends
pub mod cli;
pub mod config;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
