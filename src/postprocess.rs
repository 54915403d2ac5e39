//! Rendered-view rewriting.
//!
//! The host hands over the link and embed elements of each rendered block.
//! Range links get their display text and navigation target rewritten; range
//! embeds are replaced by a heading, a link control and the referenced lines.
//! Anything that does not parse or resolve is left exactly as it was.
//!
//! # Attribute contract
//!
//! | Attribute    | Read / written | Meaning                                    |
//! |--------------|----------------|--------------------------------------------|
//! | `data-href`  | read, written  | raw reference; rewritten to the note name  |
//! | `range-href` | written        | raw reference as typed, for later lookups  |
//! | `href`       | written        | navigation target (the note name)          |
//! | `src`        | read           | raw reference of an embed                  |
//! | `alt`        | read           | user supplied display text                 |

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::Settings;
use crate::extract::read_range;
use crate::link_parser::parse;
use crate::resolver::{resolve, ResolvedReference};
use crate::vault::Vault;

pub const HREF_FIELD: &str = "data-href";
pub const RANGE_HREF_FIELD: &str = "range-href";
pub const EMBED_SRC_FIELD: &str = "src";
pub const LINK_CLASS: &str = "internal-link";
pub const EMBED_CLASS: &str = "internal-embed";

/// A rendered anchor or embed element, reduced to what range links need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkElement {
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub text: String,
}

impl LinkElement {
    pub fn link(href: &str, text: &str) -> LinkElement {
        LinkElement {
            attributes: BTreeMap::from([(HREF_FIELD.to_string(), href.to_string())]),
            classes: vec![LINK_CLASS.to_string()],
            text: text.to_string(),
        }
    }

    pub fn embed(src: &str) -> LinkElement {
        LinkElement {
            attributes: BTreeMap::from([(EMBED_SRC_FIELD.to_string(), src.to_string())]),
            classes: vec![EMBED_CLASS.to_string()],
            text: String::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> LinkElement {
        self.set_attribute(name, value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_embed(&self) -> bool {
        self.has_class(EMBED_CLASS)
    }
}

/// Where a click on a range link or embed should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub file: PathBuf,
    /// 0-based line to scroll to
    pub scroll: usize,
}

/// The replacement for an embed that resolved to a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedView {
    pub label: String,
    pub link: NavigationTarget,
    pub content: String,
}

impl EmbedView {
    pub fn to_markdown(&self) -> String {
        format!(
            "## {}\n\n[{}]({}#L{})\n\n{}\n",
            self.label,
            self.label,
            self.link.file.display(),
            self.link.scroll + 1,
            self.content
        )
    }
}

/// Parses and resolves the reference held in `href_field`, applying user alt text.
///
/// A non-empty `alt` attribute overrides the computed alt text unless it merely
/// repeats the note name. For inline links the element's own text does the same.
pub fn check_link(
    vault: &Vault,
    element: &LinkElement,
    settings: &Settings,
    is_embed: bool,
    href_field: &str,
) -> Option<ResolvedReference> {
    let href = element.attribute(href_field)?;
    let reference = parse(href, settings)?;
    let mut resolved = resolve(&reference, vault, settings)?;

    if reference.explicit_alt_text.is_none() {
        let note = &reference.note_name;

        if let Some(alt) = element.attribute("alt") {
            if !alt.is_empty() && !alt.contains(note.as_str()) {
                resolved.alt_text = alt.to_string();
            }
        }

        if !is_embed && !element.text.is_empty() && !element.text.contains(note.as_str()) {
            resolved.alt_text = element.text.clone();
        }
    }

    Some(resolved)
}

/// Rewrites an inline range link in place. Returns whether the element was changed.
pub fn process_link(vault: &Vault, element: &mut LinkElement, settings: &Settings) -> bool {
    let Some(resolved) = check_link(vault, element, settings, false, HREF_FIELD) else {
        return false;
    };
    let raw = element
        .attribute(HREF_FIELD)
        .unwrap_or_default()
        .to_string();
    let note = &resolved.reference.note_name;

    element.text = resolved.alt_text.clone();
    element.set_attribute("href", note);
    element.set_attribute(HREF_FIELD, note);
    element.set_attribute(RANGE_HREF_FIELD, &raw);

    true
}

/// The replacement for an embed, if it resolves to a range. Single-line and
/// unresolved embeds keep the host's default rendering.
pub async fn replace_embed(
    vault: &Vault,
    element: &LinkElement,
    settings: &Settings,
) -> Option<EmbedView> {
    let resolved = check_link(vault, element, settings, true, EMBED_SRC_FIELD)?;
    if !resolved.is_range() {
        return None;
    }

    let lines = read_range(vault, &resolved.file, resolved.start_line, resolved.end_line).await;

    Some(EmbedView {
        label: resolved.alt_text,
        link: NavigationTarget {
            file: resolved.file,
            scroll: resolved.start_line,
        },
        content: lines.join("\n"),
    })
}

/// One render pass over a block's elements: links are rewritten in place and the
/// replacement for each range embed is returned with the element's index.
pub async fn process_rendered(
    vault: &Vault,
    elements: &mut [LinkElement],
    settings: &Settings,
) -> Vec<(usize, EmbedView)> {
    let mut embeds = Vec::new();

    for (index, element) in elements.iter_mut().enumerate() {
        if element.is_embed() {
            if let Some(view) = replace_embed(vault, element, settings).await {
                embeds.push((index, view));
            }
        } else if element.has_class(LINK_CLASS) {
            process_link(vault, element, settings);
        }
    }

    embeds
}
