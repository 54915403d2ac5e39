use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Path prefix of the built-in pattern. Every note path matches it.
pub const DEFAULT_PATTERN_PATH: &str = "/";
pub const SETTINGS_VERSION: &str = "v4";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Delimiter typed between the start and end of a range, e.g. `Note:10..25`
    pub range_separator: String,
    /// Whether the end key of a range is part of the range
    pub end_inclusive: bool,
    /// Folder prepended to note names by the verse grammar
    pub root_folder: String,
    pub grammar: LinkGrammar,
    /// Visual overrides per path prefix. Index 0 is the default and is never removed.
    pub patterns: Vec<VisualPattern>,
    #[serde(alias = "settingsVersion")]
    pub settings_version: String,
    pub hover: bool,
    /// Pre-v4 single format string (`$note:$h1-$h2`); migrated into the default pattern.
    #[serde(alias = "altFormat", skip_serializing_if = "Option::is_none")]
    pub alt_format: Option<String>,
}

/// The addressing grammar in use. Only one is active at a time.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkGrammar {
    /// `Note:10..25`
    #[default]
    Lines,
    /// `Note#Intro..Summary`
    Headings,
    /// `John 3:16-18`
    Verses,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VisualPattern {
    /// Shown in place of the range-start marker. Empty means the raw marker.
    pub range_start_visual: String,
    /// Shown in place of the range separator. Empty means the raw separator.
    pub range_separator_visual: String,
    pub path: String,
}

impl Default for VisualPattern {
    fn default() -> Self {
        VisualPattern {
            range_start_visual: ":".to_string(),
            range_separator_visual: "-".to_string(),
            path: DEFAULT_PATTERN_PATH.to_string(),
        }
    }
}

impl VisualPattern {
    pub fn for_path(path: &str) -> Self {
        VisualPattern {
            range_start_visual: String::new(),
            range_separator_visual: String::new(),
            path: path.to_string(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.path == DEFAULT_PATTERN_PATH
    }
}

/// The raw tokens a user types for the active grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers<'a> {
    pub range_start: &'a str,
    pub range_separator: &'a str,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            range_separator: "..".to_string(),
            end_inclusive: true,
            root_folder: "".to_string(),
            grammar: LinkGrammar::Lines,
            patterns: vec![VisualPattern::default()],
            settings_version: SETTINGS_VERSION.to_string(),
            hover: true,
            alt_format: None,
        }
    }
}

impl Settings {
    /// Layered settings: built-in defaults, then the user config, then the vault config.
    /// The record persisted by [`SettingsStore`] contributes only what the settings UI
    /// edits: the visual patterns and the settings version.
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/linkrange/settings");
        let root = root_dir
            .to_str()
            .ok_or(anyhow!("Can't convert root_dir to str"))?;
        let defaults = Settings::default();

        let settings = Config::builder()
            .set_default("range_separator", defaults.range_separator)?
            .set_default("end_inclusive", defaults.end_inclusive)?
            .set_default("root_folder", defaults.root_folder)?
            .set_default("grammar", "Lines")?
            .set_default("settings_version", defaults.settings_version)?
            .set_default("hover", defaults.hover)?
            .add_source(File::with_name(&expanded).required(false))
            .add_source(File::with_name(&format!("{root}/.linkrange/settings")).required(false))
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let mut settings = settings.try_deserialize::<Settings>()?;

        if let Some(record) = SettingsStore::for_vault(root_dir).load_existing()? {
            settings.patterns = record.patterns;
            settings.settings_version = record.settings_version;
        }
        settings.ensure_default_pattern();

        anyhow::Ok(settings)
    }

    pub fn markers(&self) -> Markers<'_> {
        match self.grammar {
            LinkGrammar::Lines => Markers {
                range_start: ":",
                range_separator: &self.range_separator,
            },
            LinkGrammar::Headings => Markers {
                range_start: "#",
                range_separator: &self.range_separator,
            },
            LinkGrammar::Verses => Markers {
                range_start: ":",
                range_separator: "-",
            },
        }
    }

    pub fn default_pattern(&self) -> &VisualPattern {
        &self.patterns[0]
    }

    /// Appends a pattern for `path`. Later patterns take precedence over earlier ones.
    pub fn add_pattern(&mut self, pattern: VisualPattern) {
        self.patterns.push(pattern);
    }

    /// Removes a user pattern. The default pattern at index 0 cannot be removed.
    pub fn remove_pattern(&mut self, index: usize) -> Option<VisualPattern> {
        if index == 0 || index >= self.patterns.len() {
            return None;
        }
        Some(self.patterns.remove(index))
    }

    fn ensure_default_pattern(&mut self) {
        self.patterns.retain(|pattern| !pattern.path.is_empty());
        match self.patterns.iter().position(VisualPattern::is_default) {
            Some(0) => {}
            Some(index) => {
                let default = self.patterns.remove(index);
                self.patterns.insert(0, default);
            }
            None => self.patterns.insert(0, VisualPattern::default()),
        }
        // exactly one default
        let mut seen_default = false;
        self.patterns.retain(|pattern| {
            let keep = !(pattern.is_default() && seen_default);
            seen_default |= pattern.is_default();
            keep
        });
    }

    /// Splits a legacy `$note<start>$h1<sep>$h2` format string into the default pattern.
    ///
    /// Returns whether anything changed. Runs at most once: the legacy field is cleared.
    pub fn migrate_legacy(&mut self) -> bool {
        let Some(format) = self.alt_format.take() else {
            return false;
        };

        let start_visual = between(&format, "$note", "$h1");
        let separator_visual = between(&format, "$h1", "$h2");

        self.ensure_default_pattern();
        let default = &mut self.patterns[0];
        if let Some(visual) = start_visual {
            default.range_start_visual = visual.to_string();
        }
        if let Some(visual) = separator_visual {
            default.range_separator_visual = visual.to_string();
        }
        self.settings_version = SETTINGS_VERSION.to_string();

        info!(%format, "migrated legacy alt format into the default pattern");
        true
    }
}

fn between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let end = text[start..].find(close)? + start;
    Some(&text[start..end])
}

/// The JSON record written back on every settings change.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn for_vault(root_dir: &Path) -> SettingsStore {
        SettingsStore {
            path: root_dir.join(".linkrange").join("data.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted record, merging it over defaults and migrating a legacy record.
    pub fn load(&self) -> anyhow::Result<Settings> {
        anyhow::Ok(self.load_existing()?.unwrap_or_default())
    }

    /// Like [`SettingsStore::load`], but `None` when nothing has been persisted yet.
    pub fn load_existing(&self) -> anyhow::Result<Option<Settings>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return anyhow::Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        };

        let mut settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        settings.ensure_default_pattern();

        if settings.migrate_legacy() {
            self.save(&settings)?;
        }

        anyhow::Ok(Some(settings))
    }

    pub fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        anyhow::Ok(())
    }
}
