//! Visual pattern lookup.
//!
//! Patterns are matched by path prefix, newest first: a narrower rule added
//! after a broad one overrides it without any explicit priority.

use crate::config::{Settings, VisualPattern};

/// The pattern whose `path` prefixes `target`, trying the most recently added first.
///
/// Falls back to the default pattern at index 0, which matches everything.
pub fn resolve_pattern<'a>(target: &str, settings: &'a Settings) -> &'a VisualPattern {
    settings
        .patterns
        .iter()
        .skip(1)
        .rev()
        .find(|pattern| target.starts_with(pattern.path.as_str()))
        .unwrap_or_else(|| settings.default_pattern())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_settings() -> Settings {
        let mut settings = Settings::default();
        settings.add_pattern(VisualPattern {
            range_start_visual: " § ".to_string(),
            ..VisualPattern::for_path("Folder/")
        });
        settings.add_pattern(VisualPattern {
            range_start_visual: " ¶ ".to_string(),
            ..VisualPattern::for_path("Folder/Sub/")
        });
        settings
    }

    #[test]
    fn most_specific_later_pattern_wins() {
        let settings = nested_settings();

        assert_eq!(
            resolve_pattern("Folder/Sub/Note", &settings).path,
            "Folder/Sub/"
        );
        assert_eq!(resolve_pattern("Folder/Other", &settings).path, "Folder/");
    }

    #[test]
    fn unmatched_path_uses_default() {
        let settings = nested_settings();

        assert!(resolve_pattern("Elsewhere/Note", &settings).is_default());
        assert!(resolve_pattern("Note", &settings).is_default());
    }

    #[test]
    fn last_added_is_tried_first() {
        let mut settings = Settings::default();
        settings.add_pattern(VisualPattern::for_path("Folder/Sub/"));
        settings.add_pattern(VisualPattern::for_path("Folder/"));

        // the broad rule was added last, so it shadows the narrow one
        assert_eq!(resolve_pattern("Folder/Sub/Note", &settings).path, "Folder/");
    }
}
