use crate::config::{Markers, VisualPattern};
use crate::vault::base_name;

/// Display text for a range link: `<note><start visual><start>[<separator visual><end>]`.
///
/// An empty visual in the pattern stands for the raw marker the user typed, not for
/// no marker at all.
pub fn format_display_text(
    note: &str,
    start_key: &str,
    end_key: Option<&str>,
    pattern: &VisualPattern,
    markers: Markers,
) -> String {
    let start_visual = visual_or(&pattern.range_start_visual, markers.range_start);

    let mut text = format!("{}{start_visual}{start_key}", base_name(note));
    if let Some(end_key) = end_key {
        let separator_visual = visual_or(&pattern.range_separator_visual, markers.range_separator);
        text.push_str(separator_visual);
        text.push_str(end_key);
    }
    text
}

fn visual_or<'a>(visual: &'a str, raw: &'a str) -> &'a str {
    match visual {
        "" => raw,
        visual => visual,
    }
}
