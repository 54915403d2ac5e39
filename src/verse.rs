//! Scripture citations as range links.
//!
//! `John 3:16-18` addresses verses 16 to 18 of the note
//! `<root_folder>/43 John/Chapter 03`, one verse per line. Book names are
//! normalised through [`BOOK_ALIASES`] and numbered in canonical order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Settings;
use crate::link_parser::StructuredReference;

/// Canonical book order. A book's folder number is its index plus one.
pub const BOOKS: [&str; 66] = [
    "Genesis",
    "Exodus",
    "Leviticus",
    "Numbers",
    "Deuteronomy",
    "Joshua",
    "Judges",
    "Ruth",
    "I Samuel",
    "II Samuel",
    "I Kings",
    "II Kings",
    "I Chronicles",
    "II Chronicles",
    "Ezra",
    "Nehemiah",
    "Esther",
    "Job",
    "Psalms",
    "Proverbs",
    "Ecclesiastes",
    "Song of Solomon",
    "Isaiah",
    "Jeremiah",
    "Lamentations",
    "Ezekiel",
    "Daniel",
    "Hosea",
    "Joel",
    "Amos",
    "Obadiah",
    "Jonah",
    "Micah",
    "Nahum",
    "Habakkuk",
    "Zephaniah",
    "Haggai",
    "Zechariah",
    "Malachi",
    "Matthew",
    "Mark",
    "Luke",
    "John",
    "Acts",
    "Romans",
    "I Corinthians",
    "II Corinthians",
    "Galatians",
    "Ephesians",
    "Philippians",
    "Colossians",
    "I Thessalonians",
    "II Thessalonians",
    "I Timothy",
    "II Timothy",
    "Titus",
    "Philemon",
    "Hebrews",
    "James",
    "I Peter",
    "II Peter",
    "I John",
    "II John",
    "III John",
    "Jude",
    "Revelation",
];

/// Arabic-numbered spellings and their canonical roman-numbered names.
pub const BOOK_ALIASES: [(&str, &str); 17] = [
    ("1 Peter", "I Peter"),
    ("2 Peter", "II Peter"),
    ("1 John", "I John"),
    ("2 John", "II John"),
    ("3 John", "III John"),
    ("1 Corinthians", "I Corinthians"),
    ("2 Corinthians", "II Corinthians"),
    ("1 Thessalonians", "I Thessalonians"),
    ("2 Thessalonians", "II Thessalonians"),
    ("1 Timothy", "I Timothy"),
    ("2 Timothy", "II Timothy"),
    ("1 Kings", "I Kings"),
    ("2 Kings", "II Kings"),
    ("1 Chronicles", "I Chronicles"),
    ("2 Chronicles", "II Chronicles"),
    ("1 Samuel", "I Samuel"),
    ("2 Samuel", "II Samuel"),
];

pub fn canonical_book_name(book: &str) -> &str {
    let book = book.trim();
    BOOK_ALIASES
        .iter()
        .find(|(alias, _)| *alias == book)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(book)
}

/// 1-based canonical number of a book, by canonical name.
pub fn book_number(canonical: &str) -> Option<usize> {
    BOOKS
        .iter()
        .position(|book| *book == canonical)
        .map(|index| index + 1)
}

/// The note holding a chapter: `[<root>/]<number> <Book>/Chapter <NN>`.
pub fn chapter_note_name(book: &str, chapter: usize, settings: &Settings) -> Option<String> {
    let canonical = canonical_book_name(book);
    let number = book_number(canonical)?;
    let chapter_note = format!("{number} {canonical}/Chapter {chapter:02}");

    let root = settings.root_folder.trim_matches('/');
    match root {
        "" => Some(chapter_note),
        root => Some(format!("{root}/{chapter_note}")),
    }
}

pub fn parse_citation(target: &str, settings: &Settings) -> Option<StructuredReference> {
    static CITATION_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?<book>.+?)\s+(?<chapter>\d+):(?<start>\d+)(?:\s*-\s*(?<end>\d+))?$")
            .unwrap()
    });

    let captures = CITATION_RE.captures(target.trim())?;
    let book = captures.name("book")?.as_str().trim();
    let chapter: usize = captures.name("chapter")?.as_str().parse().ok()?;
    let start = captures.name("start")?.as_str();
    let end = captures.name("end").map(|end| end.as_str());

    let positive = |key: &str| key.parse::<usize>().is_ok_and(|n| n >= 1);
    if chapter == 0 || !positive(start) || !end.map_or(true, positive) {
        return None;
    }

    Some(StructuredReference {
        note_name: chapter_note_name(book, chapter, settings)?,
        display_name: format!("{book} {chapter}"),
        range_start_key: start.to_string(),
        range_end_key: end.map(String::from),
        explicit_alt_text: None,
    })
}
