//! Layout patterns of the plaintext book documents.
//!
//! Every structural decision the parser makes goes through one of these.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters that separate a verse number from its text.
pub const VERSE_SEPARATORS: &str = "\u{00A0}\u{202F}";

/// A `Chapter N` / `Psalm N` heading line directly followed by a line that
/// starts with verse 1. Summaries list the same headings without the verse.
pub static TRUE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:Chapter|Psalm) ([0-9]+)[ \t]*\r?\n1").expect("valid true heading pattern")
});

/// Any `Chapter N` / `Psalm N` heading on a line of its own.
pub static HEADING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:Chapter|Psalm) ([0-9]+)[ \t]*\r?$").expect("valid heading line pattern")
});

/// First chapter-like number on a summary line.
pub static SUMMARY_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Chapter|Psalm)? ?([0-9]+)").expect("valid summary number pattern")
});

/// Verse number followed by its separator.
pub static VERSE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("([0-9]+)[{VERSE_SEPARATORS}]")).expect("valid verse marker pattern")
});

/// Start of verse 1 in a book without chapter headings.
pub static CHAPTERLESS_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?m)^1[{VERSE_SEPARATORS}]")).expect("valid chapterless pattern")
});

/// Number of the heading when `line` is a `Chapter N` / `Psalm N` line.
pub fn heading_number(line: &str) -> Option<u32> {
    let caps = HEADING_LINE.captures(line.trim_end_matches('\n'))?;
    caps.get(1)?.as_str().parse().ok()
}

/// Leading chapter-or-psalm number of a line, if it has one.
pub fn summary_number(line: &str) -> Option<u32> {
    let caps = SUMMARY_NUMBER.captures(line)?;
    caps.get(1)?.as_str().parse().ok()
}
