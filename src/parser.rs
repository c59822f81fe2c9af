//! Book parser: one book's plaintext to its chapter/verse structure.
//!
//! A book document starts with a summary that lists its chapters in
//! increasing order, then repeats the chapters with their verses. Books with
//! a single chapter carry no headings at all and are returned as a flat verse
//! map.

use crate::error::{ParseError, Stage};
use crate::formats::{ChapterMap, ParsedBook, VerseMap};
use crate::patterns::{self, CHAPTERLESS_BOUNDARY, HEADING_LINE, TRUE_HEADING, VERSE_MARKER};

/// True when at least one `Chapter N` / `Psalm N` heading is directly followed
/// by verse 1.
pub fn detect_has_chapters(raw_text: &str) -> bool {
    TRUE_HEADING.is_match(raw_text)
}

pub fn parse_book(raw_text: &str) -> Result<ParsedBook, ParseError> {
    if detect_has_chapters(raw_text) {
        let content = strip_summary(raw_text)?;
        tracing::debug!(
            summary_bytes = raw_text.len() - content.len(),
            "chaptered book"
        );
        parse_chapters(content).map(ParsedBook::Chaptered)
    } else {
        tracing::debug!("chapterless book");
        parse_chapterless(raw_text).map(ParsedBook::Chapterless)
    }
}

/// Returns the text that follows the summary of a chaptered book.
///
/// The summary lists chapter numbers in increasing order; content starts at
/// the first line whose number does not increase. When that line is not a
/// heading (verse text of a document without a summary), content starts at
/// the last heading seen before it.
pub fn strip_summary(raw_text: &str) -> Result<&str, ParseError> {
    let first_heading = TRUE_HEADING
        .find(raw_text)
        .map(|m| m.start())
        .ok_or_else(|| {
            ParseError::ambiguity(
                Stage::SummaryBoundary,
                "no chapter heading is followed by verse 1",
            )
        })?;

    let mut last_chapter = 0u32;
    let mut last_heading: Option<usize> = None;
    let mut offset = 0usize;
    let mut content_start = None;

    for line in raw_text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let is_heading = patterns::heading_number(line).is_some();

        if let Some(number) = patterns::summary_number(line) {
            if number > last_chapter {
                last_chapter = number;
            } else {
                content_start = Some(match last_heading {
                    Some(heading_start) if !is_heading => heading_start,
                    _ => line_start,
                });
                break;
            }
        }

        if is_heading {
            last_heading = Some(line_start);
        }
    }

    let start = content_start.unwrap_or(first_heading);
    tracing::trace!(start, last_chapter, "summary boundary");
    Ok(&raw_text[start..])
}

fn parse_chapters(content: &str) -> Result<ChapterMap, ParseError> {
    let headings: Vec<(u32, usize, usize)> = HEADING_LINE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?.as_str().parse().ok()?;
            Some((number, whole.start(), whole.end()))
        })
        .collect();

    let Some(&(_, first_start, _)) = headings.first() else {
        return Err(ParseError::ambiguity(
            Stage::ChapterSplit,
            "no chapter heading after the summary",
        ));
    };

    let leading = content[..first_start].trim();
    if !leading.is_empty() {
        tracing::debug!(
            dropped = leading.len(),
            "text before first chapter heading dropped"
        );
    }

    let mut chapters = ChapterMap::new();
    for (i, &(number, _, body_start)) in headings.iter().enumerate() {
        let body_end = headings
            .get(i + 1)
            .map_or(content.len(), |&(_, next_start, _)| next_start);
        chapters.insert(number, parse_verses(&content[body_start..body_end]));
    }

    Ok(chapters)
}

fn parse_chapterless(raw_text: &str) -> Result<VerseMap, ParseError> {
    match CHAPTERLESS_BOUNDARY.find(raw_text) {
        Some(boundary) => Ok(parse_verses(&raw_text[boundary.start()..])),
        None if !VERSE_MARKER.is_match(raw_text) => Ok(VerseMap::new()),
        None => Err(ParseError::ambiguity(
            Stage::ChapterlessBoundary,
            "verse markers present but no line starts with verse 1",
        )),
    }
}

/// Splits a chapter (or chapterless book) body into verses.
///
/// Text before the first verse marker is dropped. Verse text is trimmed;
/// line breaks inside a verse are kept.
pub fn parse_verses(text: &str) -> VerseMap {
    let markers: Vec<(u32, usize, usize)> = VERSE_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?.as_str().parse().ok()?;
            Some((number, whole.start(), whole.end()))
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, &(number, _, body_start))| {
            let body_end = markers
                .get(i + 1)
                .map_or(text.len(), |&(_, next_start, _)| next_start);
            (number, text[body_start..body_end].trim().to_owned())
        })
        .collect()
}
