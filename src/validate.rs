use crate::formats::{BookIssue, ParsedBook, VerseMap};

/// Checks that chapter and verse numbers run 1, 2, 3... without gaps.
pub fn validate_book(book: &ParsedBook) -> Vec<BookIssue> {
    let mut issues = Vec::new();

    match book {
        ParsedBook::Chaptered(chapters) => {
            if chapters.is_empty() {
                issues.push(BookIssue::EmptyBook);
            }
            if let Some((expected, found)) = first_gap(chapters.keys().copied()) {
                issues.push(BookIssue::ChapterGap { expected, found });
            }
            for (&chapter, verses) in chapters {
                check_verses(Some(chapter), verses, &mut issues);
            }
        }
        ParsedBook::Chapterless(verses) => check_verses(None, verses, &mut issues),
    }

    issues
}

fn check_verses(chapter: Option<u32>, verses: &VerseMap, issues: &mut Vec<BookIssue>) {
    if verses.is_empty() {
        issues.push(BookIssue::EmptyVerseMap { chapter });
        return;
    }
    if let Some((expected, found)) = first_gap(verses.keys().copied()) {
        issues.push(BookIssue::VerseGap {
            chapter,
            expected,
            found,
        });
    }
}

/// First place where an ascending key sequence leaves 1, 2, 3...
fn first_gap(keys: impl Iterator<Item = u32>) -> Option<(u32, u32)> {
    (1u32..)
        .zip(keys)
        .find(|(expected, found)| expected != found)
}
