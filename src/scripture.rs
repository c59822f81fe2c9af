use std::fmt;

/// A location in the loaded content, from the whole bible down to one verse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scripture {
    Bible,
    Book(String),
    Chapter(String, u32),
    Verse(String, u32, u32),
    /// Verse of a book without chapters.
    ChapterlessVerse(String, u32),
}

impl fmt::Display for Scripture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scripture::Bible => f.write_str("Bible"),
            Scripture::Book(book) => write!(f, "{book}"),
            Scripture::Chapter(book, chapter) => write!(f, "{book} {chapter}"),
            Scripture::Verse(book, chapter, verse) => write!(f, "{book} {chapter}:{verse}"),
            Scripture::ChapterlessVerse(book, verse) => write!(f, "{book} {verse}"),
        }
    }
}
