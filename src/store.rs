//! Written content: one JSON file per book plus the chapter count table.
//!
//! `ContentStore` owns the output directory. `Bible` is the loaded, read-only
//! view that callers pass around explicitly.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::canon;
use crate::formats::{ChapterCount, ParsedBook, SetupReport, VerseMap};
use crate::scripture::Scripture;

pub const CHAPTER_COUNTS_FILE: &str = "chapter_counts.csv";
pub const REPORT_FILE: &str = "setup-report.json";

#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    /// Creates the output directory. An existing directory is refused unless `force`.
    pub fn create(dir: &Path, force: bool) -> anyhow::Result<Self> {
        if dir.exists() && !force {
            anyhow::bail!("content output directory already exists: {}", dir.display());
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create content dir: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("content directory does not exist: {}", dir.display());
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Writes `<name>.json` through a temp file so readers never see a partial book.
    pub fn write_book(&self, name: &str, book: &ParsedBook) -> anyhow::Result<PathBuf> {
        let path = self.book_path(name);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("create temp file in {}", self.dir.display()))?;
        serde_json::to_writer(&mut tmp, book).with_context(|| format!("serialize {name}"))?;
        tmp.flush().with_context(|| format!("flush {name}"))?;
        tmp.persist(&path)
            .with_context(|| format!("write book: {}", path.display()))?;
        Ok(path)
    }

    pub fn read_book(&self, name: &str) -> anyhow::Result<ParsedBook> {
        let path = self.book_path(name);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("read book: {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse book: {}", path.display()))
    }

    /// Writes the headerless `<book>,<count>` table in the order given.
    pub fn write_chapter_counts(&self, counts: &[ChapterCount]) -> anyhow::Result<PathBuf> {
        let path = self.dir.join(CHAPTER_COUNTS_FILE);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("open chapter counts: {}", path.display()))?;
        for count in counts {
            writer
                .serialize(count)
                .with_context(|| format!("write chapter counts: {}", path.display()))?;
        }
        writer.flush().context("flush chapter counts")?;
        Ok(path)
    }

    pub fn read_chapter_counts(&self) -> anyhow::Result<Vec<ChapterCount>> {
        let path = self.dir.join(CHAPTER_COUNTS_FILE);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(&path)
            .with_context(|| format!("read chapter counts: {}", path.display()))?;

        let mut counts = Vec::new();
        for (i, row) in reader.deserialize::<ChapterCount>().enumerate() {
            let count = row.with_context(|| format!("{} row {}", path.display(), i + 1))?;
            counts.push(count);
        }
        Ok(counts)
    }

    pub fn write_report(&self, report: &SetupReport) -> anyhow::Result<PathBuf> {
        let path = self.dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(report).context("serialize setup report")?;
        std::fs::write(&path, format!("{json}\n"))
            .with_context(|| format!("write setup report: {}", path.display()))?;
        Ok(path)
    }

    pub fn read_report(&self) -> anyhow::Result<SetupReport> {
        let path = self.dir.join(REPORT_FILE);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("read setup report: {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse setup report: {}", path.display()))
    }

    /// Loads the books listed in the chapter count table, or every canonical
    /// book with a file when there is no table.
    pub fn load_bible(&self) -> anyhow::Result<Bible> {
        let names: Vec<String> = if self.dir.join(CHAPTER_COUNTS_FILE).exists() {
            self.read_chapter_counts()?
                .into_iter()
                .map(|count| count.book)
                .collect()
        } else {
            canon::BOOK_NAMES
                .iter()
                .filter(|name| self.book_path(name).exists())
                .map(|name| (*name).to_owned())
                .collect()
        };

        let mut books = Vec::with_capacity(names.len());
        for name in names {
            let book = self.read_book(&name)?;
            books.push((name, book));
        }
        tracing::debug!(books = books.len(), dir = %self.dir.display(), "loaded content");
        Ok(Bible::new(books))
    }
}

/// Content at the finest scope of a `Scripture`.
#[derive(Debug, Clone, PartialEq)]
pub enum Content<'a> {
    Bible(Vec<&'a str>),
    Book(&'a ParsedBook),
    Chapter(&'a VerseMap),
    Verse(&'a str),
}

/// Loaded books in canonical order.
#[derive(Debug, Clone, Default)]
pub struct Bible {
    books: Vec<(String, ParsedBook)>,
}

impl Bible {
    pub fn new(books: Vec<(String, ParsedBook)>) -> Self {
        Self { books }
    }

    pub fn book_names(&self) -> impl Iterator<Item = &str> {
        self.books.iter().map(|(name, _)| name.as_str())
    }

    fn entry(&self, name: &str) -> Option<&(String, ParsedBook)> {
        let name = name.trim();
        self.books
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
    }

    pub fn book(&self, name: &str) -> Option<&ParsedBook> {
        self.entry(name).map(|(_, book)| book)
    }

    pub fn chapter_count(&self, name: &str) -> Option<usize> {
        self.book(name).map(ParsedBook::chapter_count)
    }

    /// Builds a reference from loose parts, using the book's shape to decide
    /// whether a lone number is a chapter or a verse.
    pub fn resolve(
        &self,
        book: Option<&str>,
        chapter: Option<u32>,
        verse: Option<u32>,
    ) -> anyhow::Result<Scripture> {
        let Some(book) = book else {
            if chapter.is_some() || verse.is_some() {
                anyhow::bail!("a chapter or verse needs a book");
            }
            return Ok(Scripture::Bible);
        };
        let (name, parsed) = self
            .entry(book)
            .ok_or_else(|| anyhow::anyhow!("unknown book: {book}"))?;
        let name = name.clone();

        let scripture = match (parsed.is_chaptered(), chapter, verse) {
            (_, None, None) => Scripture::Book(name),
            (true, Some(c), None) => Scripture::Chapter(name, c),
            (true, Some(c), Some(v)) => Scripture::Verse(name, c, v),
            (true, None, Some(_)) => anyhow::bail!("{name} has chapters; give a chapter"),
            (false, None | Some(1), Some(v)) => Scripture::ChapterlessVerse(name, v),
            (false, Some(1), None) => Scripture::Book(name),
            (false, Some(c), _) => anyhow::bail!("{name} has no chapter {c}"),
        };
        Ok(scripture)
    }

    pub fn content(&self, scripture: &Scripture) -> Option<Content<'_>> {
        match scripture {
            Scripture::Bible => Some(Content::Bible(self.book_names().collect())),
            Scripture::Book(name) => self.book(name).map(Content::Book),
            Scripture::Chapter(name, chapter) => match self.book(name)? {
                ParsedBook::Chaptered(chapters) => chapters.get(chapter).map(Content::Chapter),
                ParsedBook::Chapterless(_) => None,
            },
            Scripture::Verse(name, chapter, verse) => match self.book(name)? {
                ParsedBook::Chaptered(chapters) => chapters
                    .get(chapter)?
                    .get(verse)
                    .map(|text| Content::Verse(text)),
                ParsedBook::Chapterless(_) => None,
            },
            Scripture::ChapterlessVerse(name, verse) => match self.book(name)? {
                ParsedBook::Chapterless(verses) => verses.get(verse).map(|text| Content::Verse(text)),
                ParsedBook::Chaptered(_) => None,
            },
        }
    }

    /// Every verse inside `scope`, in reading order.
    pub fn verses_in(&self, scope: &Scripture) -> Vec<(Scripture, &str)> {
        match scope {
            Scripture::Bible => self
                .books
                .iter()
                .flat_map(|(name, book)| book_verses(name, book))
                .collect(),
            Scripture::Book(name) => self
                .entry(name)
                .map(|(name, book)| book_verses(name, book))
                .unwrap_or_default(),
            Scripture::Chapter(name, chapter) => match self.entry(name) {
                Some((name, ParsedBook::Chaptered(chapters))) => chapters
                    .get(chapter)
                    .map(|verses| chapter_verses(name, *chapter, verses))
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
            Scripture::Verse(..) | Scripture::ChapterlessVerse(..) => match self.content(scope) {
                Some(Content::Verse(text)) => vec![(scope.clone(), text)],
                _ => Vec::new(),
            },
        }
    }
}

fn book_verses<'a>(name: &str, book: &'a ParsedBook) -> Vec<(Scripture, &'a str)> {
    match book {
        ParsedBook::Chaptered(chapters) => chapters
            .iter()
            .flat_map(|(chapter, verses)| chapter_verses(name, *chapter, verses))
            .collect(),
        ParsedBook::Chapterless(verses) => verses
            .iter()
            .map(|(verse, text)| {
                (
                    Scripture::ChapterlessVerse(name.to_owned(), *verse),
                    text.as_str(),
                )
            })
            .collect(),
    }
}

fn chapter_verses<'a>(name: &str, chapter: u32, verses: &'a VerseMap) -> Vec<(Scripture, &'a str)> {
    verses
        .iter()
        .map(|(verse, text)| {
            (
                Scripture::Verse(name.to_owned(), chapter, *verse),
                text.as_str(),
            )
        })
        .collect()
}
