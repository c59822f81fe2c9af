use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Stage;

/// Verse number to verse text. Serialized with stringified keys.
pub type VerseMap = BTreeMap<u32, String>;

/// Chapter number to its verses.
pub type ChapterMap = BTreeMap<u32, VerseMap>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedBook {
    Chaptered(ChapterMap),
    Chapterless(VerseMap),
}

// Buffered (untagged) content cannot turn string keys into integers, so the
// shape is decided on string-keyed nodes and the keys are parsed afterwards.
impl<'de> Deserialize<'de> for ParsedBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Node {
            Verse(String),
            Chapter(BTreeMap<String, String>),
        }

        // Only the form the writer produces: no sign, no leading zeros.
        fn number<E: serde::de::Error>(key: &str) -> Result<u32, E> {
            key.parse::<u32>()
                .ok()
                .filter(|number| number.to_string() == key)
                .ok_or_else(|| E::custom(format!("expected a plain number key, got {key:?}")))
        }

        let nodes = BTreeMap::<String, Node>::deserialize(deserializer)?;
        let chaptered = nodes.values().all(|node| matches!(node, Node::Chapter(_)));

        if chaptered {
            let mut chapters = ChapterMap::new();
            for (key, node) in nodes {
                let Node::Chapter(verses) = node else {
                    continue;
                };
                let verses = verses
                    .into_iter()
                    .map(|(num, text)| Ok((number::<D::Error>(&num)?, text)))
                    .collect::<Result<VerseMap, D::Error>>()?;
                chapters.insert(number::<D::Error>(&key)?, verses);
            }
            return Ok(ParsedBook::Chaptered(chapters));
        }

        let mut verses = VerseMap::new();
        for (key, node) in nodes {
            let Node::Verse(text) = node else {
                return Err(D::Error::custom(format!(
                    "book mixes chapters and verses at key {key:?}"
                )));
            };
            verses.insert(number::<D::Error>(&key)?, text);
        }
        Ok(ParsedBook::Chapterless(verses))
    }
}

impl ParsedBook {
    pub fn is_chaptered(&self) -> bool {
        matches!(self, ParsedBook::Chaptered(_))
    }

    pub fn shape(&self) -> BookShape {
        match self {
            ParsedBook::Chaptered(_) => BookShape::Chaptered,
            ParsedBook::Chapterless(_) => BookShape::Chapterless,
        }
    }

    /// Navigation depth for the content loader: chapterless books count as one.
    pub fn chapter_count(&self) -> usize {
        match self {
            ParsedBook::Chaptered(chapters) => chapters.len(),
            ParsedBook::Chapterless(_) => 1,
        }
    }

    pub fn verse_count(&self) -> usize {
        match self {
            ParsedBook::Chaptered(chapters) => chapters.values().map(BTreeMap::len).sum(),
            ParsedBook::Chapterless(verses) => verses.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookShape {
    Chaptered,
    Chapterless,
}

/// Structural problem found in a parsed book. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BookIssue {
    EmptyBook,
    EmptyVerseMap {
        #[serde(skip_serializing_if = "Option::is_none")]
        chapter: Option<u32>,
    },
    VerseGap {
        #[serde(skip_serializing_if = "Option::is_none")]
        chapter: Option<u32>,
        expected: u32,
        found: u32,
    },
    ChapterGap {
        expected: u32,
        found: u32,
    },
    ChapterCountMismatch {
        listed: usize,
        parsed: usize,
    },
}

impl std::fmt::Display for BookIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookIssue::EmptyBook => write!(f, "book has no chapters"),
            BookIssue::EmptyVerseMap { chapter: Some(c) } => write!(f, "chapter {c} has no verses"),
            BookIssue::EmptyVerseMap { chapter: None } => write!(f, "book has no verses"),
            BookIssue::VerseGap {
                chapter,
                expected,
                found,
            } => {
                if let Some(c) = chapter {
                    write!(f, "chapter {c}: expected verse {expected}, found {found}")
                } else {
                    write!(f, "expected verse {expected}, found {found}")
                }
            }
            BookIssue::ChapterGap { expected, found } => {
                write!(f, "expected chapter {expected}, found {found}")
            }
            BookIssue::ChapterCountMismatch { listed, parsed } => {
                write!(f, "chapter table lists {listed} chapters, book has {parsed}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    pub index: usize,
    pub name: String,
    pub entry: String,
    pub source_sha256: String,
    pub status: BookStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<BookShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verses: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<BookIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupReport {
    pub generated_at: String,
    pub source: String,
    pub books: Vec<BookRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl SetupReport {
    pub fn failed(&self) -> impl Iterator<Item = &BookRecord> {
        self.books
            .iter()
            .filter(|record| record.status == BookStatus::Failed)
    }
}

/// One row of the headerless `<book>,<count>` chapter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterCount {
    pub book: String,
    pub count: usize,
}
