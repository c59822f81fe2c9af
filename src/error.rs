use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of book processing at which a failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Decode,
    SummaryBoundary,
    ChapterSplit,
    ChapterlessBoundary,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Decode => "decode",
            Stage::SummaryBoundary => "summary-boundary",
            Stage::ChapterSplit => "chapter-split",
            Stage::ChapterlessBoundary => "chapterless-boundary",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// An expected structural pattern was not found; the parser does not guess.
    #[error("structural ambiguity at {stage}: {detail}")]
    StructuralAmbiguity { stage: Stage, detail: String },

    #[error("source entry {entry} could not be decoded: {detail}")]
    Undecodable { entry: String, detail: String },
}

impl ParseError {
    pub(crate) fn ambiguity(stage: Stage, detail: impl Into<String>) -> Self {
        Self::StructuralAmbiguity {
            stage,
            detail: detail.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::StructuralAmbiguity { stage, .. } => *stage,
            Self::Undecodable { .. } => Stage::Decode,
        }
    }
}
