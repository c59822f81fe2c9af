use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli::CheckArgs;
use crate::formats::BookIssue;
use crate::store::{ContentStore, REPORT_FILE};
use crate::{canon, validate};

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let store = ContentStore::open(&PathBuf::from(&args.dir))?;
    let counts = store.read_chapter_counts().context("read chapter count table")?;

    if store.dir().join(REPORT_FILE).exists() {
        let report = store.read_report()?;
        for record in report.failed() {
            tracing::warn!(
                book = %record.name,
                stage = ?record.failed_stage,
                "not written by setup"
            );
        }
        if !report.missing.is_empty() {
            tracing::warn!(missing = report.missing.len(), "books missing from setup source");
        }
    }

    let mut problems = 0usize;
    let mut stdout = std::io::stdout().lock();
    for count in &counts {
        if canon::book_number(&count.book).is_none() {
            tracing::warn!(book = %count.book, "not a canonical book name");
        }
        let book = store
            .read_book(&count.book)
            .with_context(|| format!("load {}", count.book))?;

        let mut issues = validate::validate_book(&book);
        if book.chapter_count() != count.count {
            issues.push(BookIssue::ChapterCountMismatch {
                listed: count.count,
                parsed: book.chapter_count(),
            });
        }

        for issue in &issues {
            writeln!(stdout, "{}: {issue}", count.book).context("write stdout")?;
        }
        problems += issues.len();
    }

    tracing::info!(books = counts.len(), problems, "check finished");
    if problems > 0 {
        anyhow::bail!("{problems} problems in {} books", counts.len());
    }
    writeln!(stdout, "ok: {} books", counts.len()).context("write stdout")?;
    Ok(())
}
