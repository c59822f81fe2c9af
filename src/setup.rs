use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use regex::Regex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cli::SetupArgs;
use crate::config::SetupConfig;
use crate::error::{ParseError, Stage};
use crate::formats::{BookRecord, BookStatus, ChapterCount, ParsedBook, SetupReport};
use crate::parser;
use crate::source::{self, SourceEntry};
use crate::store::ContentStore;
use crate::validate;

pub async fn run(args: SetupArgs) -> anyhow::Result<()> {
    let config =
        SetupConfig::from_env().with_overrides(args.entry_pattern.as_deref(), args.jobs);
    let entry_pattern = Regex::new(&config.entry_pattern)
        .with_context(|| format!("compile entry pattern: {}", config.entry_pattern))?;
    let source_path = PathBuf::from(&args.source);
    let out_dir = PathBuf::from(&args.out);

    let entries = source::read_source(&source_path, &entry_pattern).context("read source")?;
    if entries.is_empty() {
        anyhow::bail!(
            "no book documents in {} matching {}",
            source_path.display(),
            config.entry_pattern
        );
    }
    let missing = source::missing_books(&entries);
    for name in &missing {
        tracing::warn!(book = name, "missing from source");
    }

    let store = ContentStore::create(&out_dir, args.force)?;

    tracing::info!(books = entries.len(), jobs = config.jobs, "setup: parse");
    let parsed = parse_all(entries, config.jobs).await?;

    tracing::info!(out = %out_dir.display(), "setup: write");
    let mut counts = Vec::new();
    let books: Vec<BookRecord> = parsed
        .into_iter()
        .map(|book| record_book(&store, book, &mut counts))
        .collect();
    store
        .write_chapter_counts(&counts)
        .context("write chapter counts")?;

    let report = SetupReport {
        generated_at: Utc::now().to_rfc3339(),
        source: args.source.clone(),
        books,
        missing: missing.iter().map(|name| (*name).to_owned()).collect(),
    };
    let report_path = store.write_report(&report).context("write setup report")?;

    let failed: Vec<String> = report
        .failed()
        .map(|record| match record.failed_stage {
            Some(stage) => format!("{} ({stage})", record.name),
            None => record.name.clone(),
        })
        .collect();
    tracing::info!(
        written = counts.len(),
        failed = failed.len(),
        missing = report.missing.len(),
        report = %report_path.display(),
        "setup finished"
    );

    if args.allow_partial {
        return Ok(());
    }
    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} books failed: {}",
            failed.len(),
            report.books.len(),
            failed.join(", ")
        );
    }
    if !report.missing.is_empty() {
        anyhow::bail!(
            "{} books missing from source: {}",
            report.missing.len(),
            report.missing.join(", ")
        );
    }

    Ok(())
}

#[derive(Debug)]
struct ParsedEntry {
    number: usize,
    name: &'static str,
    entry: String,
    sha256: String,
    result: Result<ParsedBook, ParseError>,
}

/// Parses books on blocking workers, at most `jobs` at a time.
async fn parse_all(entries: Vec<SourceEntry>, jobs: usize) -> anyhow::Result<Vec<ParsedEntry>> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for entry in entries {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .context("acquire parse slot")?;
        tasks.spawn_blocking(move || {
            let _permit = permit;
            parse_entry(entry)
        });
    }

    let mut parsed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        parsed.push(joined.context("parse task panicked")?);
    }
    parsed.sort_by_key(|book| book.number);
    Ok(parsed)
}

fn parse_entry(entry: SourceEntry) -> ParsedEntry {
    let span = tracing::debug_span!("book", name = entry.name);
    let _guard = span.enter();

    let result = entry
        .decode()
        .and_then(|text| parser::parse_book(&text));
    ParsedEntry {
        number: entry.number,
        name: entry.name,
        sha256: entry.sha256(),
        entry: entry.entry,
        result,
    }
}

fn record_book(
    store: &ContentStore,
    parsed: ParsedEntry,
    counts: &mut Vec<ChapterCount>,
) -> BookRecord {
    let mut record = BookRecord {
        index: parsed.number,
        name: parsed.name.to_owned(),
        entry: parsed.entry,
        source_sha256: parsed.sha256,
        status: BookStatus::Failed,
        shape: None,
        chapters: None,
        verses: None,
        output_path: None,
        issues: Vec::new(),
        failed_stage: None,
        error: None,
    };

    let book = match parsed.result {
        Ok(book) => book,
        Err(err) => {
            tracing::error!(book = parsed.name, stage = %err.stage(), "{err}");
            record.failed_stage = Some(err.stage());
            record.error = Some(err.to_string());
            return record;
        }
    };

    record.issues = validate::validate_book(&book);
    for issue in &record.issues {
        tracing::warn!(book = parsed.name, %issue, "needs manual check");
    }

    match store.write_book(parsed.name, &book) {
        Ok(path) => {
            tracing::info!(
                book = parsed.name,
                shape = ?book.shape(),
                chapters = book.chapter_count(),
                verses = book.verse_count(),
                "parsed"
            );
            counts.push(ChapterCount {
                book: parsed.name.to_owned(),
                count: book.chapter_count(),
            });
            record.status = BookStatus::Ok;
            record.shape = Some(book.shape());
            record.chapters = Some(book.chapter_count());
            record.verses = Some(book.verse_count());
            record.output_path = Some(path.to_string_lossy().to_string());
        }
        Err(err) => {
            tracing::error!(book = parsed.name, ?err, "write failed");
            record.failed_stage = Some(Stage::Write);
            record.error = Some(format!("{err:#}"));
        }
    }

    record
}
