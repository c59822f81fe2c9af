use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli::ConvertArgs;
use crate::{parser, validate};

pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let input = PathBuf::from(&args.input);
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("read book document: {}", input.display()))?;
    let raw = raw.replace("\r\n", "\n");

    let book = parser::parse_book(&raw).with_context(|| format!("parse {}", input.display()))?;
    for issue in validate::validate_book(&book) {
        tracing::warn!(input = %input.display(), %issue, "needs manual check");
    }
    tracing::info!(
        shape = ?book.shape(),
        chapters = book.chapter_count(),
        verses = book.verse_count(),
        "converted"
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&book)
    } else {
        serde_json::to_string(&book)
    }
    .context("serialize book")?;

    match args.out.as_deref() {
        Some(out) => {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(out)
                .with_context(|| format!("open output: {out}"))?;
            writeln!(file, "{json}").with_context(|| format!("write output: {out}"))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("write stdout")?;
        }
    }

    Ok(())
}
