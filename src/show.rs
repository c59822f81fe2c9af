use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli::ShowArgs;
use crate::store::{Content, ContentStore};

pub fn run(args: ShowArgs) -> anyhow::Result<()> {
    let store = ContentStore::open(&PathBuf::from(&args.dir))?;
    let bible = store.load_bible().context("load content")?;

    let scripture = bible.resolve(args.book.as_deref(), args.chapter, args.verse)?;
    let content = bible
        .content(&scripture)
        .ok_or_else(|| anyhow::anyhow!("no content at {scripture}"))?;
    tracing::debug!(%scripture, "show");

    let rendered = match content {
        Content::Bible(names) => names.join("\n"),
        Content::Book(book) => serde_json::to_string_pretty(book).context("serialize book")?,
        Content::Chapter(verses) => {
            serde_json::to_string_pretty(verses).context("serialize chapter")?
        }
        Content::Verse(text) => format!("{scripture}\n{text}"),
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}").context("write stdout")?;
    Ok(())
}
