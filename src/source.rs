use std::fs::File;
use std::io::Read as _;
use std::path::Path;

use anyhow::Context as _;
use regex::Regex;
use sha2::Digest as _;

use crate::error::ParseError;
use crate::{canon, rtf};

/// One book document found in the source, not yet decoded.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub number: usize,
    pub name: &'static str,
    pub entry: String,
    pub bytes: Vec<u8>,
}

impl SourceEntry {
    /// Book text with LF line endings. `.rtf` entries are converted to plain
    /// text first.
    pub fn decode(&self) -> Result<String, ParseError> {
        let text = std::str::from_utf8(&self.bytes).map_err(|err| ParseError::Undecodable {
            entry: self.entry.clone(),
            detail: err.to_string(),
        })?;
        if !self.is_rtf_entry() {
            return Ok(text.replace("\r\n", "\n"));
        }
        if !rtf::is_rtf(text) {
            return Err(ParseError::Undecodable {
                entry: self.entry.clone(),
                detail: "missing `{\\rtf` header".to_owned(),
            });
        }
        Ok(rtf::to_text(text).replace("\r\n", "\n"))
    }

    fn is_rtf_entry(&self) -> bool {
        Path::new(&self.entry)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("rtf"))
    }

    pub fn sha256(&self) -> String {
        hex::encode(sha2::Sha256::digest(&self.bytes))
    }
}

/// Reads book documents from an extracted directory or a zip archive.
///
/// Entries whose name does not match `entry_pattern` are skipped. The result is
/// sorted by canonical book number.
pub fn read_source(path: &Path, entry_pattern: &Regex) -> anyhow::Result<Vec<SourceEntry>> {
    let mut entries = if path.is_dir() {
        read_dir_entries(path, entry_pattern)?
    } else {
        read_zip_entries(path, entry_pattern)?
    };

    entries.sort_by_key(|entry| entry.number);
    for pair in entries.windows(2) {
        if pair[0].number == pair[1].number {
            anyhow::bail!(
                "source has two documents for {}: {} and {}",
                pair[0].name,
                pair[0].entry,
                pair[1].entry
            );
        }
    }

    tracing::info!(source = %path.display(), books = entries.len(), "read source");
    Ok(entries)
}

/// Canonical books with no document in `entries`.
pub fn missing_books(entries: &[SourceEntry]) -> Vec<&'static str> {
    canon::BOOK_NAMES
        .iter()
        .enumerate()
        .filter(|(i, _)| !entries.iter().any(|entry| entry.number == i + 1))
        .map(|(_, name)| *name)
        .collect()
}

fn read_dir_entries(dir: &Path, entry_pattern: &Regex) -> anyhow::Result<Vec<SourceEntry>> {
    let mut entries = Vec::new();
    for item in
        std::fs::read_dir(dir).with_context(|| format!("read source dir: {}", dir.display()))?
    {
        let item = item?;
        let path = item.path();
        if !path.is_file() {
            continue;
        }
        let file_name = item.file_name().to_string_lossy().to_string();
        let Some(number) = book_number_for(&file_name, entry_pattern)? else {
            continue;
        };
        let Some(name) = canonical_name(number, &file_name) else {
            continue;
        };
        let bytes =
            std::fs::read(&path).with_context(|| format!("read source file: {}", path.display()))?;
        entries.push(SourceEntry {
            number,
            name,
            entry: file_name,
            bytes,
        });
    }
    Ok(entries)
}

fn read_zip_entries(path: &Path, entry_pattern: &Regex) -> anyhow::Result<Vec<SourceEntry>> {
    let file =
        File::open(path).with_context(|| format!("open source archive: {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("read source archive: {}", path.display()))?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut zip_file = archive
            .by_index(i)
            .with_context(|| format!("read archive entry #{i}"))?;
        if zip_file.is_dir() {
            continue;
        }
        let entry_name = zip_file.name().to_owned();
        let Some(number) = book_number_for(&entry_name, entry_pattern)? else {
            continue;
        };
        let Some(name) = canonical_name(number, &entry_name) else {
            continue;
        };
        let mut bytes = Vec::new();
        zip_file
            .read_to_end(&mut bytes)
            .with_context(|| format!("extract archive entry: {entry_name}"))?;
        entries.push(SourceEntry {
            number,
            name,
            entry: entry_name,
            bytes,
        });
    }
    Ok(entries)
}

fn book_number_for(entry_name: &str, entry_pattern: &Regex) -> anyhow::Result<Option<usize>> {
    let Some(caps) = entry_pattern.captures(entry_name) else {
        tracing::debug!(entry = entry_name, "skipping non-book entry");
        return Ok(None);
    };
    let raw = caps
        .get(1)
        .ok_or_else(|| anyhow::anyhow!("entry pattern must capture the book number"))?
        .as_str();
    let number = raw
        .parse::<usize>()
        .with_context(|| format!("book number in entry {entry_name}: {raw}"))?;
    Ok(Some(number))
}

/// Canonical name for a book number; other numbered entries (foreword,
/// appendixes) are skipped with a warning.
fn canonical_name(number: usize, entry_name: &str) -> Option<&'static str> {
    let name = canon::book_name(number);
    if name.is_none() {
        tracing::warn!(entry = entry_name, number, "book number outside 1..=66; skipped");
    }
    name
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::config::DEFAULT_ENTRY_PATTERN;

    fn pattern() -> Regex {
        Regex::new(DEFAULT_ENTRY_PATTERN).expect("default pattern compiles")
    }

    #[test]
    fn reads_matching_files_from_a_directory() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::write(temp.path().join("nwt_65_Jude_E.txt"), "1\u{a0}Jude")?;
        std::fs::write(temp.path().join("nwt_01_Ge_E.txt"), "Chapter 1\r\n1\u{a0}Text")?;
        std::fs::write(temp.path().join("nwt_00_Foreword_E.txt"), "Foreword")?;
        std::fs::write(temp.path().join("nwt_67_Appendix_E.txt"), "Appendix")?;
        std::fs::write(temp.path().join("readme.txt"), "ignored")?;

        let entries = read_source(temp.path(), &pattern())?;
        let names: Vec<_> = entries.iter().map(|entry| entry.name).collect();
        assert_eq!(names, vec!["Genesis", "Jude"]);
        assert_eq!(entries[0].decode()?, "Chapter 1\n1\u{a0}Text");
        assert_eq!(missing_books(&entries).len(), 64);
        Ok(())
    }

    #[test]
    fn reads_matching_entries_from_a_zip() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let zip_path = temp.path().join("bible.zip");
        let mut writer = zip::ZipWriter::new(File::create(&zip_path)?);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("nwt_E/nwt_02_Ex_E.txt", options)?;
        writer.write_all("Chapter 1\n1\u{a0}Now".as_bytes())?;
        writer.start_file("nwt_E/appendix.txt", options)?;
        writer.write_all(b"appendix")?;
        writer.finish()?;

        let entries = read_source(&zip_path, &pattern())?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Exodus");
        assert_eq!(entries[0].entry, "nwt_E/nwt_02_Ex_E.txt");
        assert_eq!(entries[0].sha256().len(), 64);
        Ok(())
    }

    #[test]
    fn rtf_entries_are_converted_to_plain_text() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let zip_path = temp.path().join("nwt_E.rtf.zip");
        let mut writer = zip::ZipWriter::new(File::create(&zip_path)?);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("nwt_65_Jude_E.rtf", options)?;
        writer.write_all(
            b"{\\rtf1\\ansi{\\fonttbl{\\f0 Arial;}}\r\n\\pard JUDE\\par\r\n\
1\\~Jude, a slave.\\par\r\n2\\'a0To the called ones.\\par\r\n}",
        )?;
        writer.finish()?;

        let entries = read_source(&zip_path, &pattern())?;
        assert_eq!(entries.len(), 1);
        let text = entries[0].decode()?;
        assert_eq!(
            text,
            "JUDE\n1\u{a0}Jude, a slave.\n2\u{a0}To the called ones.\n"
        );
        assert_eq!(crate::parser::parse_book(&text)?.verse_count(), 2);
        Ok(())
    }

    #[test]
    fn rtf_entry_without_header_is_a_decode_failure() {
        let entry = SourceEntry {
            number: 57,
            name: "Philemon",
            entry: "nwt_57_Phm_E.rtf".to_owned(),
            bytes: b"Philemon\n1\xc2\xa0Paul".to_vec(),
        };
        let err = entry.decode().unwrap_err();
        assert_eq!(err.stage(), crate::error::Stage::Decode);
        assert!(err.to_string().contains("header"));
    }

    #[test]
    fn rejects_duplicate_book_numbers() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::write(temp.path().join("nwt_08_Ru_E.txt"), "a")?;
        std::fs::write(temp.path().join("nwt_08_Ruth_E.txt"), "b")?;

        let err = read_source(temp.path(), &pattern()).unwrap_err();
        assert!(err.to_string().contains("two documents for Ruth"));
        Ok(())
    }

    #[test]
    fn invalid_utf8_is_a_decode_failure() {
        let entry = SourceEntry {
            number: 31,
            name: "Obadiah",
            entry: "nwt_31_Ob_E.txt".to_owned(),
            bytes: vec![0xff, 0xfe, b'a'],
        };
        let err = entry.decode().unwrap_err();
        assert_eq!(err.stage(), crate::error::Stage::Decode);
    }
}
