use std::fs;
use std::io::Write as _;
use std::path::Path;

use predicates::prelude::*;
use versify::error::Stage;
use versify::formats::{BookIssue, BookStatus, ParsedBook, SetupReport};

const GENESIS: &str = "GENESIS\n\
Chapter 1\n\
Creation of the heavens and the earth\n\
Chapter 2\n\
God rests\n\
Chapter 1\n\
1\u{a0}In the beginning God created the heavens and the earth.\n\
2\u{a0}Now the earth was formless and desolate.\n\
Chapter 2\n\
1\u{a0}Thus the heavens and the earth were completed.\n";

const JUDE: &str = "JUDE\n\
\n\
1\u{a0}Jude, a slave of Jesus Christ.\n\
2\u{a0}May mercy and peace be increased to you.\n";

const OBADIAH: &str = "OBADIAH\nThe vision, see 2\u{a0}below\n";

fn write_source(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join("nwt_01_Ge_E.txt"), GENESIS)?;
    fs::write(dir.join("nwt_65_Jude_E.txt"), JUDE)?;
    fs::write(dir.join("nwt_31_Ob_E.txt"), OBADIAH)?;
    fs::write(dir.join("readme.txt"), "not a book")?;
    Ok(())
}

#[test]
fn setup_writes_books_counts_and_report() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let source = temp.path().join("source");
    let out = temp.path().join("content");
    write_source(&source)?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "setup",
        "--source",
        source.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--jobs",
        "2",
        "--allow-partial",
    ])
    .assert()
    .success();

    let genesis: ParsedBook = serde_json::from_str(&fs::read_to_string(out.join("Genesis.json"))?)?;
    let ParsedBook::Chaptered(chapters) = &genesis else {
        panic!("Genesis should have chapters");
    };
    assert_eq!(chapters.len(), 2);
    assert_eq!(
        chapters[&1][&1],
        "In the beginning God created the heavens and the earth."
    );
    assert!(!chapters[&2].values().any(|text| text.contains("God rests")));

    let jude = fs::read_to_string(out.join("Jude.json"))?;
    assert!(jude.contains(r#""1":"Jude, a slave of Jesus Christ.""#));
    assert!(!out.join("Obadiah.json").exists());

    let counts = fs::read_to_string(out.join("chapter_counts.csv"))?;
    assert_eq!(counts, "Genesis,2\nJude,1\n");

    let report: SetupReport =
        serde_json::from_str(&fs::read_to_string(out.join("setup-report.json"))?)?;
    assert_eq!(report.books.len(), 3);
    let obadiah = report
        .books
        .iter()
        .find(|record| record.name == "Obadiah")
        .expect("Obadiah record");
    assert_eq!(obadiah.status, BookStatus::Failed);
    assert_eq!(obadiah.failed_stage, Some(Stage::ChapterlessBoundary));
    assert_eq!(report.missing.len(), 63);
    assert!(report.missing.iter().any(|name| name == "Exodus"));
    Ok(())
}

#[test]
fn setup_fails_on_unparsable_book_without_allow_partial() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let source = temp.path().join("source");
    let out = temp.path().join("content");
    write_source(&source)?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "setup",
        "--source",
        source.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Obadiah (chapterless-boundary)"));

    assert!(out.join("setup-report.json").exists());
    Ok(())
}

#[test]
fn setup_refuses_existing_output_without_force() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let source = temp.path().join("source");
    let out = temp.path().join("content");
    write_source(&source)?;
    fs::create_dir_all(&out)?;
    fs::write(out.join("keep.txt"), "existing")?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "setup",
        "--source",
        source.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--allow-partial",
    ])
    .assert()
    .failure();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "setup",
        "--source",
        source.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--allow-partial",
        "--force",
    ])
    .assert()
    .success();

    assert!(out.join("Genesis.json").exists());
    Ok(())
}

#[test]
fn check_and_show_read_setup_output() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let source = temp.path().join("source");
    let out = temp.path().join("content");
    write_source(&source)?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "setup",
        "--source",
        source.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--allow-partial",
    ])
    .assert()
    .success();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args(["check", "--dir", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 2 books"))
        .stderr(predicate::str::contains("not written by setup"));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "show",
        "--dir",
        out.to_str().unwrap(),
        "--book",
        "genesis",
        "--chapter",
        "1",
        "--verse",
        "2",
    ])
    .assert()
    .success()
    .stdout("Genesis 1:2\nNow the earth was formless and desolate.\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "show",
        "--dir",
        out.to_str().unwrap(),
        "--book",
        "Jude",
        "--verse",
        "2",
    ])
    .assert()
    .success()
    .stdout("Jude 2\nMay mercy and peace be increased to you.\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args(["show", "--dir", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout("Genesis\nJude\n");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "show",
        "--dir",
        out.to_str().unwrap(),
        "--book",
        "Genesis",
        "--chapter",
        "9",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no content at Genesis 9"));
    Ok(())
}

#[test]
fn check_reports_chapter_count_mismatch() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let source = temp.path().join("source");
    let out = temp.path().join("content");
    write_source(&source)?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "setup",
        "--source",
        source.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--allow-partial",
    ])
    .assert()
    .success();
    fs::write(out.join("chapter_counts.csv"), "Genesis,50\nJude,1\n")?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args(["check", "--dir", out.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Genesis: chapter table lists 50 chapters, book has 2",
        ));
    Ok(())
}

#[test]
fn dropped_chapter_is_reported_as_a_chapter_gap() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let source = temp.path().join("source");
    let out = temp.path().join("content");
    fs::create_dir_all(&source)?;
    fs::write(
        source.join("nwt_02_Ex_E.txt"),
        "EXODUS\nChapter 1\n1\u{a0}Now these are the names.\n\
Chapter 3\n1\u{a0}Moses became a shepherd.\n",
    )?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "setup",
        "--source",
        source.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--allow-partial",
    ])
    .assert()
    .success();

    let report: SetupReport =
        serde_json::from_str(&fs::read_to_string(out.join("setup-report.json"))?)?;
    let exodus = &report.books[0];
    assert_eq!(exodus.name, "Exodus");
    assert_eq!(exodus.status, BookStatus::Ok);
    assert_eq!(
        exodus.issues,
        vec![BookIssue::ChapterGap {
            expected: 2,
            found: 3
        }]
    );
    assert!(
        fs::read_to_string(out.join("setup-report.json"))?.contains(r#""kind": "chapter-gap""#)
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args(["check", "--dir", out.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Exodus: expected chapter 2, found 3"));
    Ok(())
}

#[test]
fn setup_reads_rtf_books_from_an_archive() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let archive = temp.path().join("nwt_E.rtf.zip");
    let out = temp.path().join("content");

    let mut writer = zip::ZipWriter::new(fs::File::create(&archive)?);
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("nwt_E/nwt_00_Foreword_E.rtf", options)?;
    writer.write_all(br"{\rtf1 Foreword\par}")?;
    writer.start_file("nwt_E/nwt_65_Jude_E.rtf", options)?;
    writer.write_all(
        br"{\rtf1\ansi{\fonttbl{\f0 Arial;}}\pard JUDE\par 1\~Jude, a slave.\par 2\'a0To the called ones.\par}",
    )?;
    writer.finish()?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("versify");
    cmd.args([
        "setup",
        "--source",
        archive.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--allow-partial",
    ])
    .assert()
    .success();

    let jude: ParsedBook = serde_json::from_str(&fs::read_to_string(out.join("Jude.json"))?)?;
    let ParsedBook::Chapterless(verses) = jude else {
        panic!("Jude should be chapterless");
    };
    assert_eq!(verses[&1], "Jude, a slave.");
    assert_eq!(verses[&2], "To the called ones.");
    Ok(())
}
