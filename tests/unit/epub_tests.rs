/*!
 * Tests for EPUB container extraction
 */

use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;
use smilcorpus::epub;
use smilcorpus::errors::CorpusError;
use crate::common;

fn write_epub(path: &Path, members: &[(&str, &str)]) -> Result<()> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default();
    zip.add_directory("OEBPS/Text/", options)?;
    for (name, content) in members {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

/// Test that only content members are extracted, without the prefix
#[test]
fn test_extractContent_withBookLayout_shouldStripContentPrefix() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let epub_path = temp_dir.path().join("book.epub");
    write_epub(
        &epub_path,
        &[
            ("mimetype", "application/epub+zip"),
            ("META-INF/container.xml", "<container/>"),
            ("OEBPS/content.opf", "<package/>"),
            ("OEBPS/Text/page1.xhtml", "<html/>"),
            ("OEBPS/Audio/page1.mp3", "mp3"),
        ],
    )?;

    let out = temp_dir.path().join("out");
    let count = epub::extract_content(&epub_path, &out)?;

    assert_eq!(count, 3);
    assert_eq!(fs::read_to_string(out.join("Text/page1.xhtml"))?, "<html/>");
    assert!(out.join("Audio/page1.mp3").is_file());
    assert!(!out.join("mimetype").exists());
    assert!(!out.join("META-INF").exists());
    Ok(())
}

/// Test that existing destinations are left untouched
#[test]
fn test_extractContent_withExistingFile_shouldSkipIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let epub_path = temp_dir.path().join("book.epub");
    write_epub(&epub_path, &[("OEBPS/Text/page1.xhtml", "<html/>")])?;

    let out = temp_dir.path().join("out");
    common::create_test_file(&out, "Text/page1.xhtml", "edited")?;

    let count = epub::extract_content(&epub_path, &out)?;
    assert_eq!(count, 0);
    assert_eq!(fs::read_to_string(out.join("Text/page1.xhtml"))?, "edited");
    Ok(())
}

/// Test that a file that is not a zip container reports an archive error
#[test]
fn test_extractContent_withInvalidContainer_shouldReportArchiveError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let epub_path = common::create_test_file(temp_dir.path(), "book.epub", "not a zip")?;

    let err = epub::extract_content(&epub_path, temp_dir.path().join("out")).unwrap_err();
    assert!(matches!(err, CorpusError::Archive { .. }));
    Ok(())
}
