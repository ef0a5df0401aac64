/*!
 * Common test utilities for the smilcorpus test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use smilcorpus::errors::CorpusResult;
use smilcorpus::transcoder::AudioEncoder;

pub const TEST_SAMPLE_RATE: u32 = 16_000;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// One `<par>`: anchor id, clipBegin, clipEnd
pub type ParSpec<'a> = (&'a str, &'a str, &'a str);

/// SMIL timing document referencing `text_file` and `audio_src`
pub fn smil_document(text_file: &str, audio_src: &str, pars: &[ParSpec]) -> String {
    let mut body = String::new();
    for (idx, (id, begin, end)) in pars.iter().enumerate() {
        body.push_str(&format!(
            r#"      <par id="par{idx}">
        <text src="{text_file}#{id}"/>
        <audio src="{audio_src}" clipBegin="{begin}" clipEnd="{end}"/>
      </par>
"#
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<smil xmlns="http://www.w3.org/ns/SMIL" xmlns:epub="http://www.idpf.org/2007/ops" version="3.0">
  <body>
    <seq id="seq1" epub:textref="{text_file}" epub:type="bodymatter">
{body}    </seq>
  </body>
</smil>
"#
    )
}

/// XHTML page with one `<span id=..>` per anchor
pub fn xhtml_document(spans: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (id, text) in spans {
        body.push_str(&format!("    <p><span id=\"{id}\">{text}</span></p>\n"));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
  <head><title>Page</title></head>
  <body>
{body}  </body>
</html>
"#
    )
}

/// Writes `<page>.xhtml` and `<page>.xhtml.smil` into `text_dir`
pub fn write_page(text_dir: &Path, page: &str, audio_name: &str, pars: &[ParSpec], spans: &[(&str, &str)]) -> Result<PathBuf> {
    let text_file = format!("{page}.xhtml");
    let audio_src = format!("../Audio/{audio_name}.mp3");
    create_test_file(text_dir, &text_file, &xhtml_document(spans))?;
    create_test_file(text_dir, &format!("{text_file}.smil"), &smil_document(&text_file, &audio_src, pars))
}

/// Writes a mono 16-bit WAV whose sample `n` has the value `n % 30000`
pub fn write_ramp_wav(path: &Path, seconds: f64) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: TEST_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    let frames = (seconds * TEST_SAMPLE_RATE as f64) as usize;
    for n in 0..frames {
        writer.write_sample((n % 30_000) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Reads every sample of a WAV file
pub fn read_wav_samples(path: &Path) -> Result<Vec<i16>> {
    let mut reader = hound::WavReader::open(path)?;
    let samples = reader.samples::<i16>().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(samples)
}

/// Sorted file names in a directory
pub fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    names.sort();
    Ok(names)
}

/// Whether an ffmpeg binary can be started
pub fn ffmpeg_available() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Encoder standing in for ffmpeg: records calls and writes a ten-second ramp
#[derive(Default)]
pub struct RecordingEncoder {
    pub calls: RefCell<Vec<PathBuf>>,
}

impl RecordingEncoder {
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl AudioEncoder for RecordingEncoder {
    fn encode(&self, source: &Path, dest: &Path) -> CorpusResult<()> {
        self.calls.borrow_mut().push(source.to_path_buf());
        write_ramp_wav(dest, 10.0).map_err(|e| smilcorpus::CorpusError::audio(dest, e.to_string()))
    }
}

/// Encoder that always fails like a non-zero ffmpeg exit
pub struct FailingEncoder;

impl AudioEncoder for FailingEncoder {
    fn encode(&self, source: &Path, _dest: &Path) -> CorpusResult<()> {
        Err(smilcorpus::CorpusError::ExternalTool {
            tool: "ffmpeg".to_string(),
            path: source.to_path_buf(),
            status: "exit status: 1".to_string(),
            stderr: "Invalid data found when processing input".to_string(),
        })
    }
}

/// Encoder that writes a truncated file and then fails, like an interrupted ffmpeg
pub struct TruncatingEncoder;

impl AudioEncoder for TruncatingEncoder {
    fn encode(&self, source: &Path, dest: &Path) -> CorpusResult<()> {
        fs::write(dest, b"RIFF").map_err(|e| smilcorpus::CorpusError::io(dest, e))?;
        Err(smilcorpus::CorpusError::ExternalTool {
            tool: "ffmpeg".to_string(),
            path: source.to_path_buf(),
            status: "signal: 2 (SIGINT)".to_string(),
            stderr: "Exiting normally, received signal 2.".to_string(),
        })
    }
}
