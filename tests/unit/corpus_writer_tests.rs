/*!
 * Tests for clip, transcript and annotation output
 */

use anyhow::Result;
use std::fs;
use smilcorpus::corpus_writer::CorpusWriter;
use smilcorpus::errors::CorpusError;
use smilcorpus::extractor::{Interval, Track, Tracks};
use crate::common;

fn track_with(name: &str, count: usize) -> Track {
    let mut track = Track::new(name);
    for i in 0..count {
        let start = i as f64 * 0.5;
        track.push(Interval::new(start, start + 0.25, format!("  Sentence {}  ", i)).unwrap());
    }
    track
}

/// Test that N intervals yield N clips and N transcripts, index aligned
#[test]
fn test_writeTrack_withTenIntervals_shouldAlignClipsAndTranscripts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wave_dir = temp_dir.path().join("Wave");
    let align_dir = temp_dir.path().join("Align");
    common::write_ramp_wav(&wave_dir.join("book.wav"), 6.0)?;

    let track = track_with("book", 10);
    let output = CorpusWriter::new(&wave_dir, &align_dir).write_track(&track)?;

    assert_eq!(output.intervals, 10);
    assert_eq!(output.clips.len(), 10);
    assert_eq!(output.transcripts.len(), 10);

    let expected: Vec<String> = (0..10).map(|i| format!("book_{}.txt", i)).collect();
    assert_eq!(common::file_names(&align_dir.join("book/text"))?, expected);

    for (i, interval) in track.intervals().iter().enumerate() {
        let transcript = fs::read_to_string(&output.transcripts[i])?;
        assert_eq!(transcript, interval.text.trim());

        let clip_name = output.clips[i].file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(clip_name, format!("book_{}.wav", i));
    }
    Ok(())
}

/// Test that an eleven-interval track pads indices to two digits
#[test]
fn test_writeTrack_withElevenIntervals_shouldPadToTwoDigits() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wave_dir = temp_dir.path().join("Wave");
    let align_dir = temp_dir.path().join("Align");
    common::write_ramp_wav(&wave_dir.join("book.wav"), 6.0)?;

    CorpusWriter::new(&wave_dir, &align_dir).write_track(&track_with("book", 11))?;

    let names = common::file_names(&align_dir.join("book/wav"))?;
    assert_eq!(names.first().map(String::as_str), Some("book_00.wav"));
    assert_eq!(names.last().map(String::as_str), Some("book_10.wav"));
    assert_eq!(names.len(), 11);
    Ok(())
}

/// Test that a single-interval track uses an unpadded index
#[test]
fn test_writeTrack_withOneInterval_shouldUseSingleDigit() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wave_dir = temp_dir.path().join("Wave");
    let align_dir = temp_dir.path().join("Align");
    common::write_ramp_wav(&wave_dir.join("solo.wav"), 1.0)?;

    CorpusWriter::new(&wave_dir, &align_dir).write_track(&track_with("solo", 1))?;

    assert_eq!(common::file_names(&align_dir.join("solo/text"))?, vec!["solo_0.txt"]);
    Ok(())
}

/// Test that clip boundaries land on the sample grid of the source waveform
#[test]
fn test_writeTrack_shouldSliceAtIntervalBoundaries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wave_dir = temp_dir.path().join("Wave");
    let align_dir = temp_dir.path().join("Align");
    common::write_ramp_wav(&wave_dir.join("page1.wav"), 3.0)?;

    let mut track = Track::new("page1");
    track.push(Interval::new(1.0, 2.5, "Hello world".to_string()).unwrap());
    // Sub-sample start truncates down to frame 8000
    track.push(Interval::new(0.50003, 0.625, "Short".to_string()).unwrap());

    let output = CorpusWriter::new(&wave_dir, &align_dir).write_track(&track)?;

    let first = common::read_wav_samples(&output.clips[0])?;
    assert_eq!(first.len(), 24_000);
    assert_eq!(first[0], 16_000);
    assert_eq!(*first.last().unwrap(), ((40_000 - 1) % 30_000) as i16);

    let second = common::read_wav_samples(&output.clips[1])?;
    assert_eq!(second[0], 8_000);
    assert_eq!(second.len(), 10_000 - 8_000);

    let spec = hound::WavReader::open(&output.clips[0])?.spec();
    assert_eq!(spec.sample_rate, common::TEST_SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    Ok(())
}

/// Test that intervals past the end of the audio still produce a (short) clip
#[test]
fn test_writeTrack_withIntervalPastEnd_shouldClampClip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wave_dir = temp_dir.path().join("Wave");
    let align_dir = temp_dir.path().join("Align");
    common::write_ramp_wav(&wave_dir.join("page1.wav"), 1.0)?;

    let mut track = Track::new("page1");
    track.push(Interval::new(0.5, 4.0, "Runs long".to_string()).unwrap());
    track.push(Interval::new(2.0, 3.0, "Beyond".to_string()).unwrap());

    let output = CorpusWriter::new(&wave_dir, &align_dir).write_track(&track)?;

    assert_eq!(common::read_wav_samples(&output.clips[0])?.len(), 8_000);
    assert!(common::read_wav_samples(&output.clips[1])?.is_empty());
    assert_eq!(output.transcripts.len(), 2);
    Ok(())
}

/// Test that the annotation holds one 'sentences' tier in track order
#[test]
fn test_writeTrack_shouldWriteSentenceTextGrid() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wave_dir = temp_dir.path().join("Wave");
    let align_dir = temp_dir.path().join("Align");
    common::write_ramp_wav(&wave_dir.join("page1.wav"), 5.0)?;

    let mut track = Track::new("page1");
    track.push(Interval::new(3.0, 4.0, "Later".to_string()).unwrap());
    track.push(Interval::new(1.0, 2.0, "Earlier".to_string()).unwrap());

    let output = CorpusWriter::new(&wave_dir, &align_dir).write_track(&track)?;
    assert_eq!(output.grid_path, align_dir.join("page1/page1.TextGrid"));

    let grid = fs::read_to_string(&output.grid_path)?;
    assert!(grid.contains("name = \"sentences\""));
    assert!(grid.contains("intervals: size = 3"));
    let later = grid.find("\"Later\"").unwrap();
    let earlier = grid.find("\"Earlier\"").unwrap();
    assert!(later < earlier, "tier must keep track order");
    Ok(())
}

/// Test that a missing waveform aborts with an I/O error, keeping earlier tracks
#[test]
fn test_writeAll_withMissingWaveform_shouldKeepCompletedTracks() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let wave_dir = temp_dir.path().join("Wave");
    let align_dir = temp_dir.path().join("Align");
    common::write_ramp_wav(&wave_dir.join("a_page.wav"), 6.0)?;

    let mut tracks = Tracks::new();
    tracks.insert("a_page".to_string(), track_with("a_page", 3));
    tracks.insert("b_page".to_string(), track_with("b_page", 3));

    let err = CorpusWriter::new(&wave_dir, &align_dir)
        .write_all(&tracks, |_| {})
        .unwrap_err();

    assert!(matches!(err, CorpusError::Io { .. }));
    assert_eq!(common::file_names(&align_dir.join("a_page/wav"))?.len(), 3);
    Ok(())
}
