use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::errors::{CorpusError, CorpusResult};
use crate::extractor::{Track, Tracks};
use crate::file_utils::FileManager;
use crate::textgrid::TextGrid;

// @module: Per-track corpus output (annotation, clips, transcripts)

// @const: Subdirectory names inside a track directory
pub const WAV_SUBDIR: &str = "wav";
pub const TEXT_SUBDIR: &str = "text";

/// Digits needed to zero-pad clip indices of a track with `count` intervals.
///
/// Equals `ceil(log10(count))`, so a one-interval track gets an unpadded index
/// and a ten-interval track keeps single digits `0..9`.
pub fn index_width(count: usize) -> usize {
    let mut width = 0;
    let mut capacity: usize = 1;
    while capacity < count {
        capacity = capacity.saturating_mul(10);
        width += 1;
    }
    width
}

/// `<name>_<index>` with the index padded to `width` digits
pub fn clip_stem(name: &str, index: usize, width: usize) -> String {
    format!("{}_{:0width$}", name, index, width = width)
}

/// Files written for one track
#[derive(Debug, Clone, Default)]
pub struct TrackOutput {
    pub name: String,
    pub grid_path: PathBuf,
    pub intervals: usize,
    pub clips: Vec<PathBuf>,
    pub transcripts: Vec<PathBuf>,
}

/// In-memory waveform of one transcoded track
struct Waveform {
    spec: WavSpec,
    samples: Vec<i32>,
}

impl Waveform {
    fn load(path: &Path) -> CorpusResult<Self> {
        let reader = WavReader::open(path).map_err(|e| audio_error(path, e))?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int {
            return Err(CorpusError::audio(path, "expected integer PCM samples"));
        }

        let samples = reader
            .into_samples::<i32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| audio_error(path, e))?;

        Ok(Self { spec, samples })
    }

    fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.spec.channels.max(1))
    }

    /// Frame index for a time in seconds, truncated to the sample grid
    fn frame_at(&self, seconds: f64) -> usize {
        let frame = (seconds * f64::from(self.spec.sample_rate)).floor();
        (frame.max(0.0) as usize).min(self.frame_count())
    }

    /// Samples covering `[start, end)` seconds
    fn slice(&self, start: f64, end: f64) -> &[i32] {
        let channels = usize::from(self.spec.channels.max(1));
        let first = self.frame_at(start);
        let last = self.frame_at(end).max(first);
        &self.samples[first * channels..last * channels]
    }

    fn write_clip(&self, path: &Path, samples: &[i32]) -> CorpusResult<()> {
        let mut writer = WavWriter::create(path, self.spec).map_err(|e| audio_error(path, e))?;
        for &sample in samples {
            writer.write_sample(sample).map_err(|e| audio_error(path, e))?;
        }
        writer.finalize().map_err(|e| audio_error(path, e))
    }
}

fn audio_error(path: &Path, error: hound::Error) -> CorpusError {
    match error {
        hound::Error::IoError(e) => CorpusError::io(path, e),
        other => CorpusError::audio(path, other.to_string()),
    }
}

/// Writes tracks into `<dest>/<name>/` using waveforms from `wav_dir`
pub struct CorpusWriter {
    wav_dir: PathBuf,
    dest_root: PathBuf,
}

impl CorpusWriter {
    pub fn new<P1: AsRef<Path>, P2: AsRef<Path>>(wav_dir: P1, dest_root: P2) -> Self {
        Self {
            wav_dir: wav_dir.as_ref().to_path_buf(),
            dest_root: dest_root.as_ref().to_path_buf(),
        }
    }

    pub fn track_dir(&self, name: &str) -> PathBuf {
        self.dest_root.join(name)
    }

    /// Write every track in key order; stops at the first failure
    pub fn write_all(&self, tracks: &Tracks, mut on_track: impl FnMut(&Track)) -> CorpusResult<Vec<TrackOutput>> {
        let mut outputs = Vec::with_capacity(tracks.len());
        for track in tracks.values() {
            on_track(track);
            outputs.push(self.write_track(track)?);
        }
        Ok(outputs)
    }

    /// Write the annotation, clips and transcripts of one track
    pub fn write_track(&self, track: &Track) -> CorpusResult<TrackOutput> {
        let name = track.name.as_str();
        let track_dir = self.track_dir(name);
        FileManager::ensure_dir(&track_dir)?;

        let grid_path = track_dir.join(format!("{}.TextGrid", name));
        TextGrid::from_track(track).save(&grid_path)?;
        debug!("Wrote {:?}", grid_path);

        let width = index_width(track.len());
        let clips = self.write_clips(track, &track_dir.join(WAV_SUBDIR), width)?;
        let transcripts = Self::write_transcripts(track, &track_dir.join(TEXT_SUBDIR), width)?;

        info!("{}: {} clip(s)", name, clips.len());
        Ok(TrackOutput {
            name: name.to_string(),
            grid_path,
            intervals: track.len(),
            clips,
            transcripts,
        })
    }

    fn write_clips(&self, track: &Track, clip_dir: &Path, width: usize) -> CorpusResult<Vec<PathBuf>> {
        let wav_path = self.wav_dir.join(format!("{}.wav", track.name));
        debug!("Splitting {:?}", wav_path);
        let waveform = Waveform::load(&wav_path)?;
        FileManager::ensure_dir(clip_dir)?;

        let mut clips = Vec::with_capacity(track.len());
        for (idx, interval) in track.intervals().iter().enumerate() {
            let clip_path = clip_dir.join(format!("{}.wav", clip_stem(&track.name, idx, width)));
            let samples = waveform.slice(interval.start, interval.end);
            if samples.is_empty() {
                warn!("{:?} is empty: {} lies beyond the end of {:?}", clip_path, interval, wav_path);
            }
            waveform.write_clip(&clip_path, samples)?;
            clips.push(clip_path);
        }

        Ok(clips)
    }

    fn write_transcripts(track: &Track, text_dir: &Path, width: usize) -> CorpusResult<Vec<PathBuf>> {
        FileManager::ensure_dir(text_dir)?;

        let mut transcripts = Vec::with_capacity(track.len());
        for (idx, interval) in track.intervals().iter().enumerate() {
            let text_path = text_dir.join(format!("{}.txt", clip_stem(&track.name, idx, width)));
            FileManager::write_to_file(&text_path, interval.text.trim())?;
            debug!("Wrote {:?}", text_path);
            transcripts.push(text_path);
        }

        Ok(transcripts)
    }
}
