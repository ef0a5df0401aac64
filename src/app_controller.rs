use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::Path;

use crate::app_config::Config;
use crate::corpus_writer::{CorpusWriter, TrackOutput};
use crate::epub;
use crate::extractor::AlignmentExtractor;
use crate::file_utils::FileManager;
use crate::scaffold;
use crate::transcoder::{AudioEncoder, AudioTranscoder, FfmpegEncoder};

// @module: Application controller running the corpus pipeline

// @const: Working layout below the output directory
pub const AUDIO_DIR: &str = "Audio";
pub const WAVE_DIR: &str = "Wave";
pub const TEXT_DIR: &str = "Text";
pub const ALIGN_DIR: &str = "Align";
pub const MARYTTS_DIR: &str = "marytts";

/// Per-run switches that are not part of the persisted configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Assume the book content is already unpacked in the output directory
    pub skip_extract: bool,
}

/// Totals reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub extracted_members: usize,
    pub transcoded: usize,
    pub tracks: usize,
    pub intervals: usize,
    pub clips: usize,
    pub transcripts: usize,
}

/// Main application controller
pub struct Controller<E: AudioEncoder = FfmpegEncoder> {
    // @field: App configuration
    config: Config,
    // @field: Encoder used by the transcoding stage
    encoder: E,
}

impl Controller<FfmpegEncoder> {
    // @method: Create a controller that transcodes with the configured ffmpeg
    pub fn with_config(config: Config) -> Result<Self> {
        let encoder = FfmpegEncoder::new(&config.ffmpeg_path);
        Self::with_encoder(config, encoder)
    }
}

impl<E: AudioEncoder> Controller<E> {
    /// Create a controller with an explicit encoder
    pub fn with_encoder(config: Config, encoder: E) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config, encoder })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage for `epub_path`, writing into `output_dir`
    pub fn run(&self, epub_path: &Path, output_dir: &Path, options: &RunOptions) -> Result<RunSummary> {
        let start_time = std::time::Instant::now();
        FileManager::ensure_dir(output_dir)?;

        let mut summary = RunSummary::default();

        if options.skip_extract {
            info!("Skipping extraction, using existing content in {:?}", output_dir);
        } else {
            if !epub_path.is_file() {
                return Err(anyhow!("Input file does not exist: {:?}", epub_path));
            }
            info!("Extracting {:?} to {:?}", epub_path, output_dir);
            summary.extracted_members = epub::extract_content(epub_path, output_dir)
                .with_context(|| format!("Failed to extract {:?}", epub_path))?;
        }

        summary.transcoded = self.transcode(output_dir)?;

        let outputs = self.align(output_dir)?;
        summary.tracks = outputs.len();
        summary.intervals = outputs.iter().map(|o| o.intervals).sum();
        summary.clips = outputs.iter().map(|o| o.clips.len()).sum();
        summary.transcripts = outputs.iter().map(|o| o.transcripts.len()).sum();

        if self.config.scaffold_marytts {
            let report = scaffold::scaffold_marytts(output_dir.join(ALIGN_DIR), output_dir.join(MARYTTS_DIR))
                .context("Failed to link corpus into the MaryTTS project")?;
            info!("Linked {} transcript(s) and {} clip(s) into {:?}", report.texts, report.waves, output_dir.join(MARYTTS_DIR));
        }

        info!(
            "Done in {:.1}s: {} track(s), {} interval(s), {} clip(s)",
            start_time.elapsed().as_secs_f64(),
            summary.tracks,
            summary.intervals,
            summary.clips
        );
        Ok(summary)
    }

    /// Audio stage: `Audio/*` to `Wave/*.wav`
    pub fn transcode(&self, output_dir: &Path) -> Result<usize> {
        info!("Converting audio");
        let audio_dir = output_dir.join(AUDIO_DIR);
        if !FileManager::dir_exists(&audio_dir) {
            warn!("No audio directory at {:?}", audio_dir);
            return Ok(0);
        }

        let transcoder = AudioTranscoder::new(&self.encoder, &self.config.audio_extension);
        let sources = transcoder.sources(&audio_dir)?;
        let progress_bar = Self::progress_bar(sources.len(), "files");
        progress_bar.set_message("Converting");

        let report = transcoder
            .transcode_dir(&audio_dir, output_dir.join(WAVE_DIR), |source| {
                progress_bar.set_message(file_label(source));
                progress_bar.inc(1);
            })
            .context("Audio conversion failed")?;
        progress_bar.finish_and_clear();

        Ok(report.transcoded.len())
    }

    /// Alignment and corpus stages: `Text/*.smil` to `Align/<track>/...`
    pub fn align(&self, output_dir: &Path) -> Result<Vec<TrackOutput>> {
        info!("Computing intervals");
        let profile = self.config.resolve_profile()?;
        info!("Substitution profile '{}' ({} rule(s))", profile.name(), profile.len());

        let extractor = AlignmentExtractor::new(profile);
        let tracks = extractor
            .extract_dir(output_dir.join(TEXT_DIR))
            .context("Failed to compute intervals")?;

        info!("Writing alignments");
        let align_dir = output_dir.join(ALIGN_DIR);
        FileManager::ensure_dir(&align_dir)?;

        let writer = CorpusWriter::new(output_dir.join(WAVE_DIR), &align_dir);
        let progress_bar = Self::progress_bar(tracks.len(), "tracks");
        let outputs = writer
            .write_all(&tracks, |track| {
                progress_bar.set_message(track.name.clone());
                progress_bar.inc(1);
            })
            .context("Failed to write alignments")?;
        progress_bar.finish_and_clear();

        Ok(outputs)
    }

    fn progress_bar(len: usize, unit: &str) -> ProgressBar {
        let progress_bar = ProgressBar::new(len as u64);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
            unit
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
