/*!
 * Audio transcoding stage.
 *
 * Converts the book's narration files into mono 16 kHz signed 16-bit PCM
 * WAV files, one per source file, named after the source's base name.
 * Existing outputs are left alone so an interrupted run can be resumed.
 */

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::{CorpusError, CorpusResult};
use crate::file_utils::FileManager;

// @const: Normalized waveform format
pub const TARGET_SAMPLE_RATE: u32 = 16_000;
pub const TARGET_CHANNELS: u16 = 1;
pub const TARGET_CODEC: &str = "pcm_s16le";

/// Converts a single audio file into the normalized waveform format
pub trait AudioEncoder {
    /// Encode `source` into `dest`; `dest`'s parent directory already exists
    fn encode(&self, source: &Path, dest: &Path) -> CorpusResult<()>;
}

impl<E: AudioEncoder + ?Sized> AudioEncoder for &E {
    fn encode(&self, source: &Path, dest: &Path) -> CorpusResult<()> {
        (**self).encode(source, dest)
    }
}

/// Encoder backed by the external `ffmpeg` binary
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: String,
}

impl FfmpegEncoder {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    /// Arguments passed to ffmpeg for one conversion
    pub fn arguments(source: &Path, dest: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-acodec".to_string(),
            TARGET_CODEC.to_string(),
            "-ar".to_string(),
            TARGET_SAMPLE_RATE.to_string(),
            "-ac".to_string(),
            TARGET_CHANNELS.to_string(),
            "-f".to_string(),
            "wav".to_string(),
            dest.to_string_lossy().to_string(),
        ]
    }

    /// Keep only the meaningful lines of ffmpeg's stderr, dropping the
    /// version banner, build configuration and stream metadata.
    pub fn filter_stderr(stderr: &str) -> String {
        let noise_prefixes = [
            "ffmpeg version",
            "built with",
            "configuration:",
            "lib",
            "Input #",
            "Metadata:",
            "Duration:",
            "Stream #",
            "Output #",
            "Stream mapping:",
            "Press [q]",
            "size=",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl AudioEncoder for FfmpegEncoder {
    fn encode(&self, source: &Path, dest: &Path) -> CorpusResult<()> {
        let args = Self::arguments(source, dest);
        debug!("{} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| CorpusError::ExternalTool {
                tool: self.binary.clone(),
                path: source.to_path_buf(),
                status: "failed to start".to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CorpusError::ExternalTool {
                tool: self.binary.clone(),
                path: source.to_path_buf(),
                status: output.status.to_string(),
                stderr: Self::filter_stderr(&stderr),
            });
        }

        Ok(())
    }
}

/// Outcome of a transcoding pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodeReport {
    pub transcoded: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Transcodes every audio file of a directory with the given encoder
pub struct AudioTranscoder<E: AudioEncoder> {
    encoder: E,
    extension: String,
}

impl<E: AudioEncoder> AudioTranscoder<E> {
    pub fn new(encoder: E, extension: &str) -> Self {
        Self {
            encoder,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Destination WAV path for a source file
    pub fn output_path<P: AsRef<Path>>(source: P, dest_dir: &Path) -> PathBuf {
        dest_dir.join(format!("{}.wav", FileManager::stem(source)))
    }

    /// Scratch path the encoder writes to before the output is renamed into place
    pub fn partial_path(dest: &Path) -> PathBuf {
        dest.with_extension("wav.part")
    }

    /// Audio files that would be transcoded from `source_dir`, in name order
    pub fn sources<P: AsRef<Path>>(&self, source_dir: P) -> CorpusResult<Vec<PathBuf>> {
        FileManager::find_files(source_dir, &self.extension)
    }

    /// Transcode every source file; stops at the first encoder failure
    pub fn transcode_dir<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        source_dir: P1,
        dest_dir: P2,
        mut on_file: impl FnMut(&Path),
    ) -> CorpusResult<TranscodeReport> {
        let dest_dir = dest_dir.as_ref();
        let mut report = TranscodeReport::default();

        for source in self.sources(source_dir)? {
            let dest = Self::output_path(&source, dest_dir);
            on_file(&source);

            if dest.exists() {
                debug!("Skipping {:?} (already exists)", dest);
                report.skipped.push(dest);
                continue;
            }

            FileManager::ensure_dir(dest_dir)?;
            let partial = Self::partial_path(&dest);
            if partial.exists() {
                debug!("Removing leftover {:?}", partial);
                fs::remove_file(&partial).map_err(|e| CorpusError::io(&partial, e))?;
            }

            // Only complete files ever carry the final name
            if let Err(e) = self.encoder.encode(&source, &partial) {
                let _ = fs::remove_file(&partial);
                return Err(e);
            }
            fs::rename(&partial, &dest).map_err(|e| CorpusError::io(&dest, e))?;
            debug!("Wrote {:?}", dest);
            report.transcoded.push(dest);
        }

        info!(
            "Transcoded {} file(s), {} already present",
            report.transcoded.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}
