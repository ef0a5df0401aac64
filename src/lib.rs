/*!
 * # smilcorpus - Speech corpora from EPUB 3 read-aloud books
 *
 * A Rust library that turns an EPUB 3 audiobook with media overlays (SMIL
 * timing documents synchronized with XHTML text) into a corpus of short
 * audio clips, each paired with its exact transcript.
 *
 * ## Features
 *
 * - Extract the book content from the EPUB container
 * - Convert narration audio to mono 16 kHz PCM WAV via ffmpeg
 * - Reconstruct sentence intervals from SMIL `par` elements
 * - Normalize transcripts with ordered regex substitution profiles
 * - Write Praat TextGrid annotations, per-sentence clips and transcripts
 * - Link the corpus into a MaryTTS voice-import layout
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration and substitution profiles
 * - `epub`: Container extraction
 * - `transcoder`: Audio normalization
 * - `timing`: SMIL clock values
 * - `smil`: Timing and text documents
 * - `extractor`: Sentence intervals per audio track
 * - `textgrid`: Interval tier annotation files
 * - `corpus_writer`: Clips and transcripts per track
 * - `scaffold`: MaryTTS project layout
 * - `file_utils`: File system operations
 * - `app_controller`: Pipeline orchestration
 * - `errors`: Error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod corpus_writer;
pub mod epub;
pub mod errors;
pub mod extractor;
pub mod file_utils;
pub mod scaffold;
pub mod smil;
pub mod textgrid;
pub mod timing;
pub mod transcoder;

// Re-export main types for easier usage
pub use app_config::{Config, SubstitutionProfile, SubstitutionRule};
pub use app_controller::{Controller, RunOptions, RunSummary};
pub use corpus_writer::CorpusWriter;
pub use errors::{CorpusError, CorpusResult};
pub use extractor::{AlignmentExtractor, Interval, Track, Tracks};
pub use transcoder::{AudioEncoder, AudioTranscoder, FfmpegEncoder};
