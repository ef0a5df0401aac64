use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::app_config::SubstitutionProfile;
use crate::errors::CorpusResult;
use crate::file_utils::FileManager;
use crate::smil::{TextDocument, TimingDocument};
use crate::timing::{format_clock_value, parse_clock_value};

// @module: Sentence interval extraction from SMIL media overlays

// @struct: One narrated sentence
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    // @field: Start in seconds
    pub start: f64,

    // @field: End in seconds, always greater than start
    pub end: f64,

    // @field: Normalized transcript
    pub text: String,
}

impl Interval {
    /// Build an interval, rejecting empty or inverted time ranges
    pub fn new(start: f64, end: f64, text: String) -> Option<Self> {
        if end > start && start >= 0.0 {
            Some(Self { start, end, text })
        } else {
            None
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{} - {}] {}",
            format_clock_value(self.start),
            format_clock_value(self.end),
            self.text
        )
    }
}

/// Intervals for one audio file, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub name: String,
    intervals: Vec<Interval>,
}

impl Track {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            intervals: Vec::new(),
        }
    }

    /// Append in arrival order; intervals are never re-sorted by time.
    /// Returns false (and drops the interval) when `end <= start`.
    pub fn push(&mut self, interval: Interval) -> bool {
        if interval.end <= interval.start {
            return false;
        }
        self.intervals.push(interval);
        true
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Tracks keyed by audio base name
pub type Tracks = BTreeMap<String, Track>;

/// Builds tracks from a directory of timing and text documents
pub struct AlignmentExtractor {
    profile: SubstitutionProfile,
}

impl AlignmentExtractor {
    pub fn new(profile: SubstitutionProfile) -> Self {
        Self { profile }
    }

    /// Scan every `*.smil` document in `text_dir` (in file-name order)
    pub fn extract_dir<P: AsRef<Path>>(&self, text_dir: P) -> CorpusResult<Tracks> {
        let text_dir = text_dir.as_ref();
        let timing_paths = FileManager::find_files(text_dir, "smil")?;
        info!("Found {} timing document(s) in {:?}", timing_paths.len(), text_dir);

        let mut tracks = Tracks::new();
        for timing_path in timing_paths {
            let timing = TimingDocument::load(&timing_path)?;
            let text = TextDocument::load(timing.text_document_path())?;
            self.extract_page(&timing, &text, &mut tracks)?;
        }

        Ok(tracks)
    }

    /// Resolve one page; nothing is merged into `tracks` unless the whole page succeeds
    pub fn extract_page(&self, timing: &TimingDocument, text: &TextDocument, tracks: &mut Tracks) -> CorpusResult<()> {
        let mut page: Vec<(String, Interval)> = Vec::with_capacity(timing.pairs.len());

        for pair in &timing.pairs {
            let candidate = text.anchor_text(&pair.text_id)?;
            let start = parse_clock_value(&pair.clip_begin)?;
            let end = parse_clock_value(&pair.clip_end)?;

            if end <= start {
                debug!(
                    "Skipping '{}' in {:?}: clip {} - {} is empty",
                    pair.text_id, timing.path, pair.clip_begin, pair.clip_end
                );
                continue;
            }

            let interval = Interval {
                start,
                end,
                text: self.profile.apply(candidate),
            };
            page.push((pair.audio_name(), interval));
        }

        debug!("{:?}: {} interval(s)", timing.path, page.len());

        for (name, interval) in page {
            tracks
                .entry(name.clone())
                .or_insert_with(|| Track::new(&name))
                .push(interval);
        }

        Ok(())
    }
}
