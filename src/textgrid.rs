use log::warn;
use std::fmt;
use std::path::Path;

use crate::errors::CorpusResult;
use crate::extractor::{Interval, Track};
use crate::file_utils::FileManager;

// @module: Praat TextGrid annotation files (long text format)

// @const: Name of the tier holding one interval per narrated sentence
pub const SENTENCE_TIER: &str = "sentences";

/// Named, ordered sequence of labelled intervals
#[derive(Debug, Clone)]
pub struct IntervalTier {
    pub name: String,
    pub intervals: Vec<Interval>,
}

impl IntervalTier {
    pub fn new(name: &str, intervals: Vec<Interval>) -> Self {
        Self {
            name: name.to_string(),
            intervals,
        }
    }

    pub fn xmax(&self) -> f64 {
        self.intervals.iter().map(|i| i.end).fold(0.0, f64::max)
    }

    /// Whether every interval starts at or after the end of the previous one
    pub fn is_monotonic(&self) -> bool {
        self.intervals.windows(2).all(|w| w[1].start >= w[0].end)
    }

    /// Intervals as written to disk: blank intervals cover the leading gap,
    /// the gaps between intervals and the tail up to `xmax`. An interval
    /// starting before the previous end is emitted as is, without filling.
    pub fn rendered(&self, xmax: f64) -> Vec<(f64, f64, &str)> {
        let mut out = Vec::with_capacity(self.intervals.len() * 2 + 1);
        let mut cursor = 0.0;

        for interval in &self.intervals {
            if interval.start > cursor {
                out.push((cursor, interval.start, ""));
            }
            out.push((interval.start, interval.end, interval.text.as_str()));
            cursor = f64::max(cursor, interval.end);
        }

        if xmax > cursor {
            out.push((cursor, xmax, ""));
        }
        out
    }
}

/// Annotation object holding one or more interval tiers
#[derive(Debug, Clone, Default)]
pub struct TextGrid {
    pub tiers: Vec<IntervalTier>,
}

impl TextGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid with a single `sentences` tier holding the track's intervals in track order
    pub fn from_track(track: &Track) -> Self {
        let mut grid = Self::new();
        grid.add_tier(IntervalTier::new(SENTENCE_TIER, track.intervals().to_vec()));
        grid
    }

    pub fn add_tier(&mut self, tier: IntervalTier) {
        self.tiers.push(tier);
    }

    pub fn tier(&self, name: &str) -> Option<&IntervalTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    pub fn xmax(&self) -> f64 {
        self.tiers.iter().map(IntervalTier::xmax).fold(0.0, f64::max)
    }

    /// Write the grid to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CorpusResult<()> {
        let path = path.as_ref();
        for tier in self.tiers.iter().filter(|t| !t.is_monotonic()) {
            warn!(
                "Tier '{}' in {:?} has overlapping or out-of-order intervals, written without gap filling",
                tier.name, path
            );
        }
        FileManager::write_to_file(path, &self.to_string())
    }
}

impl fmt::Display for TextGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let xmax = self.xmax();
        writeln!(f, "File type = \"ooTextFile\"")?;
        writeln!(f, "Object class = \"TextGrid\"")?;
        writeln!(f)?;
        writeln!(f, "xmin = 0 ")?;
        writeln!(f, "xmax = {} ", xmax)?;
        writeln!(f, "tiers? <exists> ")?;
        writeln!(f, "size = {} ", self.tiers.len())?;
        writeln!(f, "item []: ")?;

        for (tier_idx, tier) in self.tiers.iter().enumerate() {
            writeln!(f, "    item [{}]:", tier_idx + 1)?;
            writeln!(f, "        class = \"IntervalTier\" ")?;
            writeln!(f, "        name = \"{}\" ", quote(&tier.name))?;
            writeln!(f, "        xmin = 0 ")?;
            writeln!(f, "        xmax = {} ", xmax)?;
            let intervals = tier.rendered(xmax);
            writeln!(f, "        intervals: size = {} ", intervals.len())?;

            for (idx, (start, end, text)) in intervals.iter().enumerate() {
                writeln!(f, "        intervals [{}]:", idx + 1)?;
                writeln!(f, "            xmin = {} ", start)?;
                writeln!(f, "            xmax = {} ", end)?;
                writeln!(f, "            text = \"{}\" ", quote(text))?;
            }
        }

        Ok(())
    }
}

// Praat escapes a double quote by doubling it
fn quote(text: &str) -> String {
    text.replace('"', "\"\"")
}
