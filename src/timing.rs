use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{CorpusError, CorpusResult};

// @module: SMIL clock value parsing

// @const: Full clock value, H:MM:SS with optional decimal fraction
static CLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})(?:\.(\d+))?$").unwrap()
});

/// Parse a `clipBegin`/`clipEnd` clock value (`H:MM:SS.fff`) into seconds.
///
/// Hours contribute `hours * 3600`. The fraction is read as a decimal
/// fraction of a second, so `.5` and `.500` are both half a second.
pub fn parse_clock_value(value: &str) -> CorpusResult<f64> {
    let format_error = || CorpusError::TimestampFormat {
        value: value.to_string(),
    };

    let caps = CLOCK_REGEX.captures(value.trim()).ok_or_else(format_error)?;

    let field = |idx: usize| -> CorpusResult<u64> {
        caps.get(idx)
            .map_or(Ok(0), |m| m.as_str().parse::<u64>())
            .map_err(|_| format_error())
    };

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;

    if minutes >= 60 || seconds >= 60 {
        return Err(format_error());
    }

    let fraction = match caps.get(4) {
        Some(m) => format!("0.{}", m.as_str())
            .parse::<f64>()
            .map_err(|_| format_error())?,
        None => 0.0,
    };

    let whole = hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .ok_or_else(format_error)?;

    Ok(whole as f64 + fraction)
}

/// Format seconds back into a clock value with millisecond precision
pub fn format_clock_value(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
