//! Normalization of the many date encodings found in media metadata.
//!
//! Sources disagree wildly: EXIF stores `2015:12:11 12:10:09` text, the
//! filesystem reports epoch instants, MP4 boxes store integer seconds.
//! Normalization is best-effort: an unrecognized string passes through
//! unchanged instead of failing, because partial data is preferable to
//! aborting a merge.

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use std::time::SystemTime;

/// A normalized media timestamp.
///
/// `Instant` is a fully understood point in time; `Raw` preserves source text
/// that matched none of the known encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaDate {
    Instant(DateTime<Utc>),
    Raw(String),
}

/// EXIF-style timestamp with flexible single-character separators between the
/// numeric components, e.g. `2015:12:11 12:10:09` or `2015-12-11 12:10:09.250`.
fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(\d{2,4})\D?(\d{1,2})\D?(\d{1,2})[ T](\d{1,2})\D?(\d{1,2})\D?(\d{1,2})(?:[.,](\d{1,3}))?",
        )
        .expect("date pattern is valid")
    })
}

impl MediaDate {
    /// Normalizes a textual timestamp.
    ///
    /// Recognizes the flexible EXIF date pattern (components treated as UTC)
    /// and all-numeric strings (epoch milliseconds). Anything else is kept
    /// verbatim as [`MediaDate::Raw`]; this function never fails.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some(caps) = date_pattern().captures(trimmed)
            && let Some(instant) = instant_from_captures(&caps)
        {
            return Self::Instant(instant);
        }

        if !trimmed.is_empty()
            && trimmed.chars().all(|c| c.is_ascii_digit())
            && let Ok(millis) = trimmed.parse::<i64>()
            && let Some(date) = Self::from_unix_millis(millis)
        {
            return date;
        }

        Self::Raw(raw.to_string())
    }

    /// Interprets a number as milliseconds since the Unix epoch.
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::Instant)
    }

    /// Interprets a number as seconds since the Unix epoch.
    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self::Instant)
    }

    /// The instant, when this date was fully understood.
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(dt) => Some(*dt),
            Self::Raw(_) => None,
        }
    }
}

fn instant_from_captures(caps: &regex::Captures<'_>) -> Option<DateTime<Utc>> {
    let num = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let (month, day) = (num(2)?, num(3)?);
    let (hour, minute, second) = (num(4)?, num(5)?, num(6)?);
    // Fractional part is written with 1-3 digits; scale to milliseconds.
    let millis = caps.get(7).map_or(0, |m| {
        let digits = m.as_str();
        digits.parse::<u32>().unwrap_or(0) * 10u32.pow(3 - digits.len() as u32)
    });

    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .and_then(|dt| dt.checked_add_signed(chrono::Duration::milliseconds(i64::from(millis))))
}

impl From<SystemTime> for MediaDate {
    fn from(time: SystemTime) -> Self {
        Self::Instant(DateTime::<Utc>::from(time))
    }
}

impl fmt::Display for MediaDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant(dt) => {
                write!(f, "{}", dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            }
            Self::Raw(s) => f.write_str(s),
        }
    }
}
