//! Identifiers and artifact names
//!
//! Every name that appears in a synthesized graph is derived here, from a
//! submission [`Stamp`] and a sweep coordinate. Producers and consumers of a
//! signal must derive the same string, so numbers are only ever turned into
//! text through [`format_real`].

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every artifact of a sweep
pub const ARTIFACT_PREFIX: &str = "md-simulation";

/// Extension of simulation archives
pub const ARCHIVE_EXTENSION: &str = ".tgz";

/// Extension of rendered movies
pub const VIDEO_EXTENSION: &str = ".avi";

/// Name of the signal every graph starts from
pub const START_SIGNAL: &str = "start";

/// Time-derived identifier of one submitted sweep
///
/// Decimal seconds since the Unix epoch, optionally followed by `-<n>` when
/// more than one stamp was issued within the same second.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stamp(String);

impl Stamp {
    /// Wrap an existing identifier
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Stamp for a point in time (whole seconds)
    #[must_use]
    pub fn from_datetime(now: DateTime<Utc>) -> Self {
        Self(now.timestamp().to_string())
    }

    /// Borrow as `&str`
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Stamp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Issues stamps that never repeat within one process
///
/// The first stamp of a second is the bare second count. Later stamps in the
/// same second (or after the clock stepped backwards) reuse the highest
/// second seen and append an increasing suffix.
#[derive(Debug, Default)]
pub struct StampIssuer {
    last: Mutex<Option<(i64, u32)>>,
}

impl StampIssuer {
    /// Create an issuer with no history
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a stamp for `now`
    pub fn issue(&self, now: DateTime<Utc>) -> Stamp {
        let secs = now.timestamp();
        let mut last = self.last.lock();
        let (secs, seq) = match *last {
            Some((prev, seq)) if secs <= prev => (prev, seq + 1),
            _ => (secs, 0),
        };
        *last = Some((secs, seq));

        if seq == 0 {
            Stamp(secs.to_string())
        } else {
            Stamp(format!("{secs}-{seq}"))
        }
    }
}

/// Canonical decimal text for a real number
///
/// Shortest representation that parses back to the same `f64`, never in
/// exponent form. Negative zero prints as `0`.
#[must_use]
pub fn format_real(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Names derived for one temperature point of a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointNames {
    /// Canonical temperature text
    pub temperature: String,
    /// Simulation process name
    pub simulation_process: String,
    /// Rendering process name
    pub render_process: String,
    /// Archive signal / file name
    pub archive: String,
    /// Video signal / file name
    pub video: String,
}

impl PointNames {
    /// Derive all names for `temperature` in the sweep stamped `stamp`
    #[must_use]
    pub fn new(stamp: &Stamp, temperature: f64) -> Self {
        let temperature = format_real(temperature);
        let base = format!("{ARTIFACT_PREFIX}-{stamp}-{temperature}");
        Self {
            simulation_process: format!("run-simulation-{temperature}"),
            render_process: format!("run-povray-{temperature}"),
            archive: format!("{base}{ARCHIVE_EXTENSION}"),
            video: format!("{base}{VIDEO_EXTENSION}"),
            temperature,
        }
    }
}

/// Experiment-level archive file name
#[must_use]
pub fn experiment_archive(stamp: &Stamp) -> String {
    format!("{ARTIFACT_PREFIX}-{stamp}{ARCHIVE_EXTENSION}")
}

/// Experiment-level video file name
#[must_use]
pub fn experiment_video(stamp: &Stamp) -> String {
    format!("{ARTIFACT_PREFIX}-{stamp}{VIDEO_EXTENSION}")
}
