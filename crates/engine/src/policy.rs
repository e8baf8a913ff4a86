//! Rescan policy
//!
//! How long a published snapshot stays fresh. The policy is user-editable
//! at runtime through the `/rescan` control file, so the textual grammar
//! (`"<N>[m|s]"`, unit optional, defaulting to seconds) lives here next to
//! the type.

use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

/// Unit of a rescan interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescanUnit {
    Seconds,
    Minutes,
}

impl RescanUnit {
    fn suffix(&self) -> char {
        match self {
            Self::Seconds => 's',
            Self::Minutes => 'm',
        }
    }
}

/// Interval after which a snapshot is considered stale and rebuilt on the
/// next access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescanPolicy {
    pub interval: u64,
    pub unit: RescanUnit,
}

impl RescanPolicy {
    pub fn seconds(interval: u64) -> Self {
        Self {
            interval,
            unit: RescanUnit::Seconds,
        }
    }

    pub fn minutes(interval: u64) -> Self {
        Self {
            interval,
            unit: RescanUnit::Minutes,
        }
    }

    /// The policy as a duration. Saturates on intervals too large to
    /// express in seconds.
    pub fn as_duration(&self) -> Duration {
        match self.unit {
            RescanUnit::Seconds => Duration::from_secs(self.interval),
            RescanUnit::Minutes => Duration::from_secs(self.interval.saturating_mul(60)),
        }
    }
}

impl Default for RescanPolicy {
    /// Matches the original mount default of one hour.
    fn default() -> Self {
        Self::minutes(60)
    }
}

impl std::fmt::Display for RescanPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.interval, self.unit.suffix())
    }
}

/// Parse failure for a rescan policy string. The control file treats this
/// as a request to force a rebuild rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a rescan interval: {0:?}")]
pub struct ParsePolicyError(pub String);

impl FromStr for RescanPolicy {
    type Err = ParsePolicyError;

    /// Accepts `"<N>"`, `"<N>s"`, or `"<N>m"`, case-insensitive, with
    /// optional whitespace between number and unit. Trailing noise after
    /// the match is ignored, so `"30s\n"` parses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^\s*(\d+)\s*([msMS]?)").expect("rescan pattern is valid")
        });

        let captures = pattern
            .captures(s)
            .ok_or_else(|| ParsePolicyError(s.to_string()))?;
        let interval: u64 = captures[1]
            .parse()
            .map_err(|_| ParsePolicyError(s.to_string()))?;

        let unit = match captures.get(2).map(|m| m.as_str()) {
            Some("m") | Some("M") => RescanUnit::Minutes,
            _ => RescanUnit::Seconds,
        };

        Ok(Self { interval, unit })
    }
}
