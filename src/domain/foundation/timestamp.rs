//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Longest window `has_elapsed` measures: one hundred years.
pub const MAX_WINDOW_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Creates a timestamp from Unix seconds, or `None` when out of range.
    pub fn from_unix_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Returns true once more than `secs` seconds have passed between `self` and `now`.
    ///
    /// Windows longer than [`MAX_WINDOW_SECS`] are treated as never elapsing.
    pub fn has_elapsed(&self, secs: u64, now: &Timestamp) -> bool {
        if secs > MAX_WINDOW_SECS {
            return false;
        }
        now.duration_since(self) > Duration::seconds(secs as i64)
    }

    /// Wall-clock time at the given fixed offset from UTC.
    pub fn local_at(&self, offset: FixedOffset) -> NaiveDateTime {
        self.0.with_timezone(&offset).naive_local()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
