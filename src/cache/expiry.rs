//! Expiry Module
//!
//! Normalizes caller-supplied expiry instants to UTC at the facade boundary.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};

use crate::error::{CacheError, Result};

// == Expiry ==
/// Absolute expiry instant of a cache entry, always held in UTC.
///
/// Any `DateTime<Tz>` converts into an `Expiry`, so callers may pass local or
/// offset times and the conversion happens exactly once, here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expiry(DateTime<Utc>);

impl Expiry {
    // == Constructors ==
    /// Creates an expiry from an instant in any timezone.
    pub fn at<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Self(instant.with_timezone(&Utc))
    }

    /// Creates an expiry `ttl` from now.
    ///
    /// Out-of-range results saturate toward the sign of `ttl`: the latest
    /// representable instant for a positive `ttl`, the unset sentinel for a
    /// negative one, so a far-past expiry is still rejected by writes.
    pub fn after(ttl: Duration) -> Self {
        let now = Utc::now();
        let saturated = if ttl < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        };
        Self(now.checked_add_signed(ttl).unwrap_or(saturated))
    }

    /// Interprets a naive wall-clock time in the host's local timezone.
    ///
    /// Wall-clock times skipped or repeated by a DST transition are rejected,
    /// since they do not name a single instant.
    pub fn from_local(local: NaiveDateTime) -> Result<Self> {
        match Local.from_local_datetime(&local) {
            LocalResult::Single(instant) => Ok(Self::at(instant)),
            LocalResult::Ambiguous(earliest, latest) => Err(CacheError::InvalidArgument(format!(
                "local expiry {local} is ambiguous ({earliest} or {latest})"
            ))),
            LocalResult::None => Err(CacheError::InvalidArgument(format!(
                "local expiry {local} does not exist in the local timezone"
            ))),
        }
    }

    /// The "unset" sentinel. Never accepted by write operations.
    pub fn unset() -> Self {
        Self(DateTime::<Utc>::MIN_UTC)
    }

    // == Accessors ==
    /// Returns the canonical UTC instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn is_unset(&self) -> bool {
        self.0 == DateTime::<Utc>::MIN_UTC
    }

    // == Validate ==
    /// Checks the expiry is usable for a write made at `now`.
    ///
    /// The instant must be strictly after `now`; an expiry equal to `now`
    /// would produce an entry that is never visible.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        if self.is_unset() {
            return Err(CacheError::InvalidArgument(
                "expiry is unset".to_string(),
            ));
        }
        if self.0 <= now {
            return Err(CacheError::InvalidArgument(format!(
                "expiry {} is not after the current instant {}",
                self.0.to_rfc3339(),
                now.to_rfc3339()
            )));
        }
        Ok(self.0)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Expiry {
    fn from(instant: DateTime<Tz>) -> Self {
        Self::at(instant)
    }
}
