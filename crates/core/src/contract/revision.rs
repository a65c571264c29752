//! Store revision identifier
//!
//! Every value read from the byte store carries the revision of its latest
//! modification. Revisions are monotonically non-decreasing per key: observing
//! a smaller revision than one already seen for the same key means the read is
//! stale.

use serde::{Deserialize, Serialize};

/// Revision of a key in the byte store
///
/// Wraps the store's signed 64-bit modification counter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(pub i64);

impl Revision {
    /// Revision reported for keys that were never written
    pub const ZERO: Revision = Revision(0);

    /// Create a revision
    pub const fn new(rev: i64) -> Self {
        Revision(rev)
    }

    /// Get the numeric value
    #[inline]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Next revision (saturating)
    pub const fn next(&self) -> Self {
        Revision(self.0.saturating_add(1))
    }

    /// True when `self` must not replace state read at `observed`
    #[inline]
    pub fn is_stale_against(&self, observed: Revision) -> bool {
        *self < observed
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rev:{}", self.0)
    }
}

impl From<i64> for Revision {
    fn from(v: i64) -> Self {
        Revision(v)
    }
}
