//! Route segments: half-open distance intervals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a segment would be zero-length.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("segment endpoints are at the same distance ({0})")]
pub struct EmptySegment(pub u32);

/// A half-open distance interval `[start, end)` along a vehicle's route.
///
/// Segments are derived from two stop distances and are ordered at
/// construction, so `start < end` always holds. They are recomputed per
/// request from the route's stop distances, never treated as
/// authoritative route data.
///
/// Two segments overlap unless one ends at or before the other begins:
/// touching boundaries are *not* an overlap, so a seat vacated at a
/// stop can be reused by a passenger boarding at that same stop.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSegment")]
pub struct Segment {
    start: u32,
    end: u32,
}

/// Unvalidated shape used during deserialization.
#[derive(Deserialize)]
struct RawSegment {
    start: u32,
    end: u32,
}

impl TryFrom<RawSegment> for Segment {
    type Error = EmptySegment;

    fn try_from(raw: RawSegment) -> Result<Self, Self::Error> {
        Segment::between(raw.start, raw.end)
    }
}

impl Segment {
    /// Build a segment from two distances, in either order.
    ///
    /// Rejects zero-length segments (a journey must cover some
    /// distance).
    pub fn between(a: u32, b: u32) -> Result<Self, EmptySegment> {
        if a == b {
            return Err(EmptySegment(a));
        }
        Ok(Segment {
            start: a.min(b),
            end: a.max(b),
        })
    }

    /// Distance at which the segment begins (inclusive).
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Distance at which the segment ends (exclusive).
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Whether two segments overlap spatially.
    ///
    /// `!(self.end <= other.start || other.end <= self.start)`: the
    /// single overlap rule for the whole engine. Identical segments
    /// overlap; segments sharing only an endpoint do not.
    pub fn overlaps(&self, other: &Segment) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segment({}..{})", self.start, self.end)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
