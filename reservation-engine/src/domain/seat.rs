//! Seat and coach identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid coach code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coach code: {reason}")]
pub struct InvalidCoachCode {
    reason: &'static str,
}

/// Error returned when a seat number is out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("seat numbers start at 1")]
pub struct InvalidSeatNumber;

/// A coach code within a vehicle, e.g. `S1`, `B2`, `A1`.
///
/// 1 to 3 characters, starting with an uppercase letter, followed by
/// uppercase letters or digits. Valid by construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoachCode {
    bytes: [u8; 3],
    len: u8,
}

impl CoachCode {
    /// Parse a coach code from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidCoachCode> {
        let input = s.as_bytes();

        if input.is_empty() || input.len() > 3 {
            return Err(InvalidCoachCode {
                reason: "must be 1 to 3 characters",
            });
        }

        if !input[0].is_ascii_uppercase() {
            return Err(InvalidCoachCode {
                reason: "must start with an uppercase letter",
            });
        }

        for &b in &input[1..] {
            if !b.is_ascii_uppercase() && !b.is_ascii_digit() {
                return Err(InvalidCoachCode {
                    reason: "must be uppercase ASCII letters or digits",
                });
            }
        }

        let mut bytes = [0u8; 3];
        bytes[..input.len()].copy_from_slice(input);

        Ok(CoachCode {
            bytes,
            len: input.len() as u8,
        })
    }

    /// Returns the coach code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII characters
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap()
    }
}

impl fmt::Debug for CoachCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoachCode({})", self.as_str())
    }
}

impl fmt::Display for CoachCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for CoachCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for CoachCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CoachCode::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A physical seat: a coach and a seat number within that coach.
///
/// A seat belongs to exactly one coach, and a coach to exactly one
/// vehicle, so a `SeatId` identifies a seat within its vehicle.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSeatId")]
pub struct SeatId {
    coach: CoachCode,
    number: u16,
}

/// Unvalidated shape used during deserialization.
#[derive(Deserialize)]
struct RawSeatId {
    coach: CoachCode,
    number: u16,
}

impl TryFrom<RawSeatId> for SeatId {
    type Error = InvalidSeatNumber;

    fn try_from(raw: RawSeatId) -> Result<Self, Self::Error> {
        SeatId::new(raw.coach, raw.number)
    }
}

impl SeatId {
    /// Create a seat identifier. Seat numbers start at 1.
    pub fn new(coach: CoachCode, number: u16) -> Result<Self, InvalidSeatNumber> {
        if number == 0 {
            return Err(InvalidSeatNumber);
        }
        Ok(SeatId { coach, number })
    }

    /// The coach this seat belongs to.
    pub fn coach(&self) -> CoachCode {
        self.coach
    }

    /// The seat number within the coach.
    pub fn number(&self) -> u16 {
        self.number
    }
}

impl fmt::Debug for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeatId({}-{})", self.coach, self.number)
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.coach, self.number)
    }
}
