//! Accommodation class type.

use std::fmt;

/// Error returned when parsing an invalid travel class code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid travel class: {reason}")]
pub struct InvalidTravelClass {
    reason: &'static str,
}

/// A class of accommodation on a vehicle, e.g. `1A`, `2A`, `3A`, `SL`, `CC`.
///
/// Class codes are 1 to 3 uppercase ASCII alphanumeric characters
/// containing at least one letter. Valid by construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TravelClass {
    bytes: [u8; 3],
    len: u8,
}

impl TravelClass {
    /// Parse a travel class code from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidTravelClass> {
        let input = s.as_bytes();

        if input.is_empty() || input.len() > 3 {
            return Err(InvalidTravelClass {
                reason: "must be 1 to 3 characters",
            });
        }

        let mut has_letter = false;
        for &b in input {
            if b.is_ascii_uppercase() {
                has_letter = true;
            } else if !b.is_ascii_digit() {
                return Err(InvalidTravelClass {
                    reason: "must be uppercase ASCII letters or digits",
                });
            }
        }

        if !has_letter {
            return Err(InvalidTravelClass {
                reason: "must contain at least one letter",
            });
        }

        let mut bytes = [0u8; 3];
        bytes[..input.len()].copy_from_slice(input);

        Ok(TravelClass {
            bytes,
            len: input.len() as u8,
        })
    }

    /// Returns the class code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII characters
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap()
    }
}

impl fmt::Debug for TravelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TravelClass({})", self.as_str())
    }
}

impl fmt::Display for TravelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for TravelClass {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for TravelClass {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TravelClass::parse(&s).map_err(serde::de::Error::custom)
    }
}
