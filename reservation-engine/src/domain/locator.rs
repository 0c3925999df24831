//! Booking locator codes.

use std::fmt;

/// Error returned when parsing an invalid locator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid locator: {reason}")]
pub struct InvalidLocator {
    reason: &'static str,
}

/// Alphabet used for locator encoding (base 36).
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A 6-character booking locator code (PNR-style).
///
/// Locators are 6 uppercase ASCII alphanumerics. The ledger derives
/// them from its monotonic booking counter via [`Locator::from_index`],
/// so no randomness source is required.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locator([u8; 6]);

impl Locator {
    /// Parse a locator from a string.
    ///
    /// The input must be exactly 6 uppercase ASCII alphanumerics.
    pub fn parse(s: &str) -> Result<Self, InvalidLocator> {
        let input = s.as_bytes();

        if input.len() != 6 {
            return Err(InvalidLocator {
                reason: "must be exactly 6 characters",
            });
        }

        for &b in input {
            if !b.is_ascii_uppercase() && !b.is_ascii_digit() {
                return Err(InvalidLocator {
                    reason: "must be uppercase ASCII letters or digits",
                });
            }
        }

        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(input);
        Ok(Locator(bytes))
    }

    /// Encode a booking counter value as a locator.
    ///
    /// Base-36 encoding, zero-padded to 6 characters; wraps after
    /// 36^6 bookings.
    pub fn from_index(index: u64) -> Self {
        let mut value = index % 36u64.pow(6);
        let mut bytes = [b'0'; 6];
        for slot in bytes.iter_mut().rev() {
            *slot = ALPHABET[(value % 36) as usize];
            value /= 36;
        }
        Locator(bytes)
    }

    /// Returns the locator as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII characters
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({})", self.as_str())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Locator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Locator {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Locator::parse(&s).map_err(serde::de::Error::custom)
    }
}
