//! Station code type.

use std::fmt;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code: {reason}")]
pub struct InvalidStationCode {
    reason: &'static str,
}

/// A valid station code: 2 to 5 uppercase ASCII letters.
///
/// Station codes identify the stops on a vehicle's route. This type
/// guarantees that any `StationCode` value is valid by construction.
///
/// # Examples
///
/// ```
/// use reservation_engine::domain::StationCode;
///
/// let ndls = StationCode::parse("NDLS").unwrap();
/// assert_eq!(ndls.as_str(), "NDLS");
///
/// // Lowercase is rejected
/// assert!(StationCode::parse("ndls").is_err());
///
/// // Wrong length is rejected
/// assert!(StationCode::parse("N").is_err());
/// assert!(StationCode::parse("NEWDELHI").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationCode {
    bytes: [u8; 5],
    len: u8,
}

impl StationCode {
    /// Parse a station code from a string.
    ///
    /// The input must be 2 to 5 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        let input = s.as_bytes();

        if input.len() < 2 || input.len() > 5 {
            return Err(InvalidStationCode {
                reason: "must be 2 to 5 characters",
            });
        }

        for &b in input {
            if !b.is_ascii_uppercase() {
                return Err(InvalidStationCode {
                    reason: "must be uppercase ASCII letters A-Z",
                });
            }
        }

        let mut bytes = [0u8; 5];
        bytes[..input.len()].copy_from_slice(input);

        Ok(StationCode {
            bytes,
            len: input.len() as u8,
        })
    }

    /// Returns the station code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII uppercase letters
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap()
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.as_str())
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for StationCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for StationCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StationCode::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(StationCode::parse("NDLS").is_ok());
        assert!(StationCode::parse("BCT").is_ok());
        assert!(StationCode::parse("MAS").is_ok());
        assert!(StationCode::parse("SBC").is_ok());
        assert!(StationCode::parse("HW").is_ok());
        assert!(StationCode::parse("LTTXX").is_ok());
    }

    #[test]
    fn reject_lowercase() {
        assert!(StationCode::parse("ndls").is_err());
        assert!(StationCode::parse("Ndls").is_err());
        assert!(StationCode::parse("NDLs").is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(StationCode::parse("").is_err());
        assert!(StationCode::parse("N").is_err());
        assert!(StationCode::parse("NEWDELHI").is_err());
    }

    #[test]
    fn reject_non_letters() {
        assert!(StationCode::parse("ND1").is_err());
        assert!(StationCode::parse("ND-S").is_err());
        assert!(StationCode::parse("ND S").is_err());
        assert!(StationCode::parse("NDÖ").is_err());
    }

    #[test]
    fn as_str_roundtrip() {
        let code = StationCode::parse("NDLS").unwrap();
        assert_eq!(code.as_str(), "NDLS");
        let code = StationCode::parse("HW").unwrap();
        assert_eq!(code.as_str(), "HW");
    }

    #[test]
    fn display_and_debug() {
        let code = StationCode::parse("BCT").unwrap();
        assert_eq!(format!("{}", code), "BCT");
        assert_eq!(format!("{:?}", code), "StationCode(BCT)");
    }

    #[test]
    fn equality_and_hash() {
        use std::collections::HashSet;
        let a = StationCode::parse("NDLS").unwrap();
        let b = StationCode::parse("NDLS").unwrap();
        let c = StationCode::parse("BCT").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn serde_roundtrip() {
        let code = StationCode::parse("NDLS").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"NDLS\"");
        let back: StationCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<StationCode>("\"ndls\"").is_err());
        assert!(serde_json::from_str::<StationCode>("\"TOOLONGCODE\"").is_err());
    }
}
