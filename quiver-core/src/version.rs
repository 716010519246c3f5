use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

/// Version of a serialized artifact format (`major.minor`).
///
/// Readers accept files written with the same major version and a minor
/// version no newer than their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct FormatVersion {
    major: u32,
    minor: u32,
}

impl FormatVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Whether a reader at `self` can load a file written at `written`.
    pub fn can_read(&self, written: FormatVersion) -> bool {
        self.major == written.major && self.minor >= written.minor
    }
}

impl TryFrom<String> for FormatVersion {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for FormatVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for FormatVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((major, minor)) = s.split_once('.') else {
            return Err(format!("invalid format version '{}', expected 'X.Y'", s));
        };
        Ok(Self {
            major: major.parse().map_err(|_| format!("invalid major in '{}'", s))?,
            minor: minor.parse().map_err(|_| format!("invalid minor in '{}'", s))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FormatVersion::new(1, 2).to_string(), "1.2");
        assert_eq!(FormatVersion::default().to_string(), "0.0");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("1.0".parse::<FormatVersion>(), Ok(FormatVersion::new(1, 0)));
        assert_eq!(
            "10.20".parse::<FormatVersion>(),
            Ok(FormatVersion::new(10, 20))
        );
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("1".parse::<FormatVersion>().is_err());
        assert!("1.x".parse::<FormatVersion>().is_err());
        assert!("1.2.3".parse::<FormatVersion>().is_err());
        assert!("".parse::<FormatVersion>().is_err());
    }

    #[test]
    fn test_can_read() {
        let reader = FormatVersion::new(1, 2);
        assert!(reader.can_read(FormatVersion::new(1, 0)));
        assert!(reader.can_read(FormatVersion::new(1, 2)));
        assert!(!reader.can_read(FormatVersion::new(1, 3)));
        assert!(!reader.can_read(FormatVersion::new(2, 0)));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = serde_json::to_string(&FormatVersion::new(1, 1)).unwrap();
        assert_eq!(json, r#""1.1""#);
        let back: FormatVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FormatVersion::new(1, 1));
    }
}
