//! Fiscal data format version tags.
//!
//! Provides [`Ffd105Tag`] and [`Ffd12Tag`], zero-sized markers that serialize
//! as the receipt's `FfdVersion` string and reject any other value on
//! deserialization.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fiscal data format version of a receipt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FfdVersion {
    /// FFD 1.05.
    V105,
    /// FFD 1.2.
    V12,
}

impl FfdVersion {
    /// Returns the wire tag (`"1.05"` or `"1.2"`).
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::V105 => Ffd105Tag::TAG,
            Self::V12 => Ffd12Tag::TAG,
        }
    }

    /// Looks up a version by its wire tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            Ffd105Tag::TAG => Some(Self::V105),
            Ffd12Tag::TAG => Some(Self::V12),
            _ => None,
        }
    }
}

impl fmt::Display for FfdVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FFD {}", self.tag())
    }
}

macro_rules! ffd_tag {
    ($(#[$meta:meta])* $name:ident => $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl $name {
            /// The wire value of this tag.
            pub const TAG: &'static str = $tag;
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(Self::TAG)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(Self::TAG)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let v = String::deserialize(deserializer)?;
                if v == Self::TAG {
                    Ok(Self)
                } else {
                    Err(serde::de::Error::custom(format!(
                        "expected FfdVersion \"{}\", got \"{v}\"",
                        Self::TAG
                    )))
                }
            }
        }
    };
}

ffd_tag! {
    /// `FfdVersion` tag of an FFD 1.05 receipt. Optional on the wire.
    Ffd105Tag => "1.05"
}

ffd_tag! {
    /// `FfdVersion` tag of an FFD 1.2 receipt. Always present on the wire.
    Ffd12Tag => "1.2"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_serialize_as_strings() {
        assert_eq!(serde_json::to_string(&Ffd105Tag).unwrap(), "\"1.05\"");
        assert_eq!(serde_json::to_string(&Ffd12Tag).unwrap(), "\"1.2\"");
    }

    #[test]
    fn test_tag_rejects_other_version() {
        assert!(serde_json::from_str::<Ffd12Tag>("\"1.05\"").is_err());
        assert!(serde_json::from_str::<Ffd105Tag>("\"1.1\"").is_err());
        assert!(serde_json::from_str::<Ffd12Tag>("1.2").is_err());
    }

    #[test]
    fn test_version_lookup() {
        assert_eq!(FfdVersion::from_tag("1.2"), Some(FfdVersion::V12));
        assert_eq!(FfdVersion::from_tag("1.05"), Some(FfdVersion::V105));
        assert_eq!(FfdVersion::from_tag("1.1"), None);
        assert_eq!(FfdVersion::V12.to_string(), "FFD 1.2");
    }
}
