use std::fmt;

use crate::error::{ModelError, Result};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Build an id, rejecting blank input.
            pub fn new(raw: impl Into<String>) -> Result<Self> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(ModelError::EmptyId($label));
                }
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ModelError;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ModelError;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a movie or series in the catalog.
    ContentId,
    "content"
);

string_id!(
    /// Identifier of a viewer profile.
    ProfileId,
    "profile"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        assert_eq!(ContentId::new("  "), Err(ModelError::EmptyId("content")));
        assert_eq!(ProfileId::new(""), Err(ModelError::EmptyId("profile")));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ContentId::new("m-42").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m-42\"");
        let back: ContentId = serde_json::from_str("\"m-42\"").unwrap();
        assert_eq!(back, id);
    }
}
