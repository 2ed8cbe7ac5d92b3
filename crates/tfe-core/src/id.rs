//! Resource identifiers and the structural checks applied to them.
//!
//! Terraform Enterprise identifiers are opaque strings such as `var-EavQ1LztoRTQHSNT`.
//! Locally we only check their shape; whether the resource exists is always
//! the server's call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Returns true if the value is present and non-empty.
#[must_use]
pub fn valid_string(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Returns true if the value is non-empty and only contains `[A-Za-z0-9-._]`.
#[must_use]
pub fn valid_string_id(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

/// Macro to generate strongly-typed identifier wrappers.
macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident, $resource:literal, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Resource name used in error messages.
            pub const RESOURCE: &'static str = $resource;

            /// Parses and validates an identifier.
            ///
            /// # Errors
            ///
            /// Returns [`Error::InvalidIdentifier`] if the string is empty or
            /// contains characters outside `[A-Za-z0-9-._]`.
            pub fn parse_str(input: &str) -> Result<Self> {
                if valid_string_id(input) {
                    Ok(Self(input.to_string()))
                } else {
                    Err(Error::InvalidIdentifier(Self::RESOURCE))
                }
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Converts into the inner string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

resource_id!(VariableId, "variable", "Variable identifier (`var-...`)");
resource_id!(WorkspaceId, "workspace", "Workspace identifier (`ws-...`)");

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ID: &str = "var-EavQ1LztoRTQHSNT";

    #[test]
    fn test_valid_string() {
        assert!(valid_string(Some("org")));
        assert!(!valid_string(Some("")));
        assert!(!valid_string(None));
    }

    #[test]
    fn test_valid_string_id() {
        assert!(valid_string_id(VALID_ID));
        assert!(valid_string_id("ws-a.b_c"));
        assert!(!valid_string_id(""));
        assert!(!valid_string_id("var/../secrets"));
        assert!(!valid_string_id("! / nope"));
        assert!(!valid_string_id("var 1"));
    }

    #[test]
    fn test_variable_id_parse_str_valid() {
        let id = VariableId::parse_str(VALID_ID).unwrap();
        assert_eq!(id.as_str(), VALID_ID);
        assert_eq!(id.to_string(), VALID_ID);
    }

    #[test]
    fn test_variable_id_parse_str_invalid() {
        let err = VariableId::parse_str("! / nope").unwrap_err();
        assert_eq!(err, Error::InvalidIdentifier("variable"));
        assert_eq!(err.to_string(), "Invalid value for variable ID");
    }

    #[test]
    fn test_workspace_id_error_names_resource() {
        let err: Error = "".parse::<WorkspaceId>().unwrap_err();
        assert_eq!(err, Error::InvalidIdentifier("workspace"));
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = VariableId::parse_str(VALID_ID).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{VALID_ID}\""));

        let back: VariableId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
