//! Caller principals.
//!
//! A principal is the opaque identity the identity provider hands us. We
//! only ever need its textual form: it is shown to users, pasted into the
//! vendor access form, and forwarded to the backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a textual principal.
const MAX_TEXT_LEN: usize = 63;

/// Characters per dash-separated group.
const GROUP_LEN: usize = 5;

/// Errors from parsing a textual principal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    #[error("principal is empty")]
    Empty,
    #[error("principal is longer than {MAX_TEXT_LEN} characters")]
    TooLong,
    #[error("principal contains invalid character {0:?}")]
    InvalidChar(char),
    #[error("principal group {0} has the wrong length")]
    MalformedGroup(usize),
}

/// Textual principal of a caller.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Parse and validate a textual principal, trimming surrounding space.
    ///
    /// # Errors
    ///
    /// Returns `PrincipalError` if the text is not lowercase base32 in
    /// five-character groups separated by dashes.
    pub fn from_text(text: &str) -> Result<Self, PrincipalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PrincipalError::Empty);
        }
        if text.len() > MAX_TEXT_LEN {
            return Err(PrincipalError::TooLong);
        }
        if let Some(bad) = text
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | '2'..='7' | '-'))
        {
            return Err(PrincipalError::InvalidChar(bad));
        }

        let groups: Vec<&str> = text.split('-').collect();
        let last = groups.len() - 1;
        for (index, group) in groups.iter().enumerate() {
            let ok = if index == last {
                (1..=GROUP_LEN).contains(&group.len())
            } else {
                group.len() == GROUP_LEN
            };
            if !ok {
                return Err(PrincipalError::MalformedGroup(index + 1));
            }
        }

        Ok(Self(text.to_string()))
    }

    /// The full textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` characters followed by `...`, for compact display.
    #[must_use]
    pub fn abbreviated(&self, len: usize) -> String {
        let prefix: String = self.0.chars().take(len).collect();
        format!("{prefix}...")
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_text(&value)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}
