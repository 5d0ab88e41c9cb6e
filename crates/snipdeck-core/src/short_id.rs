use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A validated public identifier for a command.
///
/// Short ids contain only lowercase ASCII letters and digits and are
/// 1-32 characters long. Generated ids are 6 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortId(String);

pub const MIN_LENGTH: usize = 1;
pub const MAX_LENGTH: usize = 32;

impl ShortId {
    /// Creates a new `ShortId` after validating the input.
    pub fn new(id: impl Into<String>) -> std::result::Result<Self, CoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Creates a `ShortId` without validation.
    ///
    /// Use this only for ids produced by trusted internal sources
    /// (generators, rows read back from storage).
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Path of the raw code endpoint, prefixed with the public base URL.
    pub fn raw_link(&self, base_url: &str) -> String {
        format!("{}/raw/{}", base_url.trim_end_matches('/'), self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> std::result::Result<(), CoreError> {
        if id.len() < MIN_LENGTH || id.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortId(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                id.len()
            )));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(CoreError::InvalidShortId(format!(
                "must contain only lowercase letters and digits: '{}'",
                id
            )));
        }

        Ok(())
    }
}

impl Display for ShortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShortId {
    type Error = CoreError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortId> for String {
    fn from(value: ShortId) -> Self {
        value.0
    }
}

/// How a caller-supplied identifier resolves to a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identifier {
    /// An all-digit identifier, treated as the numeric id.
    Id(i64),
    /// Anything else that is a well-formed short id.
    Short(ShortId),
    /// Cannot name any stored command (digits out of range, bad characters).
    Unresolvable,
}

impl Identifier {
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw.parse().map_or(Self::Unresolvable, Self::Id);
        }

        ShortId::new(raw).map_or(Self::Unresolvable, Self::Short)
    }
}
