//! Holder address type with `rb_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with {prefix}: {raw}")]
    MissingPrefix { prefix: &'static str, raw: String },

    #[error("address body must be non-empty ascii alphanumeric or '_': {0}")]
    InvalidBody(String),
}

/// An identity that can hold ledger balance or a role.
///
/// Holders, the vault, the pool and the administrator are all addressed the
/// same way. Addresses are compared byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// The standard prefix for every address.
    pub const PREFIX: &'static str = "rb_";

    /// Create an address from a trusted string.
    ///
    /// # Panics
    /// Panics if the string is not a well-formed address. Use
    /// [`Address::parse`] for untrusted input such as decoded messages.
    pub fn new(raw: impl Into<String>) -> Self {
        match Self::parse(raw) {
            Ok(address) => address,
            Err(e) => panic!("{e}"),
        }
    }

    /// Parse an address from untrusted input.
    pub fn parse(raw: impl Into<String>) -> Result<Self, AddressError> {
        let s = raw.into();
        let Some(body) = s.strip_prefix(Self::PREFIX) else {
            return Err(AddressError::MissingPrefix {
                prefix: Self::PREFIX,
                raw: s,
            });
        };
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(AddressError::InvalidBody(s));
        }
        Ok(Self(s))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
