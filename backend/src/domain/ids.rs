//! Identifier newtypes shared by carts, orders, and the catalogue.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database identifier.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw database identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

define_numeric_id! {
    /// Catalogue product identifier.
    ProductId
}

define_numeric_id! {
    /// Registered customer identifier; also the authenticated cart owner.
    CustomerId
}

define_numeric_id! {
    /// Durable order identifier.
    OrderId
}

/// Validation errors returned by [`SessionId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionIdValidationError {
    /// Session id is empty after trimming whitespace.
    #[error("session id must not be empty")]
    Empty,
    /// Session id contains whitespace.
    #[error("session id must not contain whitespace")]
    ContainsWhitespace,
}

/// Opaque anonymous-session identifier issued by the surrounding HTTP layer.
///
/// The core never generates session ids; it only keys carts by them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validate and construct a session id.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::SessionId;
    ///
    /// let id = SessionId::new("b7f2c9").expect("valid session id");
    /// assert_eq!(id.as_ref(), "b7f2c9");
    /// assert!(SessionId::new(" ").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionIdValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SessionIdValidationError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(SessionIdValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    //! Identifier construction and serialisation checks.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn session_id_rejects_blank(#[case] raw: &str) {
        assert_eq!(SessionId::new(raw), Err(SessionIdValidationError::Empty));
    }

    #[rstest]
    #[case("abc def")]
    #[case(" abc")]
    fn session_id_rejects_whitespace(#[case] raw: &str) {
        assert_eq!(
            SessionId::new(raw),
            Err(SessionIdValidationError::ContainsWhitespace)
        );
    }

    #[rstest]
    fn numeric_ids_serialise_transparently() {
        let encoded = serde_json::to_string(&ProductId::new(42)).expect("serialise id");
        assert_eq!(encoded, "42");
    }
}
