//! Cart identity resolution and cache key derivation.
use std::fmt;

use thiserror::Error;

use crate::domain::{CustomerId, Error, SessionId};

/// Who a cart belongs to for the current request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartIdentity {
    /// Authenticated customer.
    User(CustomerId),
    /// Anonymous visitor.
    Session(SessionId),
}

impl CartIdentity {
    /// Pick the identity for a request.
    ///
    /// The authenticated user wins when both ids are present; a request
    /// carrying neither is a caller bug.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::{CartIdentity, CustomerId, ErrorCode, SessionId};
    ///
    /// let session = SessionId::new("anon-1").expect("valid session id");
    /// let identity = CartIdentity::resolve(Some(CustomerId::new(5)), Some(session))
    ///     .expect("identity present");
    /// assert_eq!(identity, CartIdentity::User(CustomerId::new(5)));
    ///
    /// let err = CartIdentity::resolve(None, None).expect_err("no identity");
    /// assert_eq!(err.code(), ErrorCode::MissingIdentity);
    /// ```
    pub fn resolve(user_id: Option<CustomerId>, session_id: Option<SessionId>) -> Result<Self, Error> {
        match (user_id, session_id) {
            (Some(user_id), _) => Ok(Self::User(user_id)),
            (None, Some(session_id)) => Ok(Self::Session(session_id)),
            (None, None) => Err(Error::missing_identity()),
        }
    }

    /// Deterministic cache key for this identity.
    pub fn cache_key(&self) -> CartKey {
        match self {
            Self::User(user_id) => CartKey(format!("cart:user:{user_id}")),
            Self::Session(session_id) => CartKey(format!("cart:session:{session_id}")),
        }
    }
}

impl fmt::Display for CartIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(user_id) => write!(f, "user {user_id}"),
            Self::Session(session_id) => write!(f, "session {session_id}"),
        }
    }
}

/// Cache key a cart document is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey(String);

impl CartKey {
    /// Construct a cache key after validating that it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, CartKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CartKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CartKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CartKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CartKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("cart key must not be empty")]
    Empty,
    /// Key contains leading or trailing whitespace.
    #[error("cart key must not contain surrounding whitespace")]
    ContainsWhitespace,
}
