//! Common errors

#![allow(missing_copy_implementations)]

use std::error::Error as StdError;

use thiserror::Error;

use crate::jwk::KeyType;

/// The input is not valid JSON, or does not have the shape of a JWK
#[derive(Debug, Error)]
#[error("malformed JWK")]
pub struct MalformedJwk {
    #[from]
    source: serde_json::Error,
}

pub(crate) fn malformed_jwk(source: serde_json::Error) -> MalformedJwk {
    MalformedJwk { source }
}

/// The declared key type is inconsistent with the key
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("expected key type '{expected}', found '{found}'")]
pub struct KeyTypeMismatch {
    expected: KeyType,
    found: String,
}

impl KeyTypeMismatch {
    /// The key type required by the key
    #[must_use]
    pub fn expected(&self) -> KeyType {
        self.expected
    }

    /// The key type that was declared
    #[must_use]
    pub fn found(&self) -> &str {
        &self.found
    }
}

pub(crate) fn key_type_mismatch(expected: KeyType, found: impl Into<String>) -> KeyTypeMismatch {
    KeyTypeMismatch {
        expected,
        found: found.into(),
    }
}

/// A parameter required by the key type is absent
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("missing required parameter '{param}'")]
pub struct MissingParameter {
    param: &'static str,
}

impl MissingParameter {
    /// The name of the missing JWK member
    #[must_use]
    pub fn param(&self) -> &'static str {
        self.param
    }
}

pub(crate) const fn missing_parameter(param: &'static str) -> MissingParameter {
    MissingParameter { param }
}

/// A value is outside of the supported set
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
#[non_exhaustive]
pub enum Unsupported {
    /// The `kty` value is not a supported key type
    #[error("unsupported key type '{0}'")]
    KeyType(String),

    /// The curve is not one of `P-256`, `P-384`, or `P-521`
    #[error("unsupported elliptic curve '{0}'")]
    Curve(String),

    /// The RSA key has more than two prime factors
    #[error("multi-prime RSA keys are not supported")]
    MultiPrime,
}

/// The key was rejected
#[derive(Debug, Error)]
#[error("key rejected: {source}")]
pub struct KeyRejected {
    #[from]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

pub(crate) fn key_rejected(
    source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
) -> KeyRejected {
    KeyRejected {
        source: source.into(),
    }
}

/// The native key is of a kind that cannot be represented as a JWK
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("unsupported key kind '{kind}'")]
pub struct UnsupportedKeyKind {
    kind: String,
}

impl UnsupportedKeyKind {
    /// A description of the unsupported kind, usually an algorithm OID
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

pub(crate) fn unsupported_key_kind(kind: impl Into<String>) -> UnsupportedKeyKind {
    UnsupportedKeyKind { kind: kind.into() }
}

/// An error occurring while constructing or parsing a JWK
#[derive(Debug, Error)]
pub enum JwkError {
    /// The JSON is malformed
    #[error(transparent)]
    Malformed(#[from] MalformedJwk),

    /// The key type does not match the key or the parser
    #[error(transparent)]
    KeyTypeMismatch(#[from] KeyTypeMismatch),

    /// A required parameter is missing
    #[error(transparent)]
    MissingParameter(#[from] MissingParameter),

    /// A value is outside of the supported set
    #[error(transparent)]
    Unsupported(#[from] Unsupported),

    /// The key parameters are present but do not form a valid key
    #[error(transparent)]
    KeyRejected(#[from] KeyRejected),

    /// The native key cannot be represented as a JWK
    #[error(transparent)]
    UnsupportedKeyKind(#[from] UnsupportedKeyKind),
}

impl From<serde_json::Error> for JwkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(malformed_jwk(err))
    }
}

impl JwkError {
    /// Whether the error is due to malformed JSON
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    /// Whether the error is due to a key type mismatch
    #[must_use]
    pub fn is_key_type_mismatch(&self) -> bool {
        matches!(self, Self::KeyTypeMismatch(_))
    }

    /// The name of the missing parameter, if that is the cause of the error
    #[must_use]
    pub fn missing_parameter(&self) -> Option<&'static str> {
        match self {
            Self::MissingParameter(m) => Some(m.param()),
            _ => None,
        }
    }

    /// Whether the error is due to an unsupported value
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Whether the key was rejected as invalid
    #[must_use]
    pub fn is_key_rejected(&self) -> bool {
        matches!(self, Self::KeyRejected(_))
    }

    /// Whether the error is due to an unsupported native key kind
    #[must_use]
    pub fn is_unsupported_key_kind(&self) -> bool {
        matches!(self, Self::UnsupportedKeyKind(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_names_the_field() {
        let err = JwkError::from(missing_parameter("n"));
        assert_eq!(err.missing_parameter(), Some("n"));
        assert_eq!(err.to_string(), "missing required parameter 'n'");
    }

    #[test]
    fn key_type_mismatch_names_both_types() {
        let err = JwkError::from(key_type_mismatch(KeyType::Rsa, "EC"));
        assert!(err.is_key_type_mismatch());
        assert_eq!(err.to_string(), "expected key type 'RSA', found 'EC'");
    }

    #[test]
    fn key_rejected_carries_reason() {
        let err = JwkError::from(key_rejected("empty symmetric key"));
        assert!(err.is_key_rejected());
        assert_eq!(err.to_string(), "key rejected: empty symmetric key");
    }

    #[test]
    fn serde_errors_are_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(JwkError::from(err).is_malformed());
    }
}
