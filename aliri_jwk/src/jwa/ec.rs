//! Elliptic curve key parameters ([RFC7518, Section 6.2][rfc7518-6.2])
//!
//! [rfc7518-6.2]: https://tools.ietf.org/html/rfc7518#section-6.2

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error;

mod private;
mod public;

pub use private::PrivateKey;
pub use public::PublicKey;

/// A named elliptic curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curve {
    /// The P-256 curve (prime256v1/secp256r1)
    #[serde(rename = "P-256")]
    P256,

    /// The P-384 curve (secp384r1)
    #[serde(rename = "P-384")]
    P384,

    /// The P-521 curve (secp521r1)
    #[serde(rename = "P-521")]
    P521,
}

impl Curve {
    /// The name of the curve as it appears in the `crv` member
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// The length in octets of a field element, and so of each of the
    /// `x`, `y`, and `d` members
    #[must_use]
    pub const fn field_len(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// Resolves a curve from its `crv` name
    ///
    /// # Errors
    ///
    /// The name is not one of `P-256`, `P-384`, or `P-521`.
    pub fn from_name(name: &str) -> Result<Self, error::Unsupported> {
        match name {
            "P-256" => Ok(Self::P256),
            "P-384" => Ok(Self::P384),
            "P-521" => Ok(Self::P521),
            _ => Err(error::Unsupported::Curve(name.to_owned())),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
