//! Base64url values for JOSE parameters
//!
//! The [`aliri_base64`][] crate provides [`Base64Url`][], an immutable byte
//! buffer that is serialized using the URL-safe Base64 alphabet without
//! padding, as required for the binary members of JSON Web Keys
//! ([RFC7515, Section 2][rfc7515-2]).
//!
//! A value can be read in two ways: as raw octets, or as a big-endian
//! unsigned integer. The integer view follows the JOSE convention that the
//! integer zero is represented by a _single_ zero octet rather than an
//! empty buffer, so an empty value never stands in for zero.
//!
//! Underlying data is stored in raw form. Costs of conversion to base64 are
//! only incurred when formatting or serializing the value.
//!
//!   [`aliri_base64`]: https://docs.rs/aliri_base64
//!   [rfc7515-2]: https://tools.ietf.org/html/rfc7515#section-2
//!
//! # Example
//!
//! ```
//! use aliri_base64::Base64Url;
//!
//! let data = Base64Url::from_raw(vec![3, 236, 255, 224, 193]);
//! assert_eq!(data.to_string(), "A-z_4ME");
//!
//! let decoded = Base64Url::from_encoded("A-z_4ME").unwrap();
//! assert_eq!(decoded.as_slice(), &[3, 236, 255, 224, 193]);
//! ```
//!
//! Integers, including zero:
//!
//! ```
//! use aliri_base64::Base64Url;
//!
//! assert_eq!(Base64Url::from_u64(65537).to_string(), "AQAB");
//! assert_eq!(Base64Url::from_u64(0).as_slice(), &[0]);
//! assert_eq!(Base64Url::from_u64(0).to_string(), "AA");
//! ```
//!
//! Debug output is fenced in backticks:
//!
//! ```
//! use aliri_base64::Base64Url;
//!
//! let data = Base64Url::from_u64(65537);
//! assert_eq!(format!("{:?}", data), "`AQAB`");
//! ```
//!
//! # Decoding rules
//!
//! Decoding is strict: padding characters and characters outside of the
//! URL-safe alphabet are rejected.
//!
//! ```
//! use aliri_base64::Base64Url;
//!
//! assert!(Base64Url::from_encoded("AQ==").is_err());
//! assert!(Base64Url::from_encoded("A+z/4ME").is_err());
//! ```
//!
//! # Features
//!
//! * `serde`: serializes values as base64url strings and decodes them with
//!   the same strict rules.
//! * `bigint`: conversions to and from [`BigUint`][num_bigint_dig::BigUint].

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::{error::Error, fmt};

use base64::engine::{general_purpose::URL_SAFE_NO_PAD, Engine};
#[cfg(feature = "bigint")]
use num_bigint_dig::BigUint;

/// An error while decoding a value which is not properly formatted
/// base64url data
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidBase64Data {
    source: base64::DecodeError,
}

impl From<base64::DecodeError> for InvalidBase64Data {
    fn from(err: base64::DecodeError) -> Self {
        Self { source: err }
    }
}

impl fmt::Display for InvalidBase64Data {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid base64url data")
    }
}

impl Error for InvalidBase64Data {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Owned data to be encoded as URL-safe base64 (no padding)
///
/// Encoding alphabet: `A`–`Z`, `a`–`z`, `0`–`9`, `-`, `_`
///
/// Data is held in memory in its raw form. Costs of serialization
/// are only incurred when serializing or displaying the value in
/// its base64 representation.
///
/// Implementations of the [`From`] trait assume that the underlying
/// structure is in raw form.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
#[must_use]
pub struct Base64Url(Vec<u8>);

impl Base64Url {
    /// Creates an empty buffer
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a new buffer from an owned value
    ///
    /// This function has no cost for [`Vec<u8>`]. Other types incur
    /// the cost of copying into a buffer.
    ///
    /// To decode a base64url-encoded buffer, use [`from_encoded()`][Self::from_encoded()].
    #[inline]
    pub fn from_raw<T: Into<Vec<u8>>>(raw: T) -> Self {
        Self(raw.into())
    }

    /// Constructs a new buffer from a base64url-encoded slice
    ///
    /// # Errors
    ///
    /// The slice contains padding, characters outside of the URL-safe
    /// alphabet, or non-canonical trailing bits.
    pub fn from_encoded<T: AsRef<[u8]>>(enc: T) -> Result<Self, InvalidBase64Data> {
        let data = URL_SAFE_NO_PAD.decode(enc)?;
        Ok(Self(data))
    }

    /// Encodes an unsigned integer using its minimal big-endian representation
    ///
    /// Zero is encoded as a single zero octet.
    pub fn from_u64(x: u64) -> Self {
        if x == 0 {
            return Self(vec![0]);
        }

        let bytes = x.to_be_bytes();
        let skip = bytes.iter().take_while(|&&b| b == 0).count();
        Self(bytes[skip..].to_vec())
    }

    /// Encodes an arbitrary-precision unsigned integer using its minimal
    /// big-endian representation
    ///
    /// Zero is encoded as a single zero octet.
    #[cfg(feature = "bigint")]
    #[cfg_attr(docsrs, doc(cfg(feature = "bigint")))]
    pub fn from_uint(x: &BigUint) -> Self {
        if x.bits() == 0 {
            return Self(vec![0]);
        }

        Self(x.to_bytes_be())
    }

    /// Interprets the buffer as a big-endian unsigned integer
    ///
    /// An empty buffer is interpreted as zero.
    #[cfg(feature = "bigint")]
    #[cfg_attr(docsrs, doc(cfg(feature = "bigint")))]
    #[must_use]
    pub fn to_uint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Interprets the buffer as a big-endian unsigned integer, if it fits
    /// within 64 bits
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        let significant = self.significant_octets();
        if significant.len() > 8 {
            return None;
        }

        Some(
            significant
                .iter()
                .fold(0_u64, |acc, &b| (acc << 8) | u64::from(b)),
        )
    }

    /// Renders the integer interpretation of the buffer as exactly `len`
    /// big-endian octets
    ///
    /// Shorter values are left-padded with zeros. Returns `None` if the
    /// integer does not fit within `len` octets.
    #[must_use]
    pub fn to_padded_octets(&self, len: usize) -> Option<Vec<u8>> {
        let significant = self.significant_octets();
        if significant.len() > len {
            return None;
        }

        let mut buf = vec![0; len - significant.len()];
        buf.extend_from_slice(significant);
        Some(buf)
    }

    fn significant_octets(&self) -> &[u8] {
        let skip = self.0.iter().take_while(|&&b| b == 0).count();
        &self.0[skip..]
    }

    /// Unwraps the underlying buffer
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Provides access to the underlying octets
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// The number of raw octets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the buffer holds no octets
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Calculates the expected length of the base64url-encoding for a buffer of size `len`
    #[inline]
    #[must_use]
    pub const fn calc_encoded_len(len: usize) -> usize {
        let d = len / 3 * 4;
        let m = len % 3;
        if m > 0 {
            d + m + 1
        } else {
            d
        }
    }

    /// Calculates the expected length of the base64url-encoding of this buffer
    #[inline]
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::calc_encoded_len(self.0.len())
    }
}

impl From<Vec<u8>> for Base64Url {
    #[inline]
    fn from(buf: Vec<u8>) -> Self {
        Self(buf)
    }
}

impl From<&'_ [u8]> for Base64Url {
    #[inline]
    fn from(slice: &[u8]) -> Self {
        Self::from_raw(slice)
    }
}

impl From<Base64Url> for Vec<u8> {
    #[inline]
    fn from(val: Base64Url) -> Self {
        val.0
    }
}

impl AsRef<[u8]> for Base64Url {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(&self.0))
    }
}

impl fmt::Debug for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}`", URL_SAFE_NO_PAD.encode(&self.0))
    }
}

/// Serialize the underlying byte array as a base64url string
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl serde::Serialize for Base64Url {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = URL_SAFE_NO_PAD.encode(&self.0);
        serializer.serialize_str(encoded.as_str())
    }
}

/// Deserialize a base64url string and decode it into a byte array
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for Base64Url {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Base64UrlVisitor;

        impl<'de> serde::de::Visitor<'de> for Base64UrlVisitor {
            type Value = Base64Url;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a base64url string without padding")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Base64Url::from_encoded(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Base64UrlVisitor)
    }
}

#[cfg(doctest)]
#[doc(hidden)]
mod doctests {
    /// Verifies that `serde` serialization round-trips
    ///
    /// ```
    /// use serde::{Serialize, Deserialize};
    /// use aliri_base64::Base64Url;
    ///
    /// #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    /// struct MyData {
    ///     data: Base64Url,
    /// }
    ///
    /// let data = MyData {
    ///     data: Base64Url::from_raw(vec![3, 236, 255, 224, 193]),
    /// };
    ///
    /// let serialized = serde_json::to_string(&data).unwrap();
    ///
    /// assert_eq!(serialized, r#"{"data":"A-z_4ME"}"#);
    ///
    /// let deserialized: MyData = serde_json::from_str(&serialized).unwrap();
    ///
    /// assert_eq!(data, deserialized);
    /// ```
    #[cfg(feature = "serde")]
    fn base64url_round_trips_through_serde() -> ! {
        loop {}
    }
}
