//! This crate implements JSON Web Keys and JWK Sets for elliptic curve, RSA,
//! and symmetric keys, following:
//!
//! * JSON Web Key (JWK): [RFC7517][]
//! * JSON Web Algorithms (JWA): [RFC7518][], Section 6
//!
//! Every key decoded from JSON is reconstructed into a native key from the
//! RustCrypto crates and checked for consistency before it is accepted.
//! Parsing selects the key schema from `kty`, and from the presence of the
//! private member `d`.
//!
//! [RFC7517]: https://tools.ietf.org/html/rfc7517
//! [RFC7518]: https://tools.ietf.org/html/rfc7518
//!
//! # Example
//!
//! ```
//! use aliri_jwk::{jwa, Jwk, Jwks, KeyIdRef, KeyType};
//!
//! let jwks = Jwks::parse(r#"{"keys":[
//!     {"kty":"oct","alg":"A128KW","k":"GawgguFyGrWKav7AX4VKUg"},
//!     {"kty":"oct","kid":"hmac","use":"sig","k":"AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr_T-1qS0gZH75aKtMN3Yj0iPS4hcgUuTwjAzZr1Z9CAow"}
//! ]}"#)?;
//!
//! let key = jwks.get_keys_by_id(KeyIdRef::from_str("hmac")).next().unwrap();
//! assert_eq!(key.key_type(), KeyType::Oct);
//! assert_eq!(key.usage(), Some(&jwa::Usage::Signing));
//!
//! let json = serde_json::to_string(key)?;
//! assert_eq!(Jwk::parse(json)?, *key);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Features
//!
//! * `ec` (default): elliptic curve keys on P-256, P-384, and P-521
//! * `rsa` (default): two-prime RSA keys
//! * `tracing`: emits `debug` events while decoding keys and key sets

#![cfg_attr(docsrs, feature(doc_cfg))]
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

pub mod error;
pub mod jwa;
pub mod jwk;
mod jwks;
pub mod native;


#[doc(inline)]
pub use error::JwkError;
#[doc(inline)]
pub use jwk::{Jwk, Key, KeyId, KeyIdRef, KeyType, Params};
#[doc(inline)]
pub use jwks::Jwks;
#[doc(inline)]
pub use native::{CryptoKey, CryptoKeyRef};
