//! Native cryptographic keys backing JSON Web Keys
//!
//! Keys are held in the types of the RustCrypto crates: [`p256`], [`p384`],
//! and [`p521`] for elliptic curves (behind the `ec` feature), [`rsa`] for
//! RSA (behind the `rsa` feature), and plain octets for symmetric keys.
//!
//!   [`p256`]: https://docs.rs/p256
//!   [`p384`]: https://docs.rs/p384
//!   [`p521`]: https://docs.rs/p521
//!   [`rsa`]: https://docs.rs/rsa

use std::fmt;

use crate::jwk::KeyType;

#[cfg(feature = "ec")]
mod ec;
mod import;

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
pub use ec::{EcPublicKey, EcSecretKey};

/// An owned native key of any supported kind
#[derive(Clone)]
pub enum CryptoKey {
    /// An elliptic curve public key
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    EcPublic(EcPublicKey),

    /// An elliptic curve private key
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    EcPrivate(EcSecretKey),

    /// An RSA public key
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    RsaPublic(::rsa::RsaPublicKey),

    /// An RSA private key
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    RsaPrivate(::rsa::RsaPrivateKey),

    /// Symmetric key material
    Symmetric(Vec<u8>),
}

impl CryptoKey {
    /// Borrows the key as a [`CryptoKeyRef`]
    #[must_use]
    pub fn as_key_ref(&self) -> CryptoKeyRef<'_> {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(k) => CryptoKeyRef::EcPublic(k),
            #[cfg(feature = "ec")]
            Self::EcPrivate(k) => CryptoKeyRef::EcPrivate(k),
            #[cfg(feature = "rsa")]
            Self::RsaPublic(k) => CryptoKeyRef::RsaPublic(k),
            #[cfg(feature = "rsa")]
            Self::RsaPrivate(k) => CryptoKeyRef::RsaPrivate(k),
            Self::Symmetric(k) => CryptoKeyRef::Symmetric(k),
        }
    }

    /// The JWK key type for this kind of key
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.as_key_ref().key_type()
    }

    /// Whether the key carries private or secret material
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.as_key_ref().is_private()
    }
}

impl fmt::Debug for CryptoKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.as_key_ref(), f)
    }
}

impl From<Vec<u8>> for CryptoKey {
    fn from(key: Vec<u8>) -> Self {
        Self::Symmetric(key)
    }
}

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
impl From<EcPublicKey> for CryptoKey {
    fn from(key: EcPublicKey) -> Self {
        Self::EcPublic(key)
    }
}

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
impl From<EcSecretKey> for CryptoKey {
    fn from(key: EcSecretKey) -> Self {
        Self::EcPrivate(key)
    }
}

#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
impl From<::rsa::RsaPublicKey> for CryptoKey {
    fn from(key: ::rsa::RsaPublicKey) -> Self {
        Self::RsaPublic(key)
    }
}

#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
impl From<::rsa::RsaPrivateKey> for CryptoKey {
    fn from(key: ::rsa::RsaPrivateKey) -> Self {
        Self::RsaPrivate(key)
    }
}

/// A borrowed handle to the native key behind a JWK
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CryptoKeyRef<'a> {
    /// An elliptic curve public key
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    EcPublic(&'a EcPublicKey),

    /// An elliptic curve private key
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    EcPrivate(&'a EcSecretKey),

    /// An RSA public key
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    RsaPublic(&'a ::rsa::RsaPublicKey),

    /// An RSA private key
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    RsaPrivate(&'a ::rsa::RsaPrivateKey),

    /// Symmetric key material
    Symmetric(&'a [u8]),
}

impl CryptoKeyRef<'_> {
    /// The JWK key type for this kind of key
    #[must_use]
    pub fn key_type(self) -> KeyType {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(_) | Self::EcPrivate(_) => KeyType::Ec,
            #[cfg(feature = "rsa")]
            Self::RsaPublic(_) | Self::RsaPrivate(_) => KeyType::Rsa,
            Self::Symmetric(_) => KeyType::Oct,
        }
    }

    /// Whether the key carries private or secret material
    #[must_use]
    pub fn is_private(self) -> bool {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(_) => false,
            #[cfg(feature = "rsa")]
            Self::RsaPublic(_) => false,
            _ => true,
        }
    }

    /// Copies the native key into an owned [`CryptoKey`]
    pub fn to_crypto_key(self) -> CryptoKey {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(k) => CryptoKey::EcPublic(k.clone()),
            #[cfg(feature = "ec")]
            Self::EcPrivate(k) => CryptoKey::EcPrivate(k.clone()),
            #[cfg(feature = "rsa")]
            Self::RsaPublic(k) => CryptoKey::RsaPublic(k.clone()),
            #[cfg(feature = "rsa")]
            Self::RsaPrivate(k) => CryptoKey::RsaPrivate(k.clone()),
            Self::Symmetric(k) => CryptoKey::Symmetric(k.to_vec()),
        }
    }
}

impl fmt::Debug for CryptoKeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(k) => f.debug_tuple("EcPublic").field(k).finish(),
            #[cfg(feature = "ec")]
            Self::EcPrivate(k) => f.debug_tuple("EcPrivate").field(k).finish(),
            #[cfg(feature = "rsa")]
            Self::RsaPublic(k) => f.debug_tuple("RsaPublic").field(k).finish(),
            #[cfg(feature = "rsa")]
            Self::RsaPrivate(_) => f.debug_tuple("RsaPrivate").field(&"<redacted>").finish(),
            Self::Symmetric(_) => f.debug_tuple("Symmetric").field(&"<redacted>").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_keys_are_redacted() {
        let key = CryptoKey::from(b"super secret".to_vec());
        assert_eq!(format!("{:?}", key), r#"Symmetric("<redacted>")"#);
        assert_eq!(key.key_type(), KeyType::Oct);
        assert!(key.is_private());
    }

    #[test]
    fn borrowed_keys_copy_back_out() {
        let key = CryptoKey::Symmetric(vec![1, 2, 3]);
        match key.as_key_ref().to_crypto_key() {
            CryptoKey::Symmetric(k) => assert_eq!(k, vec![1, 2, 3]),
            #[allow(unreachable_patterns)]
            other => panic!("unexpected key: {:?}", other),
        }
    }
}
