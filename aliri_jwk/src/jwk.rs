//! Implementations of the JSON Web Keys (JWK) standard
//!
//! JSON Web Keys are defined in [RFC7517][].
//!
//! [RFC7517]: https://tools.ietf.org/html/rfc7517

use std::fmt;

use aliri_braid::braid;
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::{
    error::{self, JwkError, KeyTypeMismatch},
    jwa,
    native::{CryptoKey, CryptoKeyRef},
};

/// An identifier for a JWK
#[braid(serde, ref_doc = "A borrowed reference to JWK identifier ([`KeyId`])")]
pub struct KeyId;

/// The family of a key (`kty`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyType {
    /// Elliptic curve
    #[serde(rename = "EC")]
    Ec,

    /// RSA
    #[serde(rename = "RSA")]
    Rsa,

    /// Octet sequence, used for symmetric keys
    #[serde(rename = "oct")]
    Oct,
}

impl KeyType {
    /// The value as it appears in a JWK
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ec => "EC",
            Self::Rsa => "RSA",
            Self::Oct => "oct",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters common to every key type
///
/// When constructing a key, an unset key type is filled in from the key
/// itself. A key type that is set explicitly must agree with the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct Params {
    key_type: Option<KeyType>,
    usage: Option<jwa::Usage>,
    key_operations: Vec<jwa::KeyOperation>,
    algorithm: Option<jwa::Algorithm>,
    key_id: Option<KeyId>,
}

impl Params {
    /// Empty parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expected key type
    pub fn with_key_type(self, key_type: KeyType) -> Self {
        Self {
            key_type: Some(key_type),
            ..self
        }
    }

    /// Sets the intended use of the key
    pub fn with_usage(self, usage: jwa::Usage) -> Self {
        Self {
            usage: Some(usage),
            ..self
        }
    }

    /// Sets the operations the key is intended for
    pub fn with_key_operations(
        self,
        key_operations: impl IntoIterator<Item = jwa::KeyOperation>,
    ) -> Self {
        Self {
            key_operations: key_operations.into_iter().collect(),
            ..self
        }
    }

    /// Sets the algorithm the key is intended for
    pub fn with_algorithm(self, algorithm: impl Into<jwa::Algorithm>) -> Self {
        Self {
            algorithm: Some(algorithm.into()),
            ..self
        }
    }

    /// Sets the key ID
    pub fn with_key_id(self, key_id: KeyId) -> Self {
        Self {
            key_id: Some(key_id),
            ..self
        }
    }

    /// The key type
    ///
    /// Always set on the parameters of a constructed or parsed key.
    #[must_use]
    pub fn key_type(&self) -> Option<KeyType> {
        self.key_type
    }

    /// The intended use of the key
    #[must_use]
    pub fn usage(&self) -> Option<&jwa::Usage> {
        self.usage.as_ref()
    }

    /// The operations the key is intended for
    #[must_use]
    pub fn key_operations(&self) -> &[jwa::KeyOperation] {
        &self.key_operations
    }

    /// The algorithm the key is intended for
    #[must_use]
    pub fn algorithm(&self) -> Option<&jwa::AlgorithmRef> {
        self.algorithm.as_deref()
    }

    /// The key ID
    #[must_use]
    pub fn key_id(&self) -> Option<&KeyIdRef> {
        self.key_id.as_deref()
    }

    pub(crate) fn resolve(self, expected: KeyType) -> Result<Self, KeyTypeMismatch> {
        match self.key_type {
            Some(kty) if kty != expected => Err(error::key_type_mismatch(expected, kty.as_str())),
            _ => Ok(Self {
                key_type: Some(expected),
                ..self
            }),
        }
    }

    pub(crate) fn to_dto(&self, kty: KeyType) -> ParamsDtoRef<'_> {
        ParamsDtoRef {
            kty,
            usage: self.usage(),
            key_ops: self.key_operations(),
            algorithm: self.algorithm(),
            key_id: self.key_id(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParamsDto {
    #[serde(default)]
    kty: Option<String>,

    #[serde(rename = "use", default)]
    usage: Option<jwa::Usage>,

    #[serde(default)]
    key_ops: Option<Vec<jwa::KeyOperation>>,

    #[serde(rename = "alg", default)]
    algorithm: Option<jwa::Algorithm>,

    #[serde(rename = "kid", default)]
    key_id: Option<KeyId>,
}

impl ParamsDto {
    pub(crate) fn into_params(self, expected: KeyType) -> Result<Params, JwkError> {
        match self.kty {
            None => return Err(error::missing_parameter("kty").into()),
            Some(kty) if kty != expected.as_str() => {
                return Err(error::key_type_mismatch(expected, kty).into())
            }
            Some(_) => {}
        }

        Ok(Params {
            key_type: Some(expected),
            usage: self.usage,
            key_operations: self.key_ops.unwrap_or_default(),
            algorithm: self.algorithm,
            key_id: self.key_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ParamsDtoRef<'a> {
    kty: KeyType,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    usage: Option<&'a jwa::Usage>,

    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    key_ops: &'a [jwa::KeyOperation],

    #[serde(rename = "alg", skip_serializing_if = "Option::is_none")]
    algorithm: Option<&'a jwa::AlgorithmRef>,

    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    key_id: Option<&'a KeyIdRef>,
}

/// Capabilities shared by every kind of JSON Web Key
pub trait Key {
    /// The common parameters of the key
    fn params(&self) -> &Params;

    /// A handle to the native cryptographic key
    fn crypto_key(&self) -> CryptoKeyRef<'_>;

    /// The key ID, or an empty string if unset
    fn id(&self) -> &str {
        self.params().key_id().map_or("", KeyIdRef::as_str)
    }
}

/// A JSON Web Key of any supported type
///
/// Parsing selects the variant from the `kty` member and the presence of
/// the private `d` member, and then decodes the whole object through that
/// variant's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Jwk {
    /// An elliptic curve public key
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    EcPublic(jwa::ec::PublicKey),

    /// An elliptic curve private key
    #[cfg(feature = "ec")]
    #[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
    EcPrivate(jwa::ec::PrivateKey),

    /// An RSA public key
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    RsaPublic(jwa::rsa::PublicKey),

    /// An RSA private key
    #[cfg(feature = "rsa")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
    RsaPrivate(jwa::rsa::PrivateKey),

    /// A symmetric key
    Oct(jwa::OctetSequence),
}

#[derive(Deserialize)]
struct Hints {
    #[serde(default)]
    kty: Option<String>,

    #[serde(default)]
    d: Option<IgnoredAny>,
}

impl Jwk {
    /// Wraps a native key, deriving the JWK members from it
    ///
    /// # Errors
    ///
    /// The parameters declare a different key type, or the key is not
    /// acceptable to its schema.
    pub fn new(key: CryptoKey, params: Params) -> Result<Self, JwkError> {
        let jwk = match key {
            #[cfg(feature = "ec")]
            CryptoKey::EcPublic(k) => Self::EcPublic(jwa::ec::PublicKey::new(k, params)?),
            #[cfg(feature = "ec")]
            CryptoKey::EcPrivate(k) => Self::EcPrivate(jwa::ec::PrivateKey::new(k, params)?),
            #[cfg(feature = "rsa")]
            CryptoKey::RsaPublic(k) => Self::RsaPublic(jwa::rsa::PublicKey::new(k, params)?),
            #[cfg(feature = "rsa")]
            CryptoKey::RsaPrivate(k) => Self::RsaPrivate(jwa::rsa::PrivateKey::new(k, params)?),
            CryptoKey::Symmetric(k) => Self::Oct(jwa::OctetSequence::new(k, params)?),
        };

        Ok(jwk)
    }

    /// Parses a JWK of any supported type from JSON
    ///
    /// # Errors
    ///
    /// The JSON is malformed, `kty` is absent or unsupported, or the
    /// selected schema rejects the key.
    pub fn parse(json: impl AsRef<[u8]>) -> Result<Self, JwkError> {
        let json = json.as_ref();
        let hints: Hints = serde_json::from_slice(json)?;
        let kty = hints.kty.ok_or_else(|| error::missing_parameter("kty"))?;
        let private = hints.d.is_some();

        #[cfg(feature = "tracing")]
        tracing::debug!(jwk.kty = %kty, jwk.private = private, "decoding JWK");

        let jwk = match (kty.as_str(), private) {
            #[cfg(feature = "ec")]
            ("EC", false) => Self::EcPublic(jwa::ec::PublicKey::parse(json)?),
            #[cfg(feature = "ec")]
            ("EC", true) => Self::EcPrivate(jwa::ec::PrivateKey::parse(json)?),
            #[cfg(feature = "rsa")]
            ("RSA", false) => Self::RsaPublic(jwa::rsa::PublicKey::parse(json)?),
            #[cfg(feature = "rsa")]
            ("RSA", true) => Self::RsaPrivate(jwa::rsa::PrivateKey::parse(json)?),
            ("oct", _) => Self::Oct(jwa::OctetSequence::parse(json)?),
            (other, _) => return Err(error::Unsupported::KeyType(other.to_owned()).into()),
        };

        Ok(jwk)
    }

    /// The key type
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(_) | Self::EcPrivate(_) => KeyType::Ec,
            #[cfg(feature = "rsa")]
            Self::RsaPublic(_) | Self::RsaPrivate(_) => KeyType::Rsa,
            Self::Oct(_) => KeyType::Oct,
        }
    }

    /// Whether the key carries private or secret material
    #[must_use]
    pub fn is_private(&self) -> bool {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(_) => false,
            #[cfg(feature = "rsa")]
            Self::RsaPublic(_) => false,
            _ => true,
        }
    }

    /// The key ID
    #[must_use]
    pub fn key_id(&self) -> Option<&KeyIdRef> {
        self.params().key_id()
    }

    /// The intended use of the key
    #[must_use]
    pub fn usage(&self) -> Option<&jwa::Usage> {
        self.params().usage()
    }

    /// The algorithm the key is intended for
    #[must_use]
    pub fn algorithm(&self) -> Option<&jwa::AlgorithmRef> {
        self.params().algorithm()
    }

    /// Sets the key ID
    pub fn with_key_id(mut self, kid: KeyId) -> Self {
        self.params_mut().key_id = Some(kid);
        self
    }

    /// Sets the key's usage
    pub fn with_usage(mut self, usage: jwa::Usage) -> Self {
        self.params_mut().usage = Some(usage);
        self
    }

    /// Sets the algorithm the key is intended for
    pub fn with_algorithm(mut self, alg: impl Into<jwa::Algorithm>) -> Self {
        self.params_mut().algorithm = Some(alg.into());
        self
    }

    /// Strips any private key components
    ///
    /// Symmetric keys are returned unchanged.
    pub fn public_only(self) -> Self {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPrivate(k) => Self::EcPublic(k.into_public_key()),
            #[cfg(feature = "rsa")]
            Self::RsaPrivate(k) => Self::RsaPublic(k.into_public_key()),
            other => other,
        }
    }

    fn params_mut(&mut self) -> &mut Params {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(k) => k.params_mut(),
            #[cfg(feature = "ec")]
            Self::EcPrivate(k) => k.params_mut(),
            #[cfg(feature = "rsa")]
            Self::RsaPublic(k) => k.params_mut(),
            #[cfg(feature = "rsa")]
            Self::RsaPrivate(k) => k.params_mut(),
            Self::Oct(k) => k.params_mut(),
        }
    }
}

impl Key for Jwk {
    fn params(&self) -> &Params {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(k) => k.params(),
            #[cfg(feature = "ec")]
            Self::EcPrivate(k) => k.params(),
            #[cfg(feature = "rsa")]
            Self::RsaPublic(k) => k.params(),
            #[cfg(feature = "rsa")]
            Self::RsaPrivate(k) => k.params(),
            Self::Oct(k) => k.params(),
        }
    }

    fn crypto_key(&self) -> CryptoKeyRef<'_> {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(k) => k.crypto_key(),
            #[cfg(feature = "ec")]
            Self::EcPrivate(k) => k.crypto_key(),
            #[cfg(feature = "rsa")]
            Self::RsaPublic(k) => k.crypto_key(),
            #[cfg(feature = "rsa")]
            Self::RsaPrivate(k) => k.crypto_key(),
            Self::Oct(k) => k.crypto_key(),
        }
    }
}

impl Serialize for Jwk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            #[cfg(feature = "ec")]
            Self::EcPublic(k) => k.serialize(serializer),
            #[cfg(feature = "ec")]
            Self::EcPrivate(k) => k.serialize(serializer),
            #[cfg(feature = "rsa")]
            Self::RsaPublic(k) => k.serialize(serializer),
            #[cfg(feature = "rsa")]
            Self::RsaPrivate(k) => k.serialize(serializer),
            Self::Oct(k) => k.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Jwk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Self::parse(raw.get()).map_err(serde::de::Error::custom)
    }
}

impl From<jwa::OctetSequence> for Jwk {
    fn from(key: jwa::OctetSequence) -> Self {
        Self::Oct(key)
    }
}

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
impl From<jwa::ec::PublicKey> for Jwk {
    fn from(key: jwa::ec::PublicKey) -> Self {
        Self::EcPublic(key)
    }
}

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
impl From<jwa::ec::PrivateKey> for Jwk {
    fn from(key: jwa::ec::PrivateKey) -> Self {
        Self::EcPrivate(key)
    }
}

#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
impl From<jwa::rsa::PublicKey> for Jwk {
    fn from(key: jwa::rsa::PublicKey) -> Self {
        Self::RsaPublic(key)
    }
}

#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
impl From<jwa::rsa::PrivateKey> for Jwk {
    fn from(key: jwa::rsa::PrivateKey) -> Self {
        Self::RsaPrivate(key)
    }
}
