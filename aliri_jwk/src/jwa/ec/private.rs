use std::{convert::TryFrom, fmt};

use aliri_base64::Base64Url;
use serde::{Deserialize, Serialize, Serializer};

use super::public::{PublicKeyDto, PublicKeyDtoRef};
use crate::{
    error::{self, JwkError},
    jwa::ec::{Curve, PublicKey},
    jwk::{Key, KeyType, Params},
    native::{CryptoKeyRef, EcSecretKey},
};

/// Elliptic curve private key parameters
///
/// The public portion is always derived from the private scalar, so the
/// two can never disagree.
#[derive(Clone, Deserialize)]
#[serde(try_from = "PrivateKeyDto")]
#[must_use]
pub struct PrivateKey {
    public_key: PublicKey,
    d: Base64Url,
    native: EcSecretKey,
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key && self.d == other.d
    }
}

impl Eq for PrivateKey {}

impl PrivateKey {
    /// Derives the JWK members from a native private key
    ///
    /// # Errors
    ///
    /// The parameters declare a key type other than `EC`.
    pub fn new(key: EcSecretKey, params: Params) -> Result<Self, JwkError> {
        let public_key = PublicKey::new(key.public_key(), params)?;
        Ok(Self {
            public_key,
            d: Base64Url::from_raw(key.to_scalar()),
            native: key,
        })
    }

    /// Parses an elliptic curve private key from JSON
    ///
    /// # Errors
    ///
    /// The JSON is malformed, `kty` is not `EC`, a member is missing, the
    /// curve is unsupported, or `d` does not correspond to the point.
    pub fn parse(json: impl AsRef<[u8]>) -> Result<Self, JwkError> {
        let dto: PrivateKeyDto = serde_json::from_slice(json.as_ref())?;
        Self::try_from(dto)
    }

    /// The public portion of the key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// A copy of the public portion of the key
    pub fn to_public(&self) -> PublicKey {
        self.public_key.clone()
    }

    /// Extracts the public portion of the key
    pub fn into_public_key(self) -> PublicKey {
        self.public_key
    }

    /// The common parameters
    pub fn params(&self) -> &Params {
        self.public_key.params()
    }

    pub(crate) fn params_mut(&mut self) -> &mut Params {
        self.public_key.params_mut()
    }

    /// The named curve
    #[must_use]
    pub fn curve(&self) -> Curve {
        self.public_key.curve()
    }

    /// The private scalar, at the full field length of the curve
    #[must_use]
    pub fn d(&self) -> &Base64Url {
        &self.d
    }

    /// The native private key
    #[must_use]
    pub fn native(&self) -> &EcSecretKey {
        &self.native
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .field("d", &"<redacted>")
            .finish()
    }
}

impl Key for PrivateKey {
    fn params(&self) -> &Params {
        self.public_key.params()
    }

    fn crypto_key(&self) -> CryptoKeyRef<'_> {
        CryptoKeyRef::EcPrivate(&self.native)
    }
}

#[derive(Debug, Deserialize)]
struct PrivateKeyDto {
    #[serde(flatten)]
    public_key: PublicKeyDto,

    #[serde(default)]
    d: Option<Base64Url>,
}

impl TryFrom<PrivateKeyDto> for PrivateKey {
    type Error = JwkError;

    fn try_from(dto: PrivateKeyDto) -> Result<Self, Self::Error> {
        let PublicKeyDto { params, crv, x, y } = dto.public_key;
        let params = params.into_params(KeyType::Ec)?;
        let d = dto.d.ok_or_else(|| error::missing_parameter("d"))?;

        let public_key = PublicKey::from_members(params, crv, x, y)?;
        let curve = public_key.curve();
        let d = d
            .to_padded_octets(curve.field_len())
            .ok_or_else(|| error::key_rejected("private scalar is too long for the curve"))?;
        let native = EcSecretKey::from_scalar(curve, &d)?;

        if &native.public_key() != public_key.native() {
            return Err(error::key_rejected("private scalar does not match the public point").into());
        }

        Ok(Self {
            public_key,
            d: Base64Url::from_raw(d),
            native,
        })
    }
}

#[derive(Debug, Serialize)]
struct PrivateKeyDtoRef<'a> {
    #[serde(flatten)]
    public_key: PublicKeyDtoRef<'a>,
    d: &'a Base64Url,
}

impl Serialize for PrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PrivateKeyDtoRef {
            public_key: self.public_key.to_dto(),
            d: &self.d,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::test::ec::*;

    #[test]
    fn parses_all_curves() -> Result<()> {
        let cases = [
            (JWK_P256_WITH_PRIVATE_KEY, Curve::P256),
            (JWK_P384_WITH_PRIVATE_KEY, Curve::P384),
            (JWK_P521_WITH_PRIVATE_KEY, Curve::P521),
        ];

        for (json, curve) in &cases {
            let key = PrivateKey::parse(json)?;
            assert_eq!(key.curve(), *curve);
            assert_eq!(key.d().len(), curve.field_len());
            assert_eq!(key.native().curve(), *curve);
        }
        Ok(())
    }

    #[test]
    fn round_trips_through_json() -> Result<()> {
        let key = PrivateKey::parse(JWK_P521_WITH_PRIVATE_KEY)?;
        let reparsed = PrivateKey::parse(serde_json::to_vec(&key)?)?;
        assert_eq!(reparsed, key);
        assert_eq!(reparsed.native(), key.native());
        Ok(())
    }

    #[test]
    fn new_derives_public_key_from_scalar() -> Result<()> {
        let parsed = PrivateKey::parse(JWK_P256_WITH_PRIVATE_KEY)?;
        let built = PrivateKey::new(parsed.native().clone(), Params::new())?;
        assert_eq!(built.d(), parsed.d());
        assert_eq!(built.public_key().x(), parsed.public_key().x());
        assert_eq!(built.public_key().y(), parsed.public_key().y());
        Ok(())
    }

    #[test]
    fn public_projection_keeps_common_parameters() -> Result<()> {
        let key = PrivateKey::parse(JWK_P384_WITH_PRIVATE_KEY)?;
        assert_eq!(key.to_public(), PublicKey::parse(JWK_P384)?);
        Ok(())
    }

    #[test]
    fn rejects_scalar_for_another_point() -> Result<()> {
        let mut value: serde_json::Value = serde_json::from_str(JWK_P256_WITH_PRIVATE_KEY)?;
        value["d"] = serde_json::Value::from("870MB6gfuTJ4HtUnUvYMyJpr5eUZNP4Bk43bVdj3eAE");
        let err = PrivateKey::parse(serde_json::to_vec(&value)?).unwrap_err();
        assert!(err.is_key_rejected());
        Ok(())
    }

    #[test]
    fn requires_private_scalar() {
        let err = PrivateKey::parse(JWK_P256).unwrap_err();
        assert_eq!(err.missing_parameter(), Some("d"));
    }

    #[test]
    fn debug_output_redacts_scalar() -> Result<()> {
        let key = PrivateKey::parse(JWK_P256_WITH_PRIVATE_KEY)?;
        let debug = format!("{:?}", key);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&key.d().to_string()));
        Ok(())
    }
}
