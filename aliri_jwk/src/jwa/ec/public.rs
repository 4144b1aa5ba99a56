use std::convert::TryFrom;

use aliri_base64::Base64Url;
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    error::{self, JwkError},
    jwa::ec::Curve,
    jwk::{Key, KeyType, Params, ParamsDto, ParamsDtoRef},
    native::{CryptoKeyRef, EcPublicKey},
};

/// Elliptic curve public key parameters
///
/// The point is checked to lie on the named curve whenever the key is
/// decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "PublicKeyDto")]
#[must_use]
pub struct PublicKey {
    params: Params,
    curve: Curve,
    x: Base64Url,
    y: Base64Url,
    native: EcPublicKey,
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
            && self.curve == other.curve
            && self.x == other.x
            && self.y == other.y
    }
}

impl Eq for PublicKey {}

impl PublicKey {
    /// Derives the JWK members from a native public key
    ///
    /// # Errors
    ///
    /// The parameters declare a key type other than `EC`.
    pub fn new(key: EcPublicKey, params: Params) -> Result<Self, JwkError> {
        let params = params.resolve(KeyType::Ec)?;
        Ok(Self::from_native(key, params))
    }

    /// Parses an elliptic curve public key from JSON
    ///
    /// # Errors
    ///
    /// The JSON is malformed, `kty` is not `EC`, a member is missing, the
    /// curve is unsupported, or the point is not on the curve.
    pub fn parse(json: impl AsRef<[u8]>) -> Result<Self, JwkError> {
        let dto: PublicKeyDto = serde_json::from_slice(json.as_ref())?;
        Self::try_from(dto)
    }

    pub(super) fn from_native(key: EcPublicKey, params: Params) -> Self {
        let (x, y) = key.to_coordinates();
        Self {
            params,
            curve: key.curve(),
            x: Base64Url::from_raw(x),
            y: Base64Url::from_raw(y),
            native: key,
        }
    }

    pub(super) fn from_members(
        params: Params,
        crv: Option<String>,
        x: Option<Base64Url>,
        y: Option<Base64Url>,
    ) -> Result<Self, JwkError> {
        let crv = crv.ok_or_else(|| error::missing_parameter("crv"))?;
        let curve = Curve::from_name(&crv)?;
        let x = x.ok_or_else(|| error::missing_parameter("x"))?;
        let y = y.ok_or_else(|| error::missing_parameter("y"))?;

        let len = curve.field_len();
        let x = x
            .to_padded_octets(len)
            .ok_or_else(|| error::key_rejected("x coordinate is too long for the curve"))?;
        let y = y
            .to_padded_octets(len)
            .ok_or_else(|| error::key_rejected("y coordinate is too long for the curve"))?;

        let native = EcPublicKey::from_coordinates(curve, &x, &y)?;
        Ok(Self::from_native(native, params))
    }

    /// The common parameters
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// The named curve
    #[must_use]
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// The x coordinate, at the full field length of the curve
    #[must_use]
    pub fn x(&self) -> &Base64Url {
        &self.x
    }

    /// The y coordinate, at the full field length of the curve
    #[must_use]
    pub fn y(&self) -> &Base64Url {
        &self.y
    }

    /// The native public key
    #[must_use]
    pub fn native(&self) -> &EcPublicKey {
        &self.native
    }

    pub(super) fn to_dto(&self) -> PublicKeyDtoRef<'_> {
        PublicKeyDtoRef {
            params: self.params.to_dto(KeyType::Ec),
            crv: self.curve,
            x: &self.x,
            y: &self.y,
        }
    }
}

impl Key for PublicKey {
    fn params(&self) -> &Params {
        &self.params
    }

    fn crypto_key(&self) -> CryptoKeyRef<'_> {
        CryptoKeyRef::EcPublic(&self.native)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PublicKeyDto {
    #[serde(flatten)]
    pub params: ParamsDto,

    #[serde(default)]
    pub crv: Option<String>,

    #[serde(default)]
    pub x: Option<Base64Url>,

    #[serde(default)]
    pub y: Option<Base64Url>,
}

impl TryFrom<PublicKeyDto> for PublicKey {
    type Error = JwkError;

    fn try_from(dto: PublicKeyDto) -> Result<Self, Self::Error> {
        let params = dto.params.into_params(KeyType::Ec)?;
        Self::from_members(params, dto.crv, dto.x, dto.y)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PublicKeyDtoRef<'a> {
    #[serde(flatten)]
    params: ParamsDtoRef<'a>,
    crv: Curve,
    x: &'a Base64Url,
    y: &'a Base64Url,
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_dto().serialize(serializer)
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
            (JWK_P256, Curve::P256),
            (JWK_P384, Curve::P384),
            (JWK_P521, Curve::P521),
        ];

        for (json, curve) in &cases {
            let key = PublicKey::parse(json)?;
            assert_eq!(key.curve(), *curve);
            assert_eq!(key.native().curve(), *curve);
            assert_eq!(key.x().len(), curve.field_len());
            assert_eq!(key.y().len(), curve.field_len());
            assert_eq!(crate::jwk::Key::id(&key), TEST_KEY_ID);
        }
        Ok(())
    }

    #[test]
    fn minimal_keys_have_no_common_parameters() -> Result<()> {
        let key = PublicKey::parse(JWK_P521_MINIMAL)?;
        assert_eq!(key.params().key_type(), Some(KeyType::Ec));
        assert_eq!(key.params().key_id(), None);
        assert_eq!(key.params().algorithm(), None);
        Ok(())
    }

    #[test]
    fn round_trips_through_json() -> Result<()> {
        for json in &[JWK_P256, JWK_P384_MINIMAL, JWK_P521] {
            let key = PublicKey::parse(json)?;
            let reparsed = PublicKey::parse(serde_json::to_vec(&key)?)?;
            assert_eq!(reparsed, key);
            assert_eq!(reparsed.native(), key.native());
        }
        Ok(())
    }

    #[test]
    fn serializes_key_type_first() -> Result<()> {
        let key = PublicKey::parse(JWK_P256_MINIMAL)?;
        let json = serde_json::to_string(&key)?;
        assert!(json.starts_with(r#"{"kty":"EC","crv":"P-256","x":""#));
        Ok(())
    }

    #[test]
    fn new_derives_coordinates_from_native_key() -> Result<()> {
        let parsed = PublicKey::parse(JWK_P384)?;
        let built = PublicKey::new(parsed.native().clone(), Params::new())?;
        assert_eq!(built.x(), parsed.x());
        assert_eq!(built.y(), parsed.y());
        assert_eq!(built.params().key_type(), Some(KeyType::Ec));
        Ok(())
    }

    #[test]
    fn new_rejects_other_key_types() -> Result<()> {
        let parsed = PublicKey::parse(JWK_P256)?;
        let err = PublicKey::new(
            parsed.native().clone(),
            Params::new().with_key_type(KeyType::Oct),
        )
        .unwrap_err();
        assert!(err.is_key_type_mismatch());
        Ok(())
    }

    #[test]
    fn leading_zero_octets_are_ignored() -> Result<()> {
        let json = r#"{"kty":"EC","crv":"P-256",
            "x":"MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4",
            "y":"4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM"}"#;
        let key = PublicKey::parse(json)?;
        let padded = format!(
            r#"{{"kty":"EC","crv":"P-256","x":"{}","y":"{}"}}"#,
            Base64Url::from_raw([&[0][..], key.x().as_slice()].concat()),
            key.y()
        );
        assert_eq!(PublicKey::parse(padded)?, key);
        Ok(())
    }

    #[test]
    fn rejects_point_off_the_curve() {
        let json = r#"{"kty":"EC","crv":"P-256",
            "x":"MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4",
            "y":"4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyQ"}"#;
        assert!(PublicKey::parse(json).unwrap_err().is_key_rejected());
    }

    #[test]
    fn rejects_oversized_coordinate() {
        let json = r#"{"kty":"EC","crv":"P-256",
            "x":"AQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
            "y":"4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM"}"#;
        assert!(PublicKey::parse(json).unwrap_err().is_key_rejected());
    }

    #[test]
    fn rejects_unsupported_curve() {
        let json = r#"{"kty":"EC","crv":"secp256k1","x":"AA","y":"AA"}"#;
        let err = PublicKey::parse(json).unwrap_err();
        assert_eq!(err.to_string(), "unsupported elliptic curve 'secp256k1'");
    }

    #[test]
    fn reports_each_missing_member() {
        let cases = [
            (r#"{"kty":"EC","x":"AA","y":"AA"}"#, "crv"),
            (r#"{"kty":"EC","crv":"P-256","y":"AA"}"#, "x"),
            (r#"{"kty":"EC","crv":"P-256","x":"AA"}"#, "y"),
            (r#"{"crv":"P-256","x":"AA","y":"AA"}"#, "kty"),
        ];

        for (json, param) in &cases {
            let err = PublicKey::parse(json).unwrap_err();
            assert_eq!(err.missing_parameter(), Some(*param), "{}", json);
        }
    }

    #[test]
    fn rejects_other_key_types() {
        let err = PublicKey::parse(crate::test::oct::JWK).unwrap_err();
        assert!(err.is_key_type_mismatch());
    }
}
