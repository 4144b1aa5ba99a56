use std::convert::TryFrom;

use ::rsa::{traits::PublicKeyParts, RsaPublicKey};
use aliri_base64::Base64Url;
use serde::{Deserialize, Serialize, Serializer};

use super::{check_exponent, MAX_MODULUS_BITS};
use crate::{
    error::{self, JwkError},
    jwk::{Key, KeyType, Params, ParamsDto, ParamsDtoRef},
    native::CryptoKeyRef,
};

/// RSA public key parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "PublicKeyDto")]
#[must_use]
pub struct PublicKey {
    params: Params,
    n: Base64Url,
    e: Base64Url,
    native: RsaPublicKey,
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.n == other.n && self.e == other.e
    }
}

impl Eq for PublicKey {}

impl PublicKey {
    /// Derives the JWK members from a native public key
    ///
    /// # Errors
    ///
    /// The parameters declare a key type other than `RSA`, or the public
    /// exponent does not fit in 31 bits.
    pub fn new(key: RsaPublicKey, params: Params) -> Result<Self, JwkError> {
        let params = params.resolve(KeyType::Rsa)?;
        check_exponent(key.e())?;
        Ok(Self::from_native(key, params))
    }

    /// Parses an RSA public key from JSON
    ///
    /// # Errors
    ///
    /// The JSON is malformed, `kty` is not `RSA`, `n` or `e` is missing,
    /// or the values do not form a usable public key.
    pub fn parse(json: impl AsRef<[u8]>) -> Result<Self, JwkError> {
        let dto: PublicKeyDto = serde_json::from_slice(json.as_ref())?;
        Self::try_from(dto)
    }

    pub(super) fn from_native(key: RsaPublicKey, params: Params) -> Self {
        Self {
            params,
            n: Base64Url::from_uint(key.n()),
            e: Base64Url::from_uint(key.e()),
            native: key,
        }
    }

    pub(super) fn from_members(
        params: Params,
        n: Option<Base64Url>,
        e: Option<Base64Url>,
    ) -> Result<Self, JwkError> {
        let n = n.ok_or_else(|| error::missing_parameter("n"))?.to_uint();
        let e = e.ok_or_else(|| error::missing_parameter("e"))?.to_uint();

        if n.bits() == 0 {
            return Err(error::key_rejected("modulus is zero").into());
        }
        check_exponent(&e)?;

        let native =
            RsaPublicKey::new_with_max_size(n, e, MAX_MODULUS_BITS).map_err(error::key_rejected)?;
        Ok(Self::from_native(native, params))
    }

    /// The common parameters
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// The modulus
    #[must_use]
    pub fn n(&self) -> &Base64Url {
        &self.n
    }

    /// The public exponent
    #[must_use]
    pub fn e(&self) -> &Base64Url {
        &self.e
    }

    /// The native public key
    #[must_use]
    pub fn native(&self) -> &RsaPublicKey {
        &self.native
    }

    pub(super) fn to_dto(&self) -> PublicKeyDtoRef<'_> {
        PublicKeyDtoRef {
            params: self.params.to_dto(KeyType::Rsa),
            n: &self.n,
            e: &self.e,
        }
    }
}

impl Key for PublicKey {
    fn params(&self) -> &Params {
        &self.params
    }

    fn crypto_key(&self) -> CryptoKeyRef<'_> {
        CryptoKeyRef::RsaPublic(&self.native)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PublicKeyDto {
    #[serde(flatten)]
    pub params: ParamsDto,

    #[serde(default)]
    pub n: Option<Base64Url>,

    #[serde(default)]
    pub e: Option<Base64Url>,
}

impl TryFrom<PublicKeyDto> for PublicKey {
    type Error = JwkError;

    fn try_from(dto: PublicKeyDto) -> Result<Self, Self::Error> {
        let params = dto.params.into_params(KeyType::Rsa)?;
        Self::from_members(params, dto.n, dto.e)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PublicKeyDtoRef<'a> {
    #[serde(flatten)]
    params: ParamsDtoRef<'a>,
    n: &'a Base64Url,
    e: &'a Base64Url,
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_dto().serialize(serializer)
    }
}
