//! Symmetric key parameters ([RFC7518, Section 6.4][rfc7518-6.4])
//!
//! [rfc7518-6.4]: https://tools.ietf.org/html/rfc7518#section-6.4

use std::{convert::TryFrom, fmt};

use aliri_base64::Base64Url;
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    error::{self, JwkError},
    jwk::{Key, KeyType, Params, ParamsDto, ParamsDtoRef},
    native::CryptoKeyRef,
};

/// A symmetric key, carried as an octet sequence
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "OctetSequenceDto")]
#[must_use]
pub struct OctetSequence {
    params: Params,
    key: Base64Url,
}

impl OctetSequence {
    /// Wraps symmetric key material
    ///
    /// # Errors
    ///
    /// The parameters declare a key type other than `oct`, or the key
    /// material is empty.
    pub fn new(key: impl Into<Vec<u8>>, params: Params) -> Result<Self, JwkError> {
        let params = params.resolve(KeyType::Oct)?;
        Self::from_members(params, Base64Url::from_raw(key))
    }

    /// Parses a symmetric key from JSON
    ///
    /// # Errors
    ///
    /// The JSON is malformed, `kty` is not `oct`, or `k` is absent or empty.
    pub fn parse(json: impl AsRef<[u8]>) -> Result<Self, JwkError> {
        let dto: OctetSequenceDto = serde_json::from_slice(json.as_ref())?;
        Self::try_from(dto)
    }

    fn from_members(params: Params, key: Base64Url) -> Result<Self, JwkError> {
        if key.is_empty() {
            return Err(error::key_rejected("symmetric key material is empty").into());
        }

        Ok(Self { params, key })
    }

    /// The common parameters
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// The key material
    #[must_use]
    pub fn key(&self) -> &[u8] {
        self.key.as_slice()
    }
}

impl fmt::Debug for OctetSequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OctetSequence")
            .field("params", &self.params)
            .field("k", &"<redacted>")
            .finish()
    }
}

impl Key for OctetSequence {
    fn params(&self) -> &Params {
        &self.params
    }

    fn crypto_key(&self) -> CryptoKeyRef<'_> {
        CryptoKeyRef::Symmetric(self.key.as_slice())
    }
}

#[derive(Debug, Deserialize)]
struct OctetSequenceDto {
    #[serde(flatten)]
    params: ParamsDto,

    #[serde(default)]
    k: Option<Base64Url>,
}

impl TryFrom<OctetSequenceDto> for OctetSequence {
    type Error = JwkError;

    fn try_from(dto: OctetSequenceDto) -> Result<Self, Self::Error> {
        let params = dto.params.into_params(KeyType::Oct)?;
        let key = dto.k.ok_or_else(|| error::missing_parameter("k"))?;
        Self::from_members(params, key)
    }
}

#[derive(Serialize)]
struct OctetSequenceDtoRef<'a> {
    #[serde(flatten)]
    params: ParamsDtoRef<'a>,
    k: &'a Base64Url,
}

impl Serialize for OctetSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OctetSequenceDtoRef {
            params: self.params.to_dto(KeyType::Oct),
            k: &self.key,
        }
        .serialize(serializer)
    }
}
