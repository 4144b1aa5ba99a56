use std::{convert::TryFrom, fmt};

use ::rsa::{
    traits::{PrivateKeyParts, PublicKeyParts},
    BigUint, RsaPrivateKey,
};
use aliri_base64::Base64Url;
use serde::{de::IgnoredAny, Deserialize, Serialize, Serializer};

use super::public::{PublicKeyDto, PublicKeyDtoRef};
use crate::{
    error::{self, JwkError},
    jwa::rsa::PublicKey,
    jwk::{Key, KeyType, Params},
    native::CryptoKeyRef,
};

/// RSA private key parameters
///
/// The key is checked for internal consistency whenever it is decoded. The
/// precomputed CRT values (`dp`, `dq`, `qi`) are optional; when present,
/// they must agree with the primes.
///
/// Private keys are limited to a 4096-bit modulus, the largest the `rsa`
/// crate will validate. Larger moduli are rejected, although the public
/// half of such a key is accepted up to
/// [`MAX_MODULUS_BITS`][super::MAX_MODULUS_BITS] bits.
#[derive(Clone, Deserialize)]
#[serde(try_from = "PrivateKeyDto")]
#[must_use]
pub struct PrivateKey {
    public_key: PublicKey,
    d: Base64Url,
    p: Base64Url,
    q: Base64Url,
    crt: Option<Crt>,
    native: RsaPrivateKey,
}

#[derive(Clone, PartialEq, Eq)]
struct Crt {
    dp: Base64Url,
    dq: Base64Url,
    qi: Base64Url,
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
            && self.d == other.d
            && self.p == other.p
            && self.q == other.q
            && self.crt == other.crt
    }
}

impl Eq for PrivateKey {}

impl PrivateKey {
    /// Derives the JWK members from a native private key
    ///
    /// The CRT values are always included.
    ///
    /// # Errors
    ///
    /// The parameters declare a key type other than `RSA`, the key fails
    /// validation, or the key has more than two primes.
    pub fn new(mut key: RsaPrivateKey, params: Params) -> Result<Self, JwkError> {
        key.validate().map_err(error::key_rejected)?;

        let (p, q) = match key.primes() {
            [p, q] => (Base64Url::from_uint(p), Base64Url::from_uint(q)),
            [_, _, _, ..] => return Err(error::Unsupported::MultiPrime.into()),
            _ => return Err(error::key_rejected("RSA key has fewer than two primes").into()),
        };

        key.precompute().map_err(error::key_rejected)?;
        let crt = native_crt(&key)
            .map(|(dp, dq, qi)| Crt {
                dp: Base64Url::from_uint(&dp),
                dq: Base64Url::from_uint(&dq),
                qi: Base64Url::from_uint(&qi),
            })
            .ok_or_else(|| error::key_rejected("CRT values are unavailable"))?;

        let public_key = PublicKey::new(key.to_public_key(), params)?;

        Ok(Self {
            public_key,
            d: Base64Url::from_uint(key.d()),
            p,
            q,
            crt: Some(crt),
            native: key,
        })
    }

    /// Parses an RSA private key from JSON
    ///
    /// # Errors
    ///
    /// The JSON is malformed, `kty` is not `RSA`, a member is missing, the
    /// key carries `oth`, or the members do not form a consistent key.
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

    /// The private exponent
    #[must_use]
    pub fn d(&self) -> &Base64Url {
        &self.d
    }

    /// The first prime factor
    #[must_use]
    pub fn p(&self) -> &Base64Url {
        &self.p
    }

    /// The second prime factor
    #[must_use]
    pub fn q(&self) -> &Base64Url {
        &self.q
    }

    /// The first factor CRT exponent, `d mod (p - 1)`
    #[must_use]
    pub fn dp(&self) -> Option<&Base64Url> {
        self.crt.as_ref().map(|c| &c.dp)
    }

    /// The second factor CRT exponent, `d mod (q - 1)`
    #[must_use]
    pub fn dq(&self) -> Option<&Base64Url> {
        self.crt.as_ref().map(|c| &c.dq)
    }

    /// The first CRT coefficient, `q^-1 mod p`
    #[must_use]
    pub fn qi(&self) -> Option<&Base64Url> {
        self.crt.as_ref().map(|c| &c.qi)
    }

    /// The native private key
    #[must_use]
    pub fn native(&self) -> &RsaPrivateKey {
        &self.native
    }
}

fn native_crt(key: &RsaPrivateKey) -> Option<(BigUint, BigUint, BigUint)> {
    Some((key.dp()?.clone(), key.dq()?.clone(), key.crt_coefficient()?))
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .field("d", &"<redacted>")
            .field("p", &"<redacted>")
            .field("q", &"<redacted>")
            .field("crt", &self.crt.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Key for PrivateKey {
    fn params(&self) -> &Params {
        self.public_key.params()
    }

    fn crypto_key(&self) -> CryptoKeyRef<'_> {
        CryptoKeyRef::RsaPrivate(&self.native)
    }
}

#[derive(Debug, Deserialize)]
struct PrivateKeyDto {
    #[serde(flatten)]
    public_key: PublicKeyDto,

    #[serde(default)]
    d: Option<Base64Url>,

    #[serde(default)]
    p: Option<Base64Url>,

    #[serde(default)]
    q: Option<Base64Url>,

    #[serde(default)]
    dp: Option<Base64Url>,

    #[serde(default)]
    dq: Option<Base64Url>,

    #[serde(default)]
    qi: Option<Base64Url>,

    #[serde(default)]
    oth: Option<IgnoredAny>,
}

impl TryFrom<PrivateKeyDto> for PrivateKey {
    type Error = JwkError;

    fn try_from(dto: PrivateKeyDto) -> Result<Self, Self::Error> {
        let PublicKeyDto { params, n, e } = dto.public_key;
        let params = params.into_params(KeyType::Rsa)?;

        if dto.oth.is_some() {
            return Err(error::Unsupported::MultiPrime.into());
        }

        let d = dto.d.ok_or_else(|| error::missing_parameter("d"))?.to_uint();
        let p = dto.p.ok_or_else(|| error::missing_parameter("p"))?.to_uint();
        let q = dto.q.ok_or_else(|| error::missing_parameter("q"))?.to_uint();

        let supplied_crt = match (dto.dp, dto.dq, dto.qi) {
            (None, None, None) => None,
            (Some(dp), Some(dq), Some(qi)) => Some((dp.to_uint(), dq.to_uint(), qi.to_uint())),
            (None, _, _) => return Err(error::missing_parameter("dp").into()),
            (_, None, _) => return Err(error::missing_parameter("dq").into()),
            (_, _, None) => return Err(error::missing_parameter("qi").into()),
        };

        let public_key = PublicKey::from_members(params, n, e)?;
        let pub_native = public_key.native();

        let mut native = RsaPrivateKey::from_components(
            pub_native.n().clone(),
            pub_native.e().clone(),
            d,
            vec![p, q],
        )
        .map_err(error::key_rejected)?;
        native.validate().map_err(error::key_rejected)?;
        native.precompute().map_err(error::key_rejected)?;

        let crt = match supplied_crt {
            Some(supplied) => {
                if native_crt(&native).as_ref() != Some(&supplied) {
                    return Err(error::key_rejected("CRT values do not match the primes").into());
                }
                let (dp, dq, qi) = supplied;
                Some(Crt {
                    dp: Base64Url::from_uint(&dp),
                    dq: Base64Url::from_uint(&dq),
                    qi: Base64Url::from_uint(&qi),
                })
            }
            None => None,
        };

        let (d, p, q) = match native.primes() {
            [p, q] => (
                Base64Url::from_uint(native.d()),
                Base64Url::from_uint(p),
                Base64Url::from_uint(q),
            ),
            _ => return Err(error::key_rejected("RSA key does not have two primes").into()),
        };

        Ok(Self {
            public_key,
            d,
            p,
            q,
            crt,
            native,
        })
    }
}

#[derive(Debug, Serialize)]
struct PrivateKeyDtoRef<'a> {
    #[serde(flatten)]
    public_key: PublicKeyDtoRef<'a>,
    d: &'a Base64Url,
    p: &'a Base64Url,
    q: &'a Base64Url,

    #[serde(skip_serializing_if = "Option::is_none")]
    dp: Option<&'a Base64Url>,

    #[serde(skip_serializing_if = "Option::is_none")]
    dq: Option<&'a Base64Url>,

    #[serde(skip_serializing_if = "Option::is_none")]
    qi: Option<&'a Base64Url>,
}

impl Serialize for PrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PrivateKeyDtoRef {
            public_key: self.public_key.to_dto(),
            d: &self.d,
            p: &self.p,
            q: &self.q,
            dp: self.dp(),
            dq: self.dq(),
            qi: self.qi(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::test::rsa::*;

    #[test]
    fn parses_private_key_with_crt_values() -> Result<()> {
        let key = PrivateKey::parse(JWK_WITH_PRIVATE_KEY)?;
        assert!(key.dp().is_some());
        assert!(key.dq().is_some());
        assert!(key.qi().is_some());
        assert_eq!(crate::jwk::Key::id(&key), TEST_KEY_ID);
        assert_eq!(key.native().to_public_key(), *key.public_key().native());
        Ok(())
    }

    #[test]
    fn parses_private_key_without_crt_values() -> Result<()> {
        let key = PrivateKey::parse(JWK_WITH_MINIMAL_PRIVATE_KEY)?;
        assert_eq!(key.dp(), None);
        assert_eq!(key.dq(), None);
        assert_eq!(key.qi(), None);

        let json = serde_json::to_value(&key)?;
        assert!(json.get("dp").is_none());
        assert!(json.get("qi").is_none());
        Ok(())
    }

    #[test]
    fn round_trips_through_json() -> Result<()> {
        for json in &[JWK_WITH_PRIVATE_KEY, JWK_WITH_MINIMAL_PRIVATE_KEY] {
            let key = PrivateKey::parse(json)?;
            let reparsed = PrivateKey::parse(serde_json::to_vec(&key)?)?;
            assert_eq!(reparsed, key);
        }
        Ok(())
    }

    #[test]
    fn serializes_members_in_order() -> Result<()> {
        let key = PrivateKey::parse(JWK_WITH_MINIMAL_PRIVATE_KEY)?;
        let json = serde_json::to_string(&key)?;
        let n = json.find(r#""n":"#).unwrap_or_default();
        let d = json.find(r#""d":"#).unwrap_or_default();
        let q = json.find(r#""q":"#).unwrap_or_default();
        assert!(json.starts_with(r#"{"kty":"RSA","#));
        assert!(n < d && d < q);
        Ok(())
    }

    #[test]
    fn new_includes_crt_values() -> Result<()> {
        let parsed = PrivateKey::parse(JWK_WITH_PRIVATE_KEY)?;
        let minimal = PrivateKey::parse(JWK_WITH_MINIMAL_PRIVATE_KEY)?;
        let built = PrivateKey::new(minimal.native().clone(), Params::new())?;
        assert_eq!(built.d(), parsed.d());
        assert_eq!(built.p(), parsed.p());
        assert_eq!(built.q(), parsed.q());
        assert_eq!(built.dp(), parsed.dp());
        assert_eq!(built.dq(), parsed.dq());
        assert_eq!(built.qi(), parsed.qi());
        Ok(())
    }

    #[test]
    fn public_projection_keeps_common_parameters() -> Result<()> {
        let key = PrivateKey::parse(JWK_WITH_PRIVATE_KEY)?;
        assert_eq!(key.to_public(), PublicKey::parse(JWK)?);
        Ok(())
    }

    #[test]
    fn rejects_inconsistent_primes() {
        let err = PrivateKey::parse(JWK_WITH_INCONSISTENT_PRIMES).unwrap_err();
        assert!(err.is_key_rejected());
    }

    #[test]
    fn rejects_private_keys_over_4096_bits() -> Result<()> {
        let err = PrivateKey::parse(JWK_WITH_4160_BIT_PRIVATE_KEY).unwrap_err();
        assert!(err.is_key_rejected());

        let mut value: serde_json::Value = serde_json::from_str(JWK_WITH_4160_BIT_PRIVATE_KEY)?;
        if let Some(obj) = value.as_object_mut() {
            for member in &["d", "p", "q"] {
                obj.remove(*member);
            }
        }
        let public = PublicKey::parse(serde_json::to_vec(&value)?)?;
        assert_eq!(public.n().as_slice().len() * 8, 4160);
        Ok(())
    }

    #[test]
    fn rejects_mismatched_crt_values() {
        let err = PrivateKey::parse(JWK_WITH_BAD_CRT).unwrap_err();
        assert!(err.is_key_rejected());
    }

    #[test]
    fn requires_all_crt_values_together() -> Result<()> {
        let mut value: serde_json::Value = serde_json::from_str(JWK_WITH_PRIVATE_KEY)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("dq");
        }
        let err = PrivateKey::parse(serde_json::to_vec(&value)?).unwrap_err();
        assert_eq!(err.missing_parameter(), Some("dq"));
        Ok(())
    }

    #[test]
    fn reports_each_missing_member() -> Result<()> {
        for param in &["d", "p", "q", "n", "e"] {
            let mut value: serde_json::Value = serde_json::from_str(JWK_WITH_MINIMAL_PRIVATE_KEY)?;
            if let Some(obj) = value.as_object_mut() {
                obj.remove(*param);
            }
            let err = PrivateKey::parse(serde_json::to_vec(&value)?).unwrap_err();
            assert_eq!(err.missing_parameter(), Some(*param));
        }
        Ok(())
    }

    #[test]
    fn rejects_other_primes() -> Result<()> {
        let mut value: serde_json::Value = serde_json::from_str(JWK_WITH_PRIVATE_KEY)?;
        value["oth"] = serde_json::json!([{"r": "AQAB", "d": "AQAB", "t": "AQAB"}]);
        let err = PrivateKey::parse(serde_json::to_vec(&value)?).unwrap_err();
        assert_eq!(err.to_string(), "multi-prime RSA keys are not supported");
        Ok(())
    }

    #[test]
    fn new_rejects_multi_prime_keys() -> Result<()> {
        #[derive(Deserialize)]
        struct Components {
            n: Base64Url,
            e: Base64Url,
            d: Base64Url,
            primes: Vec<Base64Url>,
        }

        let c: Components = serde_json::from_str(THREE_PRIME_COMPONENTS)?;
        let key = RsaPrivateKey::from_components(
            c.n.to_uint(),
            c.e.to_uint(),
            c.d.to_uint(),
            c.primes.iter().map(Base64Url::to_uint).collect(),
        )?;

        let err = PrivateKey::new(key, Params::new()).unwrap_err();
        assert!(err.is_unsupported());
        Ok(())
    }

    #[test]
    fn debug_output_redacts_private_members() -> Result<()> {
        let key = PrivateKey::parse(JWK_WITH_PRIVATE_KEY)?;
        let debug = format!("{:?}", key);
        assert!(!debug.contains(&key.d().to_string()));
        assert!(!debug.contains(&key.p().to_string()));
        Ok(())
    }
}
