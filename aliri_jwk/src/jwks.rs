use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

use crate::{error::JwkError, jwk::KeyIdRef, Jwk};

/// A JSON Web Key Set (JWKS)
///
/// Keys are kept in the order they were added or decoded. Keys sharing a
/// key ID are all retained.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Jwks {
    keys: Vec<Jwk>,
}

impl Jwks {
    /// Parses a key set from JSON
    ///
    /// Every member of `keys` must be a valid JWK.
    ///
    /// # Errors
    ///
    /// The JSON is malformed, or the first member that fails to parse, in
    /// which case none of the other members are returned.
    pub fn parse(json: impl AsRef<[u8]>) -> Result<Self, JwkError> {
        let raw: RawJwks = serde_json::from_slice(json.as_ref())?;
        Self::from_raw(raw)
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn from_raw(raw: RawJwks) -> Result<Self, JwkError> {
        let mut keys = Vec::with_capacity(raw.keys.len());

        for (idx, member) in raw.keys.iter().enumerate() {
            match Jwk::parse(member.get()) {
                Ok(key) => keys.push(key),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(jwks.idx = idx, error = %err, "invalid JWK in set");
                    return Err(err);
                }
            }
        }

        Ok(Self { keys })
    }

    /// Adds a key to the set
    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }

    /// A view of the keys in this set
    #[must_use]
    pub fn keys(&self) -> &[Jwk] {
        &self.keys
    }

    /// Extracts the keys in this set
    #[must_use]
    pub fn into_keys(self) -> Vec<Jwk> {
        self.keys
    }

    /// All keys with the given key ID, in set order
    pub fn get_keys_by_id<'a>(&'a self, kid: &'a KeyIdRef) -> impl Iterator<Item = &'a Jwk> + 'a {
        self.keys.iter().filter(move |k| k.key_id() == Some(kid))
    }
}

impl From<Vec<Jwk>> for Jwks {
    fn from(keys: Vec<Jwk>) -> Self {
        Self { keys }
    }
}

#[derive(Deserialize)]
struct RawJwks {
    keys: Vec<Box<RawValue>>,
}

impl<'de> Deserialize<'de> for Jwks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawJwks::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    #[cfg(feature = "tracing")]
    use tracing_test::traced_test;

    use super::*;
    use crate::{jwa::Usage, jwk::KeyType, test::jwks::*};

    #[test]
    #[cfg_attr(feature = "tracing", traced_test)]
    fn decodes_symmetric_keys() -> Result<()> {
        let jwks = Jwks::parse(SYMMETRIC_KEYS)?;
        assert_eq!(jwks.keys().len(), 2);

        let first = &jwks.keys()[0];
        assert_eq!(first.key_type(), KeyType::Oct);
        assert_eq!(first.algorithm().map(|a| a.as_str()), Some("A128KW"));
        assert_eq!(first.key_id(), None);

        let second = &jwks.keys()[1];
        assert_eq!(
            second.key_id().map(|k| k.as_str()),
            Some("HMAC key used in JWS spec Appendix A.1 example")
        );
        Ok(())
    }

    #[test]
    #[cfg_attr(feature = "tracing", traced_test)]
    fn rejects_sets_with_an_invalid_member() {
        let json = r#"{"keys":[
            {"kty":"oct","k":"GawgguFyGrWKav7AX4VKUg"},
            {"kty":"oct","k":""}
        ]}"#;
        let err = Jwks::parse(json).unwrap_err();
        assert!(err.is_key_rejected());
    }

    #[test]
    fn propagates_the_first_failure() {
        let json = r#"{"keys":[
            {"kty":"oct"},
            {"kty":"OKP","crv":"Ed25519","x":"AA"}
        ]}"#;
        let err = Jwks::parse(json).unwrap_err();
        assert_eq!(err.missing_parameter(), Some("k"));
    }

    #[test]
    fn rejects_unknown_key_types() {
        let json = r#"{"keys":[{"kty":"OKP","crv":"Ed25519","x":"AA"}]}"#;
        let err = Jwks::parse(json).unwrap_err();
        assert_eq!(err.to_string(), "unsupported key type 'OKP'");
    }

    #[test]
    fn requires_keys_member() {
        assert!(Jwks::parse("{}").unwrap_err().is_malformed());
        assert!(Jwks::parse(r#"{"keys":{}}"#).unwrap_err().is_malformed());
    }

    #[test]
    fn empty_set() -> Result<()> {
        let jwks = Jwks::parse(r#"{"keys":[]}"#)?;
        assert!(jwks.keys().is_empty());
        assert_eq!(serde_json::to_string(&jwks)?, r#"{"keys":[]}"#);
        Ok(())
    }

    #[test]
    fn keeps_keys_with_duplicate_ids() -> Result<()> {
        let json = r#"{"keys":[
            {"kty":"oct","kid":"a","k":"AQ"},
            {"kty":"oct","kid":"b","k":"Ag"},
            {"kty":"oct","kid":"a","k":"Aw"}
        ]}"#;
        let jwks = Jwks::parse(json)?;
        assert_eq!(jwks.keys().len(), 3);

        let matches: Vec<_> = jwks.get_keys_by_id(KeyIdRef::from_str("a")).collect();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0], &jwks.keys()[0]);
        assert_eq!(matches[1], &jwks.keys()[2]);
        assert_eq!(jwks.get_keys_by_id(KeyIdRef::from_str("c")).count(), 0);
        Ok(())
    }

    #[test]
    fn deserializes_through_serde() -> Result<()> {
        let jwks: Jwks = serde_json::from_str(SYMMETRIC_KEYS)?;
        assert_eq!(jwks, Jwks::parse(SYMMETRIC_KEYS)?);

        let err = serde_json::from_str::<Jwks>(r#"{"keys":[{"kty":"oct"}]}"#).unwrap_err();
        assert!(err.to_string().contains("missing required parameter 'k'"));
        Ok(())
    }

    #[test]
    fn add_key_appends() -> Result<()> {
        let mut jwks = Jwks::default();
        jwks.add_key(Jwk::parse(crate::test::oct::JWK)?);
        assert_eq!(jwks.keys().len(), 1);
        assert_eq!(jwks.clone().into_keys().len(), 1);
        assert_eq!(Jwks::from(jwks.into_keys()).keys().len(), 1);
        Ok(())
    }

    #[cfg(all(feature = "ec", feature = "rsa"))]
    mod mixed {
        use super::*;

        #[test]
        #[cfg_attr(feature = "tracing", traced_test)]
        fn decodes_public_keys() -> Result<()> {
            let jwks = Jwks::parse(PUBLIC_KEYS)?;
            let keys = jwks.keys();
            assert_eq!(keys.len(), 2);

            assert!(matches!(keys[0], Jwk::EcPublic(_)));
            assert_eq!(keys[0].usage(), Some(&Usage::Encryption));
            assert_eq!(keys[0].key_id().map(|k| k.as_str()), Some("1"));

            assert!(matches!(keys[1], Jwk::RsaPublic(_)));
            assert_eq!(keys[1].algorithm().map(|a| a.as_str()), Some("RS256"));
            assert_eq!(keys[1].key_id().map(|k| k.as_str()), Some("2011-04-29"));
            Ok(())
        }

        #[test]
        #[cfg_attr(feature = "tracing", traced_test)]
        fn decodes_private_keys() -> Result<()> {
            let jwks = Jwks::parse(PRIVATE_KEYS)?;
            let keys = jwks.keys();
            assert_eq!(keys.len(), 2);
            assert!(matches!(keys[0], Jwk::EcPrivate(_)));
            assert!(matches!(keys[1], Jwk::RsaPrivate(_)));
            assert!(keys.iter().all(Jwk::is_private));
            Ok(())
        }

        #[test]
        #[cfg_attr(feature = "tracing", traced_test)]
        fn decodes_rfc7517_private_keys() -> Result<()> {
            let jwks = Jwks::parse(RFC7517_PRIVATE_KEYS)?;
            let keys = jwks.keys();
            assert_eq!(keys.len(), 2);

            assert!(matches!(keys[0], Jwk::EcPrivate(_)));
            assert_eq!(keys[0].usage(), Some(&Usage::Encryption));
            assert_eq!(keys[0].algorithm(), None);
            assert_eq!(keys[0].key_id().map(|k| k.as_str()), Some("1"));

            assert!(matches!(keys[1], Jwk::RsaPrivate(_)));
            assert_eq!(keys[1].usage(), None);
            assert_eq!(keys[1].algorithm().map(|a| a.as_str()), Some("RS256"));
            assert_eq!(keys[1].key_id().map(|k| k.as_str()), Some("2011-04-29"));

            let public = Jwks::parse(PUBLIC_KEYS)?;
            for (private, public) in keys.iter().zip(public.keys()) {
                assert_eq!(private.key_type(), public.key_type());
                assert_eq!(private.key_id(), public.key_id());
            }
            Ok(())
        }

        #[test]
        fn round_trips_through_json() -> Result<()> {
            for json in &[PUBLIC_KEYS, PRIVATE_KEYS, RFC7517_PRIVATE_KEYS, SYMMETRIC_KEYS] {
                let jwks = Jwks::parse(json)?;
                let reparsed = Jwks::parse(serde_json::to_vec(&jwks)?)?;
                assert_eq!(reparsed, jwks);
            }
            Ok(())
        }
    }
}
