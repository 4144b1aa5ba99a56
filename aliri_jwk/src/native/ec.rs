use std::fmt;

use p256::elliptic_curve::sec1::ToEncodedPoint;

use crate::{
    error::{self, KeyRejected},
    jwa::ec::Curve,
};

/// A native elliptic curve public key on one of the supported curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcPublicKey {
    /// A P-256 public key
    P256(p256::PublicKey),
    /// A P-384 public key
    P384(p384::PublicKey),
    /// A P-521 public key
    P521(p521::PublicKey),
}

impl EcPublicKey {
    /// The curve of the key
    #[must_use]
    pub fn curve(&self) -> Curve {
        match self {
            Self::P256(_) => Curve::P256,
            Self::P384(_) => Curve::P384,
            Self::P521(_) => Curve::P521,
        }
    }

    /// Reconstructs a public key from its affine coordinates
    ///
    /// Each coordinate must be exactly the field length of the curve.
    ///
    /// # Errors
    ///
    /// The coordinates do not describe a point on the curve.
    pub fn from_coordinates(curve: Curve, x: &[u8], y: &[u8]) -> Result<Self, KeyRejected> {
        let len = curve.field_len();
        if x.len() != len || y.len() != len {
            return Err(error::key_rejected("coordinates do not match the field length"));
        }

        let mut sec1 = Vec::with_capacity(1 + 2 * len);
        sec1.push(0x04);
        sec1.extend_from_slice(x);
        sec1.extend_from_slice(y);

        let key = match curve {
            Curve::P256 => p256::PublicKey::from_sec1_bytes(&sec1).map(Self::P256),
            Curve::P384 => p384::PublicKey::from_sec1_bytes(&sec1).map(Self::P384),
            Curve::P521 => p521::PublicKey::from_sec1_bytes(&sec1).map(Self::P521),
        };

        key.map_err(|_| error::key_rejected("point is not on the curve"))
    }

    /// The affine coordinates of the point, each at the field length of
    /// the curve
    #[must_use]
    pub fn to_coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        let point = match self {
            Self::P256(k) => k.to_encoded_point(false).as_bytes().to_vec(),
            Self::P384(k) => k.to_encoded_point(false).as_bytes().to_vec(),
            Self::P521(k) => k.to_encoded_point(false).as_bytes().to_vec(),
        };

        // Uncompressed SEC1 encoding: 0x04 || x || y
        let (x, y) = point[1..].split_at(self.curve().field_len());
        (x.to_vec(), y.to_vec())
    }
}

impl From<p256::PublicKey> for EcPublicKey {
    fn from(key: p256::PublicKey) -> Self {
        Self::P256(key)
    }
}

impl From<p384::PublicKey> for EcPublicKey {
    fn from(key: p384::PublicKey) -> Self {
        Self::P384(key)
    }
}

impl From<p521::PublicKey> for EcPublicKey {
    fn from(key: p521::PublicKey) -> Self {
        Self::P521(key)
    }
}

/// A native elliptic curve private key on one of the supported curves
#[derive(Clone, PartialEq, Eq)]
pub enum EcSecretKey {
    /// A P-256 private key
    P256(p256::SecretKey),
    /// A P-384 private key
    P384(p384::SecretKey),
    /// A P-521 private key
    P521(p521::SecretKey),
}

impl EcSecretKey {
    /// The curve of the key
    #[must_use]
    pub fn curve(&self) -> Curve {
        match self {
            Self::P256(_) => Curve::P256,
            Self::P384(_) => Curve::P384,
            Self::P521(_) => Curve::P521,
        }
    }

    /// Reconstructs a private key from its big-endian scalar
    ///
    /// # Errors
    ///
    /// The scalar is zero or not less than the order of the curve.
    pub fn from_scalar(curve: Curve, d: &[u8]) -> Result<Self, KeyRejected> {
        let key = match curve {
            Curve::P256 => p256::SecretKey::from_slice(d).map(Self::P256),
            Curve::P384 => p384::SecretKey::from_slice(d).map(Self::P384),
            Curve::P521 => p521::SecretKey::from_slice(d).map(Self::P521),
        };

        key.map_err(|_| error::key_rejected("private scalar is out of range for the curve"))
    }

    /// The big-endian scalar, at the field length of the curve
    #[must_use]
    pub fn to_scalar(&self) -> Vec<u8> {
        match self {
            Self::P256(k) => k.to_bytes().to_vec(),
            Self::P384(k) => k.to_bytes().to_vec(),
            Self::P521(k) => k.to_bytes().to_vec(),
        }
    }

    /// The public key corresponding to this private key
    #[must_use]
    pub fn public_key(&self) -> EcPublicKey {
        match self {
            Self::P256(k) => EcPublicKey::P256(k.public_key()),
            Self::P384(k) => EcPublicKey::P384(k.public_key()),
            Self::P521(k) => EcPublicKey::P521(k.public_key()),
        }
    }
}

impl fmt::Debug for EcSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EcSecretKey")
            .field("curve", &self.curve())
            .field("d", &"<redacted>")
            .finish()
    }
}

impl From<p256::SecretKey> for EcSecretKey {
    fn from(key: p256::SecretKey) -> Self {
        Self::P256(key)
    }
}

impl From<p384::SecretKey> for EcSecretKey {
    fn from(key: p384::SecretKey) -> Self {
        Self::P384(key)
    }
}

impl From<p521::SecretKey> for EcSecretKey {
    fn from(key: p521::SecretKey) -> Self {
        Self::P521(key)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;

    #[test]
    fn coordinates_round_trip() -> Result<()> {
        // RFC7517, Appendix A.2
        let d = aliri_base64::Base64Url::from_encoded("870MB6gfuTJ4HtUnUvYMyJpr5eUZNP4Bk43bVdj3eAE")?;
        let secret = EcSecretKey::from_scalar(Curve::P256, d.as_slice())?;
        let public = secret.public_key();

        let (x, y) = public.to_coordinates();
        assert_eq!(
            aliri_base64::Base64Url::from_raw(x.clone()).to_string(),
            "MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4"
        );
        assert_eq!(EcPublicKey::from_coordinates(Curve::P256, &x, &y)?, public);
        Ok(())
    }

    #[test]
    fn public_keys_are_copied_by_value() -> Result<()> {
        let secret = EcSecretKey::from_scalar(Curve::P256, &[7; 32])?;
        let public = secret.public_key();
        let copy = public;
        assert_eq!(copy.curve(), Curve::P256);
        assert_eq!(copy, public);
        Ok(())
    }

    #[test]
    fn rejects_zero_scalar() {
        assert!(EcSecretKey::from_scalar(Curve::P384, &[0; 48]).is_err());
    }

    #[test]
    fn rejects_truncated_coordinates() {
        assert!(EcPublicKey::from_coordinates(Curve::P521, &[1; 65], &[1; 66]).is_err());
    }
}
