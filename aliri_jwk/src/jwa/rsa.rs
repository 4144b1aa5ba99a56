//! RSA key parameters ([RFC7518, Section 6.3][rfc7518-6.3])
//!
//! Only two-prime keys are supported. A private key that carries `oth`, or
//! a native key with more than two primes, is refused as
//! [`Unsupported::MultiPrime`][crate::error::Unsupported::MultiPrime].
//!
//! [rfc7518-6.3]: https://tools.ietf.org/html/rfc7518#section-6.3

use ::rsa::BigUint;

use crate::error::{self, KeyRejected};

mod private;
mod public;

pub use private::PrivateKey;
pub use public::PublicKey;

/// Largest modulus accepted when decoding a key
pub const MAX_MODULUS_BITS: usize = 16384;

/// The public exponent must lie in `[2, 2^31 - 1]`
fn check_exponent(e: &BigUint) -> Result<(), KeyRejected> {
    let bits = e.bits();
    if bits < 2 || bits > 31 {
        return Err(error::key_rejected("public exponent is out of range"));
    }

    Ok(())
}
