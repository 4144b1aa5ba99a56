//! Algorithm-specific key parameters from the JSON Web Algorithms (JWA) standard
//!
//! The parameters for each key type are defined in [RFC7518, Section 6][rfc7518-6].
//!
//! [rfc7518-6]: https://tools.ietf.org/html/rfc7518#section-6

#[cfg(feature = "ec")]
#[cfg_attr(docsrs, doc(cfg(feature = "ec")))]
pub mod ec;
pub mod oct;
#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
pub mod rsa;

#[doc(inline)]
pub use oct::OctetSequence;

mod algorithm;
mod usage;

pub use algorithm::{Algorithm, AlgorithmRef};
pub use usage::{KeyOperation, Usage};
