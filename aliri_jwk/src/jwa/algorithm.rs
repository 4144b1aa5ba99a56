use aliri_braid::braid;

/// An algorithm identifier intended for use with a key
///
/// The set of algorithms is open, so any identifier is accepted
/// and preserved verbatim.
#[braid(serde, ref_doc = "A borrowed reference to an algorithm identifier ([`Algorithm`])")]
pub struct Algorithm;
