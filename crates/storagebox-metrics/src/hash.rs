//! Numeric encoding of string dimensions.
//!
//! Location and host system names are exported as 32-bit FNV-1a hashes so
//! they can be graphed. Collisions are tolerated; the value is a display
//! aid, not an identity.

const OFFSET_BASIS: u32 = 0x811c_9dc5;
const PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a hash of the UTF-8 bytes of `s`.
pub fn fnv1a_32(s: &str) -> u32 {
    s.bytes().fold(OFFSET_BASIS, |h, b| (h ^ u32::from(b)).wrapping_mul(PRIME))
}

/// [`fnv1a_32`] as a gauge value.
pub fn hash_value(s: &str) -> f64 {
    f64::from(fnv1a_32(s))
}
