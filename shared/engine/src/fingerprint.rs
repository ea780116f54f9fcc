//! Fingerprint Hasher
//!
//! Rolling polynomial hash (base 53) over the uppercased input with dashes
//! removed, plus the cleaned length, reduced modulo 1000 and zero padded.
//! This is a short checksum for human auditing, not a cryptographic digest.

use std::num::NonZeroU64;

const BASE: u64 = 53;

/// Default fingerprint space: three decimal digits
pub const DEFAULT_MODULO: NonZeroU64 = match NonZeroU64::new(1000) {
    Some(modulo) => modulo,
    None => unreachable!(),
};

/// Uppercases the input and drops every `-`.
pub fn clean(input: &str) -> String {
    input.to_uppercase().chars().filter(|c| *c != '-').collect()
}

/// Three digit fingerprint of `input`.
pub fn fingerprint(input: &str) -> String {
    fingerprint_with_modulo(input, DEFAULT_MODULO)
}

/// Fingerprint reduced by `modulo`, left padded with zeros to at least 3 digits.
///
/// The accumulator is reduced at every step, which gives the same residue as
/// reducing the unbounded polynomial once at the end.
pub fn fingerprint_with_modulo(input: &str, modulo: NonZeroU64) -> String {
    let m = u128::from(modulo.get());
    let mut acc: u128 = 0;
    let mut len: u128 = 0;

    for c in clean(input).chars() {
        acc = (acc * u128::from(BASE) + u128::from(u32::from(c))) % m;
        len += 1;
    }

    let value = (acc + len % m) % m;
    format!("{:03}", value)
}
