//! Note identifier generation

use rand::{distr::Alphanumeric, Rng};

/// Length of generated note identifiers
pub const UID_LENGTH: usize = 21;

/// Longest identifier accepted from a caller
pub const MAX_UID_LENGTH: usize = 64;

/// Generates a random 21-character identifier from `[A-Za-z0-9]`
///
/// Uses the thread-local CSPRNG, so collisions between generated identifiers
/// are negligible (about 125 bits of entropy).
pub fn generate() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(UID_LENGTH)
        .map(char::from)
        .collect()
}

/// Checks a caller-supplied identifier: non-empty, bounded, URL-safe
pub fn is_well_formed(uid: &str) -> bool {
    !uid.is_empty()
        && uid.len() <= MAX_UID_LENGTH
        && uid
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
