//! One-time code generation and comparison

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, RngCore};

use crate::domain::entities::CODE_LENGTH;

const CODE_MIN: u32 = 100_000;
const CODE_SPAN: u32 = 900_000;

/// Largest multiple of `CODE_SPAN` representable in a u32; draws at or above it are rejected
const REJECTION_BOUND: u32 = u32::MAX - (u32::MAX % CODE_SPAN);

/// Generate a 6-digit code uniformly over 100000..=999999 from the OS CSPRNG
pub fn generate_code() -> String {
    let mut rng = OsRng;
    loop {
        let draw = rng.next_u32();
        if draw < REJECTION_BOUND {
            return (CODE_MIN + draw % CODE_SPAN).to_string();
        }
    }
}

/// Exactly six ASCII digits
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Constant-time equality for codes of equal length
pub fn codes_match(stored: &str, provided: &str) -> bool {
    if stored.len() != provided.len() {
        return false;
    }
    constant_time_eq(stored.as_bytes(), provided.as_bytes())
}
