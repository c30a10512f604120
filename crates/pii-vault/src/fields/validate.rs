//! Structural validation of SSNs and bank numbers.
//!
//! These are cheap pre-storage sanity checks. A passing routing number is
//! well-formed, not necessarily assigned to a real bank.

use thiserror::Error;

/// Exact digit count of an SSN.
pub const SSN_DIGITS: usize = 9;

/// Exact digit count of an ABA routing number.
pub const ROUTING_DIGITS: usize = 9;

/// A user-correctable input problem. The message is safe to show end users.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Strip every non-digit character from `s` and keep at most `max_len` digits.
pub fn digits_only(s: &str, max_len: usize) -> String {
    s.chars()
        .filter(char::is_ascii_digit)
        .take(max_len)
        .collect()
}

/// Reduce `s` to its digits and require exactly nine.
///
/// # Errors
///
/// [`ValidationError`] if any other number of digits remains.
pub fn validate_ssn_digits(s: &str) -> Result<String, ValidationError> {
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != SSN_DIGITS {
        return Err(ValidationError::new("SSN must contain exactly 9 digits"));
    }
    Ok(digits)
}

/// Check an ABA routing number.
///
/// Requires exactly nine ASCII digits with
/// `3(d0+d3+d6) + 7(d1+d4+d7) + (d2+d5+d8) ≡ 0 (mod 10)`.
pub fn validate_aba_routing(s: &str) -> bool {
    if s.len() != ROUTING_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    const WEIGHTS: [u32; 3] = [3, 7, 1];
    let sum: u32 = s
        .bytes()
        .enumerate()
        .map(|(i, b)| WEIGHTS[i % 3] * u32::from(b - b'0'))
        .sum();
    sum % 10 == 0
}
