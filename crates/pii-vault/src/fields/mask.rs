//! Last-4 fingerprints and display strings.
//!
//! Masked helpers take only a last-4 fingerprint, so a masked string can
//! never carry more than four original digits.

/// Final four digits of `value`'s digit-only form, or empty if it has fewer
/// than four digits.
pub fn last4(value: &str) -> String {
    let digits: Vec<char> = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return String::new();
    }
    digits[digits.len() - 4..].iter().collect()
}

/// `•••-••-1234`, or empty when there is no fingerprint.
pub fn masked_ssn(last4: &str) -> String {
    if last4.is_empty() {
        return String::new();
    }
    format!("•••-••-{last4}")
}

/// `123-45-6789` from nine digits. Other lengths are returned unchanged.
pub fn full_ssn(digits: &str) -> String {
    if digits.len() != 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.to_owned();
    }
    format!("{}-{}-{}", &digits[..3], &digits[3..5], &digits[5..])
}

/// `Routing ****1234`, or empty when there is no fingerprint.
pub fn masked_routing(last4: &str) -> String {
    masked_bank("Routing", last4)
}

/// `Account ****5678`, or empty when there is no fingerprint.
pub fn masked_account(last4: &str) -> String {
    masked_bank("Account", last4)
}

fn masked_bank(label: &str, last4: &str) -> String {
    if last4.is_empty() {
        return String::new();
    }
    format!("{label} ****{last4}")
}
