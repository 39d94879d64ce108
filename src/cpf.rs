//! Validation of Brazilian individual taxpayer numbers (CPF).
//!
//! A CPF has eleven digits; the last two are check digits computed from the
//! first nine. Punctuation such as `123.456.789-09` is accepted and ignored.

use thiserror::Error;

const CPF_LEN: usize = 11;

/// Why a CPF was rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CpfError {
    /// The input does not contain exactly eleven digits.
    #[error("cpf has an invalid format")]
    InvalidFormat,
    /// All eleven digits are the same, which is never a valid number.
    #[error("cpf has all digits equal")]
    RepeatedDigits,
    /// One of the check digits does not match.
    #[error("cpf has invalid check digits")]
    InvalidCheckDigit,
}

/// Validates a CPF with or without punctuation.
pub fn validate(cpf: &str) -> Result<(), CpfError> {
    let digits = normalize(cpf)?;

    if digits.iter().all(|&d| d == digits[0]) {
        return Err(CpfError::RepeatedDigits);
    }

    if check_digit(&digits[..9]) != digits[9] || check_digit(&digits[..10]) != digits[10] {
        return Err(CpfError::InvalidCheckDigit);
    }

    Ok(())
}

/// Strips everything that is not an ASCII digit.
fn normalize(cpf: &str) -> Result<[u8; CPF_LEN], CpfError> {
    let digits: Vec<u8> = cpf
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();
    digits.try_into().map_err(|_| CpfError::InvalidFormat)
}

/// Computes the check digit following `digits`.
///
/// Weights run from `digits.len() + 1` down to 2.
fn check_digit(digits: &[u8]) -> u8 {
    let weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * (weight - i as u32))
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        d => d as u8,
    }
}
