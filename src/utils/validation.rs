//! Validation utilities

use crate::types::*;
use bigdecimal::BigDecimal;

/// Number of digits in a PIN
pub const PIN_LENGTH: usize = 4;

/// Number of digits in an account number
pub const ACCOUNT_ID_LENGTH: usize = 6;

/// Most digits allowed after the decimal point of an amount
pub const MAX_AMOUNT_SCALE: i64 = 8;

/// Most digits allowed before the decimal point of an amount
pub const MAX_AMOUNT_INTEGER_DIGITS: i64 = 15;

/// Validate that an amount is positive and of bounded size
///
/// Checks the exponent before anything that depends on the digit count, so an
/// input like `1e2000000` is refused without being expanded.
pub fn validate_positive_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount <= BigDecimal::from(0) {
        return Err(LedgerError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }

    let (_, scale) = amount.as_bigint_and_exponent();
    if scale > MAX_AMOUNT_SCALE {
        return Err(LedgerError::Validation(format!(
            "amount cannot have more than {} decimal places",
            MAX_AMOUNT_SCALE
        )));
    }

    let integer_digits = amount.digits() as i64 - scale;
    if scale < -MAX_AMOUNT_INTEGER_DIGITS || integer_digits > MAX_AMOUNT_INTEGER_DIGITS {
        return Err(LedgerError::Validation(format!(
            "amount cannot exceed {} digits before the decimal point",
            MAX_AMOUNT_INTEGER_DIGITS
        )));
    }

    Ok(())
}

/// Validate that a PIN is exactly four decimal digits
pub fn validate_pin(pin: &str) -> LedgerResult<()> {
    if pin.len() != PIN_LENGTH || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::Validation("pin must be 4 digits".to_string()));
    }

    Ok(())
}

/// Whether a string has the shape of a PIN
pub fn is_well_formed_pin(pin: &str) -> bool {
    validate_pin(pin).is_ok()
}

/// Validate that an account number is six decimal digits
pub fn validate_account_id(account_id: &str) -> LedgerResult<()> {
    if account_id.len() != ACCOUNT_ID_LENGTH || !account_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::Validation(
            "account number must be 6 digits".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an account name is valid
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "account name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > 100 {
        return Err(LedgerError::Validation(
            "account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}
