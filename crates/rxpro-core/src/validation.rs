//! # Validation Module
//!
//! Input validation for signup, inventory and cart operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── PRIMARY KEY constraints (email, drug id, order id)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why No Commas In Drug Names?
//! Orders store their items as one comma-joined column. A comma inside a
//! name would split into two items when the order is read back.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Message shown when signup passwords differ.
pub const PASSWORD_MISMATCH: &str = "Passwords do not match!";

/// Message shown when a cart line has no product name.
pub const MISSING_PRODUCT_NAME: &str = "Please provide a product name.";

// =============================================================================
// String Validators
// =============================================================================

fn required_within(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a drug name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
/// - Must not contain a comma
///
/// ## Example
/// ```rust
/// use rxpro_core::validation::validate_drug_name;
///
/// assert!(validate_drug_name("Amoxicillin 500mg").is_ok());
/// assert!(validate_drug_name("").is_err());
/// assert!(validate_drug_name("A, B").is_err());
/// ```
pub fn validate_drug_name(name: &str) -> ValidationResult<()> {
    required_within("name", name, 200)?;

    if name.contains(',') {
        return Err(ValidationError::invalid("name", "must not contain commas"));
    }

    Ok(())
}

/// Validates a customer (login) name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required_within("name", name, 100)
}

/// Validates an email address.
///
/// Only the shape is checked: something before and after a single `@`.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    required_within("email", email, 254)?;

    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(())
        }
        _ => Err(ValidationError::invalid("email", "must look like name@domain")),
    }
}

/// Validates a phone number: digits, spaces, `+`, `-` and parentheses.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    required_within("phone", phone, 32)?;

    if !phone
        .trim()
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Err(ValidationError::invalid(
            "phone",
            "must contain only digits, spaces and + - ( )",
        ));
    }

    Ok(())
}

/// Validates signup passwords.
///
/// ## Rules
/// - Password must not be empty
/// - Confirmation must match exactly
pub fn validate_signup_passwords(password: &str, confirm: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password != confirm {
        return Err(ValidationError::Rule(PASSWORD_MISMATCH.to_string()));
    }

    Ok(())
}

/// Parses an expiry date in `YYYY-MM-DD` form.
pub fn parse_expiry_date(input: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid("expiry_date", "expected YYYY-MM-DD"))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an inventory quantity. Zero is allowed (sold out).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_UNIT_PRICE
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if price > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 1,
            max: MAX_UNIT_PRICE.cents(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
