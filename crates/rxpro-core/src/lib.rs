//! # rxpro-core: Pure Business Logic for the RxPro Pharmacy POS
//!
//! This crate contains the business rules of the pharmacy counter as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RxPro POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/server)                       │   │
//! │  │    signup/login ──► cart ──► checkout ──► receipt / RX report  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rxpro-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  receipt  │  │   │
//! │  │   │ Customer  │  │   Money   │  │   Cart    │  │ text, RX  │  │   │
//! │  │   │ Drug      │  │  parsing  │  │ CartLine  │  │ history   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         rxpro-db (SQLite)      rxpro-inference (AI + PDF)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Drug, OrderRecord, Role)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Session cart with append-only lines
//! - [`receipt`] - Order history and text receipt rendering
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rxpro_core::cart::{Cart, NewCartLine};
//! use rxpro_core::money::Money;
//!
//! let mut cart = Cart::new();
//! cart.add(NewCartLine {
//!     name: "Paracetamol".to_string(),
//!     quantity: 2,
//!     unit_price: Some(Money::from_cents(1250)),
//!     usage: Some("Fever".to_string()),
//! })
//! .unwrap();
//!
//! assert_eq!(cart.total().cents(), 2500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartView, NewCartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::{OrderHistory, ReceiptOptions};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted unit price (1,000,000.00).
///
/// MAX_UNIT_PRICE × MAX_ITEM_QUANTITY × MAX_CART_ITEMS stays far inside
/// `i64`, so cart and order totals cannot overflow.
pub const MAX_UNIT_PRICE: Money = Money::from_cents(100_000_000);

/// Smallest id handed out for drugs and order suffixes.
pub const MIN_GENERATED_ID: i64 = 1000;

/// Largest id handed out for drugs and order suffixes.
pub const MAX_GENERATED_ID: i64 = 999_999;

/// Usage text stored when none was given.
pub const DEFAULT_USAGE: &str = "N/A";

/// Unit price applied when a cart line is added without one (10.00).
pub const DEFAULT_UNIT_PRICE: Money = Money::from_cents(1000);

/// Expiry date given to drugs that checkout creates on the fly.
pub fn default_expiry_date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2026, 12, 31).unwrap_or_default()
}
