//! # Domain Types
//!
//! Core domain types used throughout the pharmacy POS.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      Drug       │   │   OrderRecord   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  email (PK)     │   │  id (PK)        │   │  id "{u}_O1234" │       │
//! │  │  name           │   │  name           │   │  customer_name  │       │
//! │  │  password_hash  │   │  expiry_date    │   │  items   "a,b"  │       │
//! │  │  branch, phone  │   │  usage, qty     │   │  quantities,    │       │
//! │  └─────────────────┘   └─────────────────┘   │  prices         │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders keep their lines as comma-joined columns; [`OrderRecord::lines`]
//! in the receipt module explodes them back into [`OrderLine`]s.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Who is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer, as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Email address, the primary key.
    pub email: String,

    /// Display name, also the login name.
    pub name: String,

    /// Argon2 PHC string. Never serialized to clients; see [`CustomerProfile`].
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Store branch (state) the customer registered with.
    pub branch: String,

    pub phone: String,

    pub created_at: DateTime<Utc>,
}

/// Customer as shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerProfile {
    pub email: String,
    pub name: String,
    pub branch: String,
    pub phone: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerProfile {
    fn from(c: Customer) -> Self {
        CustomerProfile {
            email: c.email,
            name: c.name,
            branch: c.branch,
            phone: c.phone,
            created_at: c.created_at,
        }
    }
}

// =============================================================================
// Drug
// =============================================================================

/// A drug in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Drug {
    /// Numeric id in 1000..=999999, randomly assigned.
    pub id: i64,

    pub name: String,

    #[ts(as = "String")]
    pub expiry_date: NaiveDate,

    /// What the drug is used for.
    pub usage: String,

    /// Units on hand. Never negative.
    pub quantity: i64,
}

/// A drug about to be inserted, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDrug {
    pub name: String,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    pub usage: String,
    pub quantity: i64,
}

impl NewDrug {
    /// Attaches an id.
    pub fn with_id(self, id: i64) -> Drug {
        Drug {
            id,
            name: self.name,
            expiry_date: self.expiry_date,
            usage: self.usage,
            quantity: self.quantity,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One completed checkout, as stored.
///
/// `items`, `quantities` and `prices` are parallel comma-joined lists.
/// Orders written before prices were recorded have an empty `prices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderRecord {
    /// `{customer}_O{number}`
    pub id: String,
    pub customer_name: String,
    pub items: String,
    pub quantities: String,
    pub prices: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One exploded line of an order (history view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub order_id: String,
    pub item: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub total: Money,
    pub line_count: usize,
}
