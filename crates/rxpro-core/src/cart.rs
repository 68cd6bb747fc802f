//! # Cart
//!
//! The counter cart a customer fills before checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Client Action            Endpoint                   Cart Change        │
//! │  ─────────────            ────────                   ───────────        │
//! │                                                                         │
//! │  Add product ────────────► POST /api/cart/items ───► lines.push(line)  │
//! │                                                                         │
//! │  Remove line ────────────► DELETE /items/{i} ──────► lines.remove(i)   │
//! │                                                                         │
//! │  Clear ──────────────────► DELETE /api/cart ───────► lines.clear()     │
//! │                                                                         │
//! │  Complete order ─────────► POST /checkout ─────────► order row, clear  │
//! │                                                                         │
//! │  NOTE: adding the same drug twice gives two lines. Lines are never     │
//! │        merged, so each one lands in the order exactly as entered.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{self, MISSING_PRODUCT_NAME};
use crate::{DEFAULT_UNIT_PRICE, DEFAULT_USAGE, MAX_CART_ITEMS};
#[cfg(test)]
use crate::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Input for [`Cart::add`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCartLine {
    pub name: String,
    pub quantity: i64,
    /// Defaults to [`DEFAULT_UNIT_PRICE`].
    pub unit_price: Option<Money>,
    /// Defaults to `N/A`.
    pub usage: Option<String>,
}

/// A line in the cart.
///
/// The price is frozen when the line is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub usage: String,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Unit price × quantity.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines keep insertion order
/// - Every line has a non-empty, comma-free name, quantity in 1..=999 and a
///   positive price
/// - At most [`MAX_CART_ITEMS`] lines
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,

    /// When the cart was created/last cleared
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Validates and appends a line.
    ///
    /// ## Returns
    /// The index of the new line.
    pub fn add(&mut self, line: NewCartLine) -> CoreResult<usize> {
        let name = line.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Rule(MISSING_PRODUCT_NAME.to_string()).into());
        }
        validation::validate_drug_name(name)?;
        validation::validate_quantity(line.quantity)?;

        let unit_price = line.unit_price.unwrap_or(DEFAULT_UNIT_PRICE);
        validation::validate_unit_price(unit_price)?;

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        // Checked so an out-of-range total is an error, never a wrap.
        let subtotal = unit_price.checked_multiply_quantity(line.quantity)?;
        self.total().checked_add(subtotal)?;

        let usage = line
            .usage
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_USAGE)
            .to_string();

        self.lines.push(CartLine {
            name: name.to_string(),
            quantity: line.quantity,
            unit_price,
            usage,
            added_at: Utc::now(),
        });

        Ok(self.lines.len() - 1)
    }

    /// Removes the line at `index`.
    pub fn remove(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::CartIndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    /// Puts lines taken out for a failed checkout back in front of anything
    /// added since.
    pub fn restore(&mut self, taken: Cart) {
        let added_since = std::mem::take(&mut self.lines);
        self.lines = taken.lines;
        self.lines.extend(added_since);
        self.created_at = taken.created_at;
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line subtotals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Renders the cart as the POS transaction summary used as RX text.
    ///
    /// ```text
    /// POS Transaction Summary:
    /// - Paracetamol × 2 @ ₹12.50 (Use: Fever)
    /// Total: ₹25.00
    /// ```
    pub fn summary_text(&self, currency_symbol: &str) -> String {
        let mut out = String::from("POS Transaction Summary:\n");
        for line in &self.lines {
            out.push_str(&format!(
                "- {} × {} @ {} (Use: {})\n",
                line.name,
                line.quantity,
                line.unit_price.display_with(currency_symbol),
                line.usage
            ));
        }
        out.push_str(&format!(
            "Total: {}",
            self.total().display_with(currency_symbol)
        ));
        out
    }
}

/// Cart summary for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: Money,
}

/// A cart line with its subtotal and position.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineView {
    pub index: usize,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub usage: String,
    pub subtotal: Money,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            lines: cart
                .lines
                .iter()
                .enumerate()
                .map(|(index, l)| CartLineView {
                    index,
                    name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    usage: l.usage.clone(),
                    subtotal: l.subtotal(),
                })
                .collect(),
            total: cart.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, quantity: i64, cents: i64) -> NewCartLine {
        NewCartLine {
            name: name.to_string(),
            quantity,
            unit_price: Some(Money::from_cents(cents)),
            usage: None,
        }
    }

    #[test]
    fn test_cart_add_line() {
        let mut cart = Cart::new();
        cart.add(line("Paracetamol", 2, 1250)).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total().cents(), 2500);
        assert_eq!(cart.lines()[0].usage, "N/A");
    }

    #[test]
    fn test_cart_same_drug_twice_appends() {
        let mut cart = Cart::new();
        cart.add(line("Paracetamol", 2, 1000)).unwrap();
        cart.add(line("Paracetamol", 3, 1000)).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total().cents(), 5000);
    }

    #[test]
    fn test_cart_default_price() {
        let mut cart = Cart::new();
        cart.add(NewCartLine {
            name: "Cough Syrup".to_string(),
            quantity: 1,
            unit_price: None,
            usage: Some("  Cough ".to_string()),
        })
        .unwrap();

        assert_eq!(cart.lines()[0].unit_price, DEFAULT_UNIT_PRICE);
        assert_eq!(cart.lines()[0].usage, "Cough");
    }

    #[test]
    fn test_cart_rejects_empty_name() {
        let mut cart = Cart::new();
        let err = cart.add(line("  ", 1, 100)).unwrap_err();

        assert_eq!(err.to_string(), "Validation error: Please provide a product name.");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_rejects_bad_quantity_and_price() {
        let mut cart = Cart::new();
        assert!(cart.add(line("Ibuprofen", 0, 100)).is_err());
        assert!(cart.add(line("Ibuprofen", 1, 0)).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_limit() {
        let mut cart = Cart::new();
        for _ in 0..MAX_CART_ITEMS {
            cart.add(line("Zinc", 1, 100)).unwrap();
        }
        assert!(matches!(
            cart.add(line("Zinc", 1, 100)),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_cart_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(line("A", 1, 100)).unwrap();
        cart.add(line("B", 1, 200)).unwrap();

        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.name, "A");
        assert_eq!(cart.lines()[0].name, "B");
        assert!(cart.remove(5).is_err());

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_rejects_price_above_cap() {
        let mut cart = Cart::new();
        let err = cart.add(line("Zinc", 2, i64::MAX / 2 + 1)).unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());

        cart.add(line("Zinc", MAX_ITEM_QUANTITY, MAX_UNIT_PRICE.cents()))
            .unwrap();
        assert_eq!(
            cart.total().cents(),
            MAX_UNIT_PRICE.cents() * MAX_ITEM_QUANTITY
        );
    }

    #[test]
    fn test_restore_keeps_order() {
        let mut cart = Cart::new();
        cart.add(line("A", 1, 100)).unwrap();
        let taken = std::mem::take(&mut cart);
        assert!(cart.is_empty());

        cart.add(line("B", 1, 200)).unwrap();
        cart.restore(taken);

        let names: Vec<_> = cart.lines().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_summary_text() {
        let mut cart = Cart::new();
        cart.add(NewCartLine {
            name: "Paracetamol".to_string(),
            quantity: 2,
            unit_price: Some(Money::from_cents(1250)),
            usage: Some("Fever".to_string()),
        })
        .unwrap();

        assert_eq!(
            cart.summary_text("₹"),
            "POS Transaction Summary:\n- Paracetamol × 2 @ ₹12.50 (Use: Fever)\nTotal: ₹25.00"
        );
    }

    #[test]
    fn test_cart_view() {
        let mut cart = Cart::new();
        cart.add(line("A", 2, 150)).unwrap();
        let view = CartView::from(&cart);

        assert_eq!(view.lines[0].index, 0);
        assert_eq!(view.lines[0].subtotal.cents(), 300);
        assert_eq!(view.total.cents(), 300);
    }
}
