//! # Receipts
//!
//! Order history and the downloadable text receipt.
//!
//! ## Receipt Layout
//! ```text
//! ==== KAMPS Royal Pharmacy ====
//! Customer: asha
//!
//! Order ID: asha_O48213
//! Items: Paracetamol,Cough Syrup
//! Quantities: 2,1
//! Prices: 12.50,10.00
//! ------------------------------
//!
//! Total: ₹35.00
//!
//! Date: 2026-10-19
//! Thank you for shopping with us!
//! Visit again 💚
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::money::Money;
use crate::types::{OrderLine, OrderRecord};

const SEPARATOR: &str = "------------------------------";

// =============================================================================
// Order <-> columns
// =============================================================================

impl OrderRecord {
    /// Builds the order row for a checked-out cart.
    pub fn from_cart(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        cart: &Cart,
        created_at: DateTime<Utc>,
    ) -> Self {
        OrderRecord {
            id: id.into(),
            customer_name: customer_name.into(),
            items: join_lines(cart, |l| l.name.clone()),
            quantities: join_lines(cart, |l| l.quantity.to_string()),
            prices: join_lines(cart, |l| l.unit_price.to_string()),
            created_at,
        }
    }

    /// Explodes the comma-joined columns into lines.
    ///
    /// Unparseable quantities count as zero and missing or unparseable prices
    /// as zero, so legacy rows still render.
    pub fn lines(&self) -> Vec<OrderLine> {
        if self.items.trim().is_empty() {
            return Vec::new();
        }

        let quantities: Vec<&str> = self.quantities.split(',').collect();
        let prices: Vec<&str> = if self.prices.trim().is_empty() {
            Vec::new()
        } else {
            self.prices.split(',').collect()
        };

        self.items
            .split(',')
            .enumerate()
            .map(|(i, item)| {
                let quantity = quantities
                    .get(i)
                    .and_then(|q| q.trim().parse::<i64>().ok())
                    .unwrap_or(0);
                let unit_price = prices
                    .get(i)
                    .and_then(|p| Money::parse_decimal(p).ok())
                    .unwrap_or_default();
                OrderLine {
                    order_id: self.id.clone(),
                    item: item.trim().to_string(),
                    quantity,
                    unit_price,
                    subtotal: unit_price.multiply_quantity(quantity),
                }
            })
            .collect()
    }

    /// Sum of line subtotals.
    pub fn total(&self) -> Money {
        self.lines().iter().map(|l| l.subtotal).sum()
    }

    /// The order rendered as RX text for the inference call.
    pub fn rx_text(&self) -> String {
        let mut out = format!(
            "Customer: {}\nItems: {}\nQuantities: {}",
            self.customer_name, self.items, self.quantities
        );
        if !self.prices.is_empty() {
            out.push_str(&format!("\nPrices: {}", self.prices));
        }
        out
    }
}

fn join_lines(cart: &Cart, column: impl Fn(&CartLine) -> String) -> String {
    cart.lines().iter().map(column).collect::<Vec<_>>().join(",")
}

// =============================================================================
// History
// =============================================================================

/// Every line of a set of orders, plus the grand total.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderHistory {
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

impl OrderHistory {
    pub fn from_orders(orders: &[OrderRecord]) -> Self {
        let lines: Vec<OrderLine> = orders.iter().flat_map(OrderRecord::lines).collect();
        let total = lines.iter().map(|l| l.subtotal).sum();
        OrderHistory { lines, total }
    }
}

// =============================================================================
// Text Receipt
// =============================================================================

/// Store-level settings that shape a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptOptions {
    pub store_name: String,
    pub currency_symbol: String,
    /// Printed after the date, one entry per line.
    pub footer: Vec<String>,
}

impl Default for ReceiptOptions {
    fn default() -> Self {
        ReceiptOptions {
            store_name: "KAMPS Royal Pharmacy".to_string(),
            currency_symbol: "₹".to_string(),
            footer: vec![
                "Thank you for shopping with us!".to_string(),
                "Visit again 💚".to_string(),
            ],
        }
    }
}

/// Renders the text receipt for all of a customer's orders.
pub fn render_text_receipt(
    options: &ReceiptOptions,
    customer: &str,
    orders: &[OrderRecord],
    date: NaiveDate,
) -> String {
    let mut out = format!("==== {} ====\nCustomer: {}\n\n", options.store_name, customer);

    for order in orders {
        out.push_str(&format!(
            "Order ID: {}\nItems: {}\nQuantities: {}\n",
            order.id, order.items, order.quantities
        ));
        if !order.prices.is_empty() {
            out.push_str(&format!("Prices: {}\n", order.prices));
        }
        out.push_str(SEPARATOR);
        out.push('\n');
    }

    let total: Money = orders.iter().map(OrderRecord::total).sum();
    out.push_str(&format!(
        "\nTotal: {}\n",
        total.display_with(&options.currency_symbol)
    ));

    out.push_str(&format!("\nDate: {}", date.format("%Y-%m-%d")));
    for line in &options.footer {
        out.push('\n');
        out.push_str(line);
    }
    out
}

/// File name offered for the text receipt download.
pub fn receipt_file_name(customer: &str) -> String {
    format!("{}_receipt.txt", customer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::NewCartLine;

    fn order(id: &str, items: &str, quantities: &str, prices: &str) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            customer_name: "asha".to_string(),
            items: items.to_string(),
            quantities: quantities.to_string(),
            prices: prices.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_cart_joins_columns() {
        let mut cart = Cart::new();
        for (name, qty, cents) in [("Paracetamol", 2, 1250), ("Zinc", 1, 300)] {
            cart.add(NewCartLine {
                name: name.to_string(),
                quantity: qty,
                unit_price: Some(Money::from_cents(cents)),
                usage: None,
            })
            .unwrap();
        }

        let record = OrderRecord::from_cart("asha_O1234", "asha", &cart, Utc::now());
        assert_eq!(record.items, "Paracetamol,Zinc");
        assert_eq!(record.quantities, "2,1");
        assert_eq!(record.prices, "12.50,3.00");
        assert_eq!(record.total().cents(), 2800);
    }

    #[test]
    fn test_lines_handles_legacy_rows() {
        let legacy = order("asha_O1", "Aspirin,Zinc", "3,x", "");
        let lines = legacy.lines();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[1].quantity, 0);
        assert!(lines.iter().all(|l| l.subtotal.is_zero()));
        assert!(order("asha_O2", "", "", "").lines().is_empty());
    }

    #[test]
    fn test_history_total() {
        let orders = vec![
            order("asha_O1", "A,B", "1,2", "10.00,5.00"),
            order("asha_O2", "C", "4", "2.50"),
        ];
        let history = OrderHistory::from_orders(&orders);

        assert_eq!(history.lines.len(), 3);
        assert_eq!(history.total.cents(), 3000);
    }

    #[test]
    fn test_render_text_receipt() {
        let orders = vec![order("asha_O1", "Aspirin", "2", "10.00")];
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let text = render_text_receipt(&ReceiptOptions::default(), "asha", &orders, date);

        assert_eq!(
            text,
            "==== KAMPS Royal Pharmacy ====\nCustomer: asha\n\n\
             Order ID: asha_O1\nItems: Aspirin\nQuantities: 2\nPrices: 10.00\n\
             ------------------------------\n\
             \nTotal: ₹20.00\n\
             \nDate: 2026-10-19\nThank you for shopping with us!\nVisit again 💚"
        );
    }

    #[test]
    fn test_rx_text() {
        let with_prices = order("asha_O1", "Aspirin", "2", "10.00");
        assert_eq!(
            with_prices.rx_text(),
            "Customer: asha\nItems: Aspirin\nQuantities: 2\nPrices: 10.00"
        );

        let legacy = order("asha_O2", "Aspirin", "2", "");
        assert!(!legacy.rx_text().contains("Prices"));
    }

    #[test]
    fn test_receipt_file_name() {
        assert_eq!(receipt_file_name("asha"), "asha_receipt.txt");
    }
}
