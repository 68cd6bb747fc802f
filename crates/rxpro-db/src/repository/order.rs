//! # Order Repository
//!
//! Order history and checkout.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  checkout("asha", &cart)                                │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    for each cart line:                                                  │
//! │      UPDATE drugs SET quantity = MAX(0, quantity - n) WHERE name = ?    │
//! │      no row? ──► INSERT drug (random id, 2026-12-31, usage, n)          │
//! │    INSERT order "asha_O<random>" (retry on id clash)                    │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure rolls the whole checkout back; the cart is untouched.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::ids::{order_id, random_id, MAX_ID_ATTEMPTS};
use rxpro_core::{default_expiry_date, Cart, CartLine, CheckoutReceipt, CoreError, OrderRecord};

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a fully formed order row.
    pub async fn insert(&self, order: &OrderRecord) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_order(&mut conn, order).await
    }

    /// Every order, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<OrderRecord>> {
        let orders = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, customer_name, items, quantities, prices, created_at
            FROM orders
            ORDER BY created_at, rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// A customer's orders, oldest first.
    pub async fn list_by_customer(&self, customer_name: &str) -> DbResult<Vec<OrderRecord>> {
        let orders = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, customer_name, items, quantities, prices, created_at
            FROM orders
            WHERE customer_name = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(customer_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// A customer's most recent order.
    pub async fn latest_for_customer(&self, customer_name: &str) -> DbResult<Option<OrderRecord>> {
        let order = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, customer_name, items, quantities, prices, created_at
            FROM orders
            WHERE customer_name = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(customer_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Turns a cart into an order and adjusts inventory, atomically.
    ///
    /// Nothing is written unless every line and the order row succeed.
    ///
    /// ## Errors
    /// * `DbError::Rule(CoreError::CartEmpty)` - nothing to check out
    /// * `DbError::IdsExhausted` - no free order or drug id could be drawn
    pub async fn checkout(&self, customer_name: &str, cart: &Cart) -> DbResult<CheckoutReceipt> {
        if cart.is_empty() {
            return Err(CoreError::CartEmpty.into());
        }

        debug!(customer = %customer_name, lines = cart.len(), "Starting checkout");

        let mut tx = self.pool.begin().await?;

        for line in cart.lines() {
            deduct_stock(&mut tx, line).await?;
        }

        let created_at = Utc::now();
        let mut placed = None;
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let order = OrderRecord::from_cart(order_id(customer_name), customer_name, cart, created_at);
            match insert_order(&mut tx, &order).await {
                Ok(()) => {
                    placed = Some(order);
                    break;
                }
                Err(e) if e.is_unique_violation() => {
                    warn!(id = %order.id, attempt, "Order id collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        let order = placed.ok_or_else(|| DbError::IdsExhausted {
            entity: "order".to_string(),
            attempts: MAX_ID_ATTEMPTS,
        })?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(order_id = %order.id, total = %cart.total(), "Order placed");

        Ok(CheckoutReceipt {
            order_id: order.id,
            total: cart.total(),
            line_count: cart.len(),
        })
    }

    /// Total orders recorded.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Statements shared by pool and transaction callers
// =============================================================================

async fn insert_order(conn: &mut SqliteConnection, order: &OrderRecord) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (id, customer_name, items, quantities, prices, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&order.id)
    .bind(&order.customer_name)
    .bind(&order.items)
    .bind(&order.quantities)
    .bind(&order.prices)
    .bind(order.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Takes a sold line out of stock, never below zero.
///
/// A drug sold but not yet stocked is recorded with the default expiry and
/// the sold quantity.
async fn deduct_stock(conn: &mut SqliteConnection, line: &CartLine) -> DbResult<()> {
    let result = sqlx::query("UPDATE drugs SET quantity = MAX(0, quantity - ?1) WHERE name = ?2")
        .bind(line.quantity)
        .bind(&line.name)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    for attempt in 1..=MAX_ID_ATTEMPTS {
        let id = random_id();
        let inserted = sqlx::query(
            r#"
            INSERT INTO drugs (id, name, expiry_date, usage, quantity)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id)
        .bind(&line.name)
        .bind(default_expiry_date())
        .bind(&line.usage)
        .bind(line.quantity)
        .execute(&mut *conn)
        .await
        .map_err(DbError::from);

        match inserted {
            Ok(_) => {
                debug!(id, name = %line.name, "Unstocked drug recorded at checkout");
                return Ok(());
            }
            Err(e) if e.is_unique_violation() => {
                warn!(id, attempt, "Drug id collision, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(DbError::IdsExhausted {
        entity: "drug".to_string(),
        attempts: MAX_ID_ATTEMPTS,
    })
}
