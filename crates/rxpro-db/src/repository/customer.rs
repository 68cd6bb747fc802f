//! # Customer Repository
//!
//! Registered customers. The email is the primary key; the display name is
//! what customers log in with and what orders are filed under, so it is
//! indexed but not unique.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use rxpro_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a customer.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the email is already registered
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(name = %customer.name, "Registering customer");

        sqlx::query(
            r#"
            INSERT INTO customers (email, name, password_hash, branch, phone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.email)
        .bind(&customer.name)
        .bind(&customer.password_hash)
        .bind(&customer.branch)
        .bind(&customer.phone)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &customer.email),
            other => other,
        })?;

        Ok(())
    }

    /// Every registered customer, oldest registration first.
    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT email, name, password_hash, branch, phone, created_at
            FROM customers
            ORDER BY created_at, email
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Customers registered under a display name.
    ///
    /// Several customers may share a name; login tries each in turn.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT email, name, password_hash, branch, phone, created_at
            FROM customers
            WHERE name = ?1
            ORDER BY created_at
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT email, name, password_hash, branch, phone, created_at
            FROM customers
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Total registered customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Utc;

    fn customer(email: &str, name: &str) -> Customer {
        Customer {
            email: email.to_string(),
            name: name.to_string(),
            password_hash: "hash".to_string(),
            branch: "Kochi".to_string(),
            phone: "+91 98470 00000".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        repo.insert(&customer("asha@example.com", "asha")).await.unwrap();

        let found = repo.get_by_email("asha@example.com").await.unwrap().unwrap();
        assert_eq!(found.name, "asha");
        assert_eq!(found.branch, "Kochi");
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        repo.insert(&customer("asha@example.com", "asha")).await.unwrap();
        let err = repo
            .insert(&customer("asha@example.com", "someone else"))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        assert!(err.to_string().contains("asha@example.com"));
    }

    #[tokio::test]
    async fn test_find_by_name_returns_all_matches() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        repo.insert(&customer("a@example.com", "ravi")).await.unwrap();
        repo.insert(&customer("b@example.com", "ravi")).await.unwrap();
        repo.insert(&customer("c@example.com", "meera")).await.unwrap();

        assert_eq!(repo.find_by_name("ravi").await.unwrap().len(), 2);
        assert!(repo.find_by_name("anil").await.unwrap().is_empty());
        assert_eq!(repo.list_all().await.unwrap().len(), 3);
    }
}
