//! # Drug Repository
//!
//! The pharmacy's inventory. Drugs are keyed by a random numeric id; the
//! name is what customers type into the cart and what checkout matches on.
//!
//! ```text
//! Admin adds "Paracetamol 500mg"
//!      │
//!      ▼
//! random_id() ──► INSERT ── UNIQUE clash? ──► draw again (up to 16 times)
//!      │
//!      ▼
//! Drug { id: 48213, name, expiry_date, usage, quantity }
//! ```

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::ids::{random_id, MAX_ID_ATTEMPTS};
use rxpro_core::{Drug, NewDrug};

/// Repository for drug inventory operations.
#[derive(Debug, Clone)]
pub struct DrugRepository {
    pool: SqlitePool,
}

impl DrugRepository {
    /// Creates a new DrugRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DrugRepository { pool }
    }

    /// Inserts a drug with a caller-chosen id.
    pub async fn insert(&self, drug: &Drug) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO drugs (id, name, expiry_date, usage, quantity)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(drug.id)
        .bind(&drug.name)
        .bind(drug.expiry_date)
        .bind(&drug.usage)
        .bind(drug.quantity)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a drug under a freshly drawn random id.
    ///
    /// ## Errors
    /// * `DbError::IdsExhausted` - every drawn id was already taken
    pub async fn add(&self, new_drug: NewDrug) -> DbResult<Drug> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let drug = new_drug.clone().with_id(random_id());

            match self.insert(&drug).await {
                Ok(()) => {
                    debug!(id = drug.id, name = %drug.name, "Drug added");
                    return Ok(drug);
                }
                Err(e) if e.is_unique_violation() => {
                    warn!(id = drug.id, attempt, "Drug id collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DbError::IdsExhausted {
            entity: "drug".to_string(),
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Full inventory, sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Drug>> {
        let drugs = sqlx::query_as::<_, Drug>(
            r#"
            SELECT id, name, expiry_date, usage, quantity
            FROM drugs
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(drugs)
    }

    /// Distinct drug names for the cart's product picker.
    pub async fn list_names(&self) -> DbResult<Vec<String>> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT name FROM drugs ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(names)
    }

    /// First drug stocked under `name` (lowest id).
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Drug>> {
        let drug = sqlx::query_as::<_, Drug>(
            r#"
            SELECT id, name, expiry_date, usage, quantity
            FROM drugs
            WHERE name = ?1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(drug)
    }

    /// Gets a drug by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Drug>> {
        let drug = sqlx::query_as::<_, Drug>(
            r#"
            SELECT id, name, expiry_date, usage, quantity
            FROM drugs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(drug)
    }

    /// Sets the stock level of every drug with this name.
    ///
    /// Returns the number of rows updated.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no drug has this name
    pub async fn update_quantity(&self, name: &str, quantity: i64) -> DbResult<u64> {
        debug!(name = %name, quantity, "Updating drug quantity");

        let result = sqlx::query("UPDATE drugs SET quantity = ?1 WHERE name = ?2")
            .bind(quantity)
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Drug", name));
        }

        Ok(result.rows_affected())
    }

    /// Deletes a drug by id.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM drugs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Drug", id.to_string()));
        }

        debug!(id, "Drug deleted");
        Ok(())
    }

    /// Number of drug rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM drugs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use rxpro_core::{MAX_GENERATED_ID, MIN_GENERATED_ID};

    fn new_drug(name: &str, quantity: i64) -> NewDrug {
        NewDrug {
            name: name.to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2027, 3, 31).unwrap(),
            usage: "Fever".to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_add_assigns_random_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.drugs();

        let drug = repo.add(new_drug("Paracetamol", 40)).await.unwrap();
        assert!((MIN_GENERATED_ID..=MAX_GENERATED_ID).contains(&drug.id));

        let stored = repo.get_by_id(drug.id).await.unwrap().unwrap();
        assert_eq!(stored, drug);
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.drugs();

        repo.add(new_drug("Zinc", 5)).await.unwrap();
        repo.add(new_drug("Amoxicillin", 10)).await.unwrap();
        repo.add(new_drug("Amoxicillin", 3)).await.unwrap();

        let names: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Amoxicillin", "Amoxicillin", "Zinc"]);
        assert_eq!(repo.list_names().await.unwrap(), vec!["Amoxicillin", "Zinc"]);
    }

    #[tokio::test]
    async fn test_update_quantity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.drugs();
        repo.add(new_drug("Cetirizine", 12)).await.unwrap();

        assert_eq!(repo.update_quantity("Cetirizine", 50).await.unwrap(), 1);
        let drug = repo.get_by_name("Cetirizine").await.unwrap().unwrap();
        assert_eq!(drug.quantity, 50);

        let err = repo.update_quantity("Unknown", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected_by_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.drugs();
        repo.add(new_drug("Cetirizine", 12)).await.unwrap();

        assert!(repo.update_quantity("Cetirizine", -1).await.is_err());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.drugs();
        let drug = repo.add(new_drug("Ibuprofen", 8)).await.unwrap();

        repo.delete(drug.id).await.unwrap();
        assert!(repo.get_by_id(drug.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(drug.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.drugs();
        let drug = new_drug("Ibuprofen", 8).with_id(4242);

        repo.insert(&drug).await.unwrap();
        assert!(repo.insert(&drug).await.unwrap_err().is_unique_violation());
    }
}
