//! Store administration: inventory, customers and the full order log.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use rxpro_core::validation::{parse_expiry_date, validate_drug_name, validate_stock_quantity};
use rxpro_core::{CustomerProfile, Drug, NewDrug, OrderHistory, DEFAULT_USAGE};

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddDrugRequest {
    pub name: String,
    /// `YYYY-MM-DD`
    pub expiry_date: String,
    #[serde(default)]
    pub usage: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct QuantityUpdated {
    pub name: String,
    pub quantity: i64,
    /// Rows that share the name.
    pub updated: u64,
}

/// `GET /api/admin/drugs`
pub async fn list_drugs(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> ApiResult<Json<Vec<Drug>>> {
    Ok(Json(state.db.drugs().list_all().await?))
}

/// `POST /api/admin/drugs`
pub async fn add_drug(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<AddDrugRequest>,
) -> ApiResult<(StatusCode, Json<Drug>)> {
    let name = req.name.trim().to_string();
    validate_drug_name(&name)?;
    let expiry_date = parse_expiry_date(&req.expiry_date)?;
    validate_stock_quantity(req.quantity)?;

    let usage = req
        .usage
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_USAGE.to_string());

    let drug = state
        .db
        .drugs()
        .add(NewDrug {
            name,
            expiry_date,
            usage,
            quantity: req.quantity,
        })
        .await?;

    info!(admin = %admin.username, drug_id = drug.id, name = %drug.name, "Drug added");
    Ok((StatusCode::CREATED, Json(drug)))
}

/// `PUT /api/admin/drugs/{drug}/quantity` (by name)
pub async fn set_quantity(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(name): Path<String>,
    Json(req): Json<SetQuantityRequest>,
) -> ApiResult<Json<QuantityUpdated>> {
    validate_stock_quantity(req.quantity)?;
    let updated = state.db.drugs().update_quantity(&name, req.quantity).await?;

    info!(admin = %admin.username, name = %name, quantity = req.quantity, "Stock updated");
    Ok(Json(QuantityUpdated {
        name,
        quantity: req.quantity,
        updated,
    }))
}

/// `DELETE /api/admin/drugs/{drug}` (by id)
pub async fn delete_drug(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db.drugs().delete(id).await?;
    info!(admin = %admin.username, drug_id = id, "Drug deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/admin/customers`
pub async fn list_customers(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> ApiResult<Json<Vec<CustomerProfile>>> {
    let customers = state.db.customers().list_all().await?;
    Ok(Json(customers.into_iter().map(CustomerProfile::from).collect()))
}

/// `GET /api/admin/orders`
///
/// Every customer's orders, one line per item with its subtotal.
pub async fn list_orders(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> ApiResult<Json<OrderHistory>> {
    let orders = state.db.orders().list_all().await?;
    Ok(Json(OrderHistory::from_orders(&orders)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_and_list_drugs() {
        let app = TestApp::new().await;
        let token = app.admin().await;

        let (status, drug) = app
            .post(
                "/api/admin/drugs",
                Some(&token),
                json!({ "name": "Cetirizine", "expiry_date": "2027-03-01", "quantity": 40 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(drug["usage"], "N/A");
        let id = drug["id"].as_i64().unwrap();
        assert!((1000..=999_999).contains(&id));

        let (status, drugs) = app.get("/api/admin/drugs", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(drugs.as_array().unwrap().len(), 1);
        assert_eq!(drugs[0]["name"], "Cetirizine");
    }

    #[tokio::test]
    async fn test_add_drug_validation() {
        let app = TestApp::new().await;
        let token = app.admin().await;

        let (status, body) = app
            .post(
                "/api/admin/drugs",
                Some(&token),
                json!({ "name": "Cetirizine", "expiry_date": "03/01/2027", "quantity": 40 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = app
            .post(
                "/api/admin/drugs",
                Some(&token),
                json!({ "name": "", "expiry_date": "2027-03-01", "quantity": 1 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .post(
                "/api/admin/drugs",
                Some(&token),
                json!({ "name": "Cetirizine", "expiry_date": "2027-03-01", "quantity": -2 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_set_quantity_and_delete() {
        let app = TestApp::new().await;
        let token = app.admin().await;
        let (_, drug) = app
            .post(
                "/api/admin/drugs",
                Some(&token),
                json!({ "name": "Losartan", "expiry_date": "2027-01-15", "usage": "Blood pressure", "quantity": 5 }),
            )
            .await;

        let (status, body) = app
            .put("/api/admin/drugs/Losartan/quantity", Some(&token), json!({ "quantity": 60 }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], 1);

        let (status, _) = app
            .put("/api/admin/drugs/Unknown/quantity", Some(&token), json!({ "quantity": 1 }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("/api/admin/drugs/{}", drug["id"]);
        let (status, _) = app.delete(&uri, Some(&token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.delete(&uri, Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_customers_and_orders_listing() {
        let app = TestApp::new().await;
        let customer = app.customer("ravi").await;
        app.add_to_cart(&customer, "Pantoprazole", 1, 700).await;
        app.post("/api/cart/checkout", Some(&customer), json!({})).await;
        let token = app.admin().await;

        let (status, customers) = app.get("/api/admin/customers", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(customers[0]["email"], "ravi@example.com");
        assert!(customers[0].get("password_hash").is_none());

        let other = app.customer("meena").await;
        app.add_to_cart(&other, "Zinc", 3, 200).await;
        app.add_to_cart(&other, "Cetirizine", 1, 150).await;
        app.post("/api/cart/checkout", Some(&other), json!({})).await;

        let (status, history) = app.get("/api/admin/orders", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        let lines = history["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0]["order_id"].as_str().unwrap().starts_with("ravi_O"));
        assert_eq!(lines[0]["item"], "Pantoprazole");
        assert_eq!(lines[0]["subtotal"], 700);
        let zinc = lines.iter().find(|l| l["item"] == "Zinc").unwrap();
        assert_eq!(zinc["quantity"], 3);
        assert_eq!(zinc["subtotal"], 600);
        assert_eq!(history["total"], 1450);
    }

    #[tokio::test]
    async fn test_customer_cannot_administer() {
        let app = TestApp::new().await;
        let token = app.customer("ravi").await;

        let (status, body) = app.get("/api/admin/drugs", Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        let (status, _) = app.get("/api/admin/orders", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
