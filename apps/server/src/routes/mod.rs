//! # HTTP Routes
//!
//! ```text
//! GET    /health
//!
//! POST   /api/auth/signup            any
//! POST   /api/auth/login             any
//! POST   /api/auth/logout            session
//!
//! GET    /api/drugs                  customer
//! GET    /api/cart                   customer
//! POST   /api/cart/items             customer
//! DELETE /api/cart/items/{index}     customer
//! DELETE /api/cart                   customer
//! POST   /api/cart/checkout          customer
//! GET    /api/orders                 customer
//! GET    /api/orders/receipt         customer
//! POST   /api/rx/analyze             customer
//!
//! GET    /api/admin/drugs            admin
//! POST   /api/admin/drugs            admin
//! PUT    /api/admin/drugs/{drug}/quantity   by name
//! DELETE /api/admin/drugs/{drug}            by id
//! GET    /api/admin/customers
//! GET    /api/admin/orders
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod rx;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/drugs", get(cart::list_drug_names))
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/items", post(cart::add_item))
        .route("/cart/items/{index}", delete(cart::remove_item))
        .route("/cart/checkout", post(cart::checkout))
        .route("/orders", get(orders::history))
        .route("/orders/receipt", get(orders::receipt))
        .route("/rx/analyze", post(rx::analyze))
        .route("/admin/drugs", get(admin::list_drugs).post(admin::add_drug))
        .route("/admin/drugs/{drug}/quantity", put(admin::set_quantity))
        .route("/admin/drugs/{drug}", delete(admin::delete_drug))
        .route("/admin/customers", get(admin::list_customers))
        .route("/admin/orders", get(admin::list_orders))
}

/// `Content-Disposition` value for a download.
pub(crate) fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", file_name.replace('"', "_"))
}
