//! A customer's order history and downloadable text receipt.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;

use rxpro_core::receipt::{receipt_file_name, render_text_receipt};
use rxpro_core::OrderHistory;

use crate::auth::CustomerUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::attachment;
use crate::state::AppState;

/// `GET /api/orders`
pub async fn history(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
) -> ApiResult<Json<OrderHistory>> {
    let orders = state.db.orders().list_by_customer(&user.username).await?;
    Ok(Json(OrderHistory::from_orders(&orders)))
}

/// `GET /api/orders/receipt`
pub async fn receipt(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
) -> ApiResult<Response> {
    let orders = state.db.orders().list_by_customer(&user.username).await?;
    if orders.is_empty() {
        return Err(ApiError::not_found("Orders for customer", &user.username));
    }

    let text = render_text_receipt(
        &state.config.store.receipt_options(),
        &user.username,
        &orders,
        Local::now().date_naive(),
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                attachment(&receipt_file_name(&user.username)),
            ),
        ],
        text,
    )
        .into_response())
}
