//! Product picker, cart and checkout.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, warn};

use rxpro_core::{Cart, CartView, CheckoutReceipt, CoreError, Money, NewCartLine};

use crate::auth::CustomerUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    pub quantity: i64,
    /// Price in minor units; the default unit price applies when absent.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    #[serde(default)]
    pub usage: Option<String>,
}

fn session_ended() -> ApiError {
    ApiError::unauthorized("Session has ended, please log in again")
}

/// `GET /api/drugs`
pub async fn list_drug_names(
    State(state): State<AppState>,
    _user: CustomerUser,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.db.drugs().list_names().await?))
}

/// `GET /api/cart`
pub async fn get_cart(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
) -> ApiResult<Json<CartView>> {
    state
        .sessions
        .with_cart(&user.session_id, |cart| Json(CartView::from(cart)))
        .ok_or_else(session_ended)
}

/// `POST /api/cart/items`
pub async fn add_item(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<(StatusCode, Json<CartView>)> {
    debug!(name = %req.name, quantity = req.quantity, "add_item");

    let line = NewCartLine {
        name: req.name,
        quantity: req.quantity,
        unit_price: req.unit_price_cents.map(Money::from_cents),
        usage: req.usage,
    };

    let view = state
        .sessions
        .with_cart_mut(&user.session_id, |cart| {
            cart.add(line).map(|_| CartView::from(&*cart))
        })
        .ok_or_else(session_ended)??;

    Ok((StatusCode::CREATED, Json(view)))
}

/// `DELETE /api/cart/items/{index}`
pub async fn remove_item(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Path(index): Path<usize>,
) -> ApiResult<Json<CartView>> {
    let view = state
        .sessions
        .with_cart_mut(&user.session_id, |cart| {
            cart.remove(index).map(|_| CartView::from(&*cart))
        })
        .ok_or_else(session_ended)??;

    Ok(Json(view))
}

/// `DELETE /api/cart`
pub async fn clear_cart(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
) -> ApiResult<Json<CartView>> {
    state
        .sessions
        .with_cart_mut(&user.session_id, |cart| {
            cart.clear();
            Json(CartView::from(&*cart))
        })
        .ok_or_else(session_ended)
}

/// `POST /api/cart/checkout`
///
/// The cart is taken out of the session under its lock, so a second
/// checkout racing this one sees an empty cart. If the order cannot be
/// written the lines go back into the session.
pub async fn checkout(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
) -> ApiResult<Json<CheckoutReceipt>> {
    let cart: Cart = state
        .sessions
        .with_cart_mut(&user.session_id, std::mem::take)
        .ok_or_else(session_ended)?;

    if cart.is_empty() {
        return Err(CoreError::CartEmpty.into());
    }

    match state.db.orders().checkout(&user.username, &cart).await {
        Ok(receipt) => Ok(Json(receipt)),
        Err(e) => {
            warn!(error = %e, "Checkout failed, restoring cart");
            state
                .sessions
                .with_cart_mut(&user.session_id, |current| current.restore(cart));
            Err(e.into())
        }
    }
}
