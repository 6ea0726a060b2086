//! JSON cart endpoints.
//!
//! | Method   | Path               | Body                                   |
//! |----------|--------------------|----------------------------------------|
//! | `GET`    | `/api/cart`        |                                        |
//! | `DELETE` | `/api/cart`        |                                        |
//! | `POST`   | `/api/cart/add`    | `{ merchandiseId, quantity?, attributes? }` |
//! | `POST`   | `/api/cart/update` | `{ lineId, quantity }`                 |
//! | `POST`   | `/api/cart/remove` | `{ lineIds }`                          |
//!
//! Successful responses are `{"cart": ...}`; failures are `{"error": "..."}`.

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::CartCookieConfig,
    error::CartError,
    layer::CartSessionLayer,
    session::{CartSession, CartSessions},
    storefront::{Cart, CartLineInput, CartLineUpdateInput, model::Attribute},
};

/// Router serving the cart endpoints, with the cart session layer already applied.
pub fn cart_router(sessions: CartSessions, config: CartCookieConfig) -> Router {
    Router::new()
        .route("/api/cart", get(show_cart).delete(clear_cart))
        .route("/api/cart/add", post(add_to_cart))
        .route("/api/cart/update", post(update_cart))
        .route("/api/cart/remove", post(remove_from_cart))
        .layer(CartSessionLayer::new(sessions).with_config(config))
}

#[derive(Debug, Serialize)]
struct CartResponse {
    cart: Option<Cart>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self { cart: Some(cart) }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddRequest {
    #[serde(default)]
    merchandise_id: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
    #[serde(default)]
    attributes: Vec<Attribute>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest {
    #[serde(default)]
    line_id: String,
    quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveRequest {
    line_ids: Option<Vec<String>>,
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(err = %self, "cart request failed");
        } else {
            tracing::debug!(err = %self, "cart request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, CartError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| CartError::Validation(rejection.body_text()))
}

async fn show_cart(session: CartSession) -> Result<Json<CartResponse>, CartError> {
    let cart = session.cart().await?;
    Ok(Json(CartResponse { cart }))
}

async fn clear_cart(session: CartSession) -> StatusCode {
    session.clear();
    StatusCode::NO_CONTENT
}

async fn add_to_cart(
    session: CartSession,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, CartError> {
    let req = body(payload)?;
    if req.merchandise_id.trim().is_empty() {
        return Err(CartError::Validation("merchandiseId is required".into()));
    }

    let line = CartLineInput {
        merchandise_id: req.merchandise_id,
        quantity: req.quantity,
        attributes: req.attributes,
    };
    let cart = session.add_lines(vec![line]).await?;

    Ok(Json(cart.into()))
}

async fn update_cart(
    session: CartSession,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, CartError> {
    let req = body(payload)?;
    let Some(quantity) = req.quantity.filter(|_| !req.line_id.trim().is_empty()) else {
        return Err(CartError::Validation(
            "lineId and quantity are required".into(),
        ));
    };

    let cart = session
        .update_lines(vec![CartLineUpdateInput::new(req.line_id, quantity)])
        .await?;

    Ok(Json(cart.into()))
}

async fn remove_from_cart(
    session: CartSession,
    payload: Result<Json<RemoveRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, CartError> {
    let req = body(payload)?;
    let Some(line_ids) = req.line_ids else {
        return Err(CartError::Validation("lineIds array is required".into()));
    };

    let cart = session.remove_lines(line_ids).await?;

    Ok(Json(cart.into()))
}
