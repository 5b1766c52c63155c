//! Storefront endpoints: catalog, cart, and checkout.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::ProductId;
use engine::{CartView, Money, Order, StoreEngine};
use notify::NotificationHub;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
///
/// `hub` is the same hub the engine broadcasts through; the WebSocket
/// route subscribes to it directly.
pub struct AppState {
    pub engine: Arc<StoreEngine>,
    pub hub: NotificationHub,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CartAddRequest {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    /// Absent, `null`, and `""` all mean "no code".
    #[serde(default)]
    pub discount_code: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductEntry {
    pub name: String,
    pub price: f64,
}

#[derive(Serialize)]
pub struct CartAddResponse {
    pub message: String,
    pub cart: CartView,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub order_details: OrderDetails,
}

/// Wire shape of a committed order: dollars as `f64`, RFC 3339 timestamp.
#[derive(Serialize)]
pub struct OrderDetails {
    pub order_id: u64,
    pub items: Vec<OrderItemView>,
    pub subtotal: f64,
    pub discount_applied: bool,
    pub applied_code: Option<String>,
    pub discount_amount: f64,
    pub total: f64,
    pub placed_at: String,
}

#[derive(Serialize)]
pub struct OrderItemView {
    pub item_id: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderDetails {
    /// Projects a committed order into its wire shape.
    pub fn from_order(order: &Order) -> Self {
        let items = order
            .line_items
            .iter()
            .map(|line| OrderItemView {
                item_id: line.product_id.to_string(),
                quantity: line.quantity,
                unit_price: dollars(line.unit_price),
            })
            .collect();

        Self {
            order_id: order.id.value(),
            items,
            subtotal: dollars(order.subtotal),
            discount_applied: order.discount_applied(),
            applied_code: order.applied_code.clone(),
            discount_amount: dollars(order.discount_amount),
            total: dollars(order.total),
            placed_at: order.placed_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// GET /products — the catalog keyed by product id.
#[tracing::instrument(skip(state))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, ProductEntry>> {
    let products = state
        .engine
        .products()
        .into_iter()
        .map(|product| {
            (
                product.id.to_string(),
                ProductEntry {
                    name: product.name,
                    price: dollars(product.price),
                },
            )
        })
        .collect();

    Json(products)
}

/// GET /cart — current cart contents keyed by product id.
#[tracing::instrument(skip(state))]
pub async fn get_cart(State(state): State<Arc<AppState>>) -> Json<CartView> {
    Json(state.engine.cart().await)
}

/// POST /cart/add — merge a quantity of one product into the shared cart.
#[tracing::instrument(skip(state, req))]
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CartAddRequest>,
) -> Result<Json<CartAddResponse>, ApiError> {
    let update = state
        .engine
        .add_to_cart(ProductId::new(req.item_id), req.quantity)
        .await?;

    Ok(Json(CartAddResponse {
        message: format!(
            "Added {} of {} to cart.",
            update.quantity, update.product.name
        ),
        cart: update.cart,
    }))
}

/// POST /checkout — run the atomic checkout and return the committed order.
#[tracing::instrument(skip(state, req))]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let order = state.engine.checkout(req.discount_code).await?;

    Ok(Json(CheckoutResponse {
        message: "Checkout successful!",
        order_details: OrderDetails::from_order(&order),
    }))
}

/// Cents to dollars, only ever at the JSON boundary.
pub(crate) fn dollars(money: Money) -> f64 {
    money.cents() as f64 / 100.0
}
