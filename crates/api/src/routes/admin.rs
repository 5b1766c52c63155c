//! Admin read endpoints: running totals and the order log.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::routes::store::{AppState, OrderDetails, dollars};

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_purchase_amount: f64,
    pub items_purchased_count: u64,
    pub total_discount_amount: f64,
    pub discount_codes_list: Vec<String>,
}

/// GET /admin/stats — running totals across all committed orders.
#[tracing::instrument(skip(state))]
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let snapshot = state.engine.stats().await;

    Json(StatsResponse {
        total_purchase_amount: dollars(snapshot.total_revenue),
        items_purchased_count: snapshot.items_sold,
        total_discount_amount: dollars(snapshot.total_discount),
        discount_codes_list: snapshot.issued_codes,
    })
}

/// GET /admin/orders — every committed order, in commit order.
#[tracing::instrument(skip(state))]
pub async fn orders(State(state): State<Arc<AppState>>) -> Json<Vec<OrderDetails>> {
    let orders = state.engine.orders().await;

    Json(orders.iter().map(OrderDetails::from_order).collect())
}
