//! Running store statistics.

use serde::Serialize;

use crate::money::Money;
use crate::orders::Order;

/// Incrementally maintained totals over all committed orders.
///
/// [`record`](StatsAggregator::record) is called exactly once per commit by
/// the engine; the aggregator itself does no deduplication.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    total_revenue: Money,
    items_sold: u64,
    total_discount: Money,
}

impl StatsAggregator {
    /// Creates a zeroed aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one committed order into the totals.
    pub fn record(&mut self, order: &Order) {
        self.total_revenue += order.total;
        self.items_sold += order.item_count();
        self.total_discount += order.discount_amount;
    }

    /// Returns the current totals together with the supplied code list.
    pub fn snapshot(&self, issued_codes: Vec<String>) -> StatsSnapshot {
        StatsSnapshot {
            total_revenue: self.total_revenue,
            items_sold: self.items_sold,
            total_discount: self.total_discount,
            issued_codes,
        }
    }
}

/// Point-in-time view of the store totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Sum of `total` over all committed orders.
    pub total_revenue: Money,

    /// Sum of quantities over all committed orders.
    pub items_sold: u64,

    /// Sum of `discount_amount` over all committed orders.
    pub total_discount: Money,

    /// Every discount code ever issued, in mint order.
    pub issued_codes: Vec<String>,
}
