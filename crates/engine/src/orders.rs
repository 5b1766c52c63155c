//! Committed orders and the append-only order log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use common::{OrderId, ProductId};

/// One line of a committed order, with the unit price snapshotted at
/// checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit in cents at the moment of checkout.
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity × unit price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An immutable committed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Strictly increasing id, starting at 1.
    pub id: OrderId,

    /// Ordered line items.
    pub line_items: Vec<LineItem>,

    /// Sum of line totals before any discount.
    pub subtotal: Money,

    /// The discount code applied to this order, if any.
    pub applied_code: Option<String>,

    /// Amount taken off the subtotal (zero when no code was applied).
    pub discount_amount: Money,

    /// Amount charged: subtotal minus discount.
    pub total: Money,

    /// Position in the order log; equals the order counter at commit.
    pub sequence_index: u64,

    /// Commit timestamp.
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Total quantity across all line items.
    pub fn item_count(&self) -> u64 {
        self.line_items.iter().map(|l| l.quantity as u64).sum()
    }

    /// Returns true if a discount code was applied.
    pub fn discount_applied(&self) -> bool {
        self.applied_code.is_some()
    }
}

/// Append-only log of committed orders.
///
/// The order counter is the log length; ids are handed out as `len + 1`
/// under the engine lock, which makes them gap-free and duplicate-free.
#[derive(Debug, Clone, Default)]
pub struct OrderLog {
    orders: Vec<Order>,
}

impl OrderLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next committed order will receive.
    pub fn next_id(&self) -> OrderId {
        OrderId::new(self.orders.len() as u64 + 1)
    }

    /// Count of committed orders (the order counter).
    pub fn committed(&self) -> u64 {
        self.orders.len() as u64
    }

    /// Appends a committed order.
    pub fn append(&mut self, order: Order) {
        debug_assert_eq!(order.id, self.next_id());
        self.orders.push(order);
    }

    /// All committed orders, in commit order.
    pub fn all(&self) -> &[Order] {
        &self.orders
    }

    /// The most recently committed order.
    pub fn last(&self) -> Option<&Order> {
        self.orders.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u64, total_cents: i64) -> Order {
        Order {
            id: OrderId::new(id),
            line_items: vec![LineItem::new("item_001", 1, Money::from_cents(total_cents))],
            subtotal: Money::from_cents(total_cents),
            applied_code: None,
            discount_amount: Money::zero(),
            total: Money::from_cents(total_cents),
            sequence_index: id,
            placed_at: Utc::now(),
        }
    }

    #[test]
    fn line_item_total_price() {
        let line = LineItem::new("item_001", 3, Money::from_cents(1999));
        assert_eq!(line.total_price(), Money::from_cents(5997));
    }

    #[test]
    fn ids_advance_with_appends() {
        let mut log = OrderLog::new();
        assert_eq!(log.next_id(), OrderId::new(1));
        assert_eq!(log.committed(), 0);

        log.append(order(1, 1999));
        assert_eq!(log.next_id(), OrderId::new(2));
        assert_eq!(log.committed(), 1);

        log.append(order(2, 2499));
        assert_eq!(log.committed(), 2);
        assert_eq!(log.last().unwrap().id, OrderId::new(2));
    }

    #[test]
    fn all_preserves_commit_order() {
        let mut log = OrderLog::new();
        log.append(order(1, 100));
        log.append(order(2, 200));
        log.append(order(3, 300));

        let ids: Vec<u64> = log.all().iter().map(|o| o.id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn order_item_count_sums_quantities() {
        let mut o = order(1, 100);
        o.line_items = vec![
            LineItem::new("item_001", 2, Money::from_cents(1999)),
            LineItem::new("item_002", 3, Money::from_cents(1549)),
        ];
        assert_eq!(o.item_count(), 5);
        assert!(!o.discount_applied());
    }
}
