//! The shared shopping cart.

use std::collections::BTreeMap;

use common::ProductId;

use crate::error::CartError;

/// Read-only snapshot of the cart contents (product id → quantity).
pub type CartView = BTreeMap<ProductId, u32>;

/// The single shared cart.
///
/// Positivity and catalog validation happen in the engine facade before any
/// mutation reaches the cart; the merge itself rejects a quantity that would
/// overflow its entry. Checkout operates on a [`snapshot`](Cart::snapshot)
/// and clears the live cart only inside the commit, so a rejected checkout
/// leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    entries: BTreeMap<ProductId, u32>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a quantity into the entry for the given product, creating the
    /// entry if absent. Returns the merged quantity, or fails if the merge
    /// would not fit the entry.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) -> Result<u32, CartError> {
        let current = self.entries.get(&product_id).copied().unwrap_or(0);
        let merged = current
            .checked_add(quantity)
            .ok_or(CartError::QuantityOverflow)?;
        self.entries.insert(product_id, merged);
        Ok(merged)
    }

    /// Returns a snapshot of the current contents.
    pub fn snapshot(&self) -> CartView {
        self.entries.clone()
    }

    /// Returns true if the cart holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
