//! Engine error types.

use thiserror::Error;

use crate::ledger::DiscountError;
use common::ProductId;

/// Errors raised by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product id is not in the catalog.
    #[error("Item not found: {0}")]
    UnknownProduct(ProductId),

    /// Quantities must be at least 1.
    #[error("Quantity must be positive")]
    InvalidQuantity,

    /// Merging would push the entry past `u32::MAX`.
    #[error("Quantity exceeds cart capacity")]
    QuantityOverflow,
}

/// Errors raised by the checkout state machine.
///
/// Every variant is a pure validation failure: when checkout returns one of
/// these, no shared state has changed and the caller may retry.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart entry references a product the catalog does not know.
    #[error("Unknown product in cart: {0}")]
    UnknownProduct(ProductId),

    /// The supplied discount code was rejected by the ledger.
    #[error("Discount error: {0}")]
    Discount(#[from] DiscountError),
}
