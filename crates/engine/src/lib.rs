//! The order & discount engine.
//!
//! Owns every piece of mutable storefront state — the shared cart, the
//! discount-code ledger, the append-only order log with its counter, and the
//! running stats — behind a single [`StoreEngine`] facade. Checkout runs as
//! one atomic transaction: code redemption, order commit, counter advance,
//! milestone minting, and stats update cannot interleave with any other
//! checkout.

pub mod cart;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod money;
pub mod orders;
pub mod stats;

pub use cart::{Cart, CartView};
pub use catalog::{Product, ProductCatalog};
pub use engine::{CartUpdate, DEFAULT_MINT_INTERVAL, StoreEngine};
pub use error::{CartError, CheckoutError};
pub use ledger::{
    CodeStatus, DISCOUNT_PERCENT, DiscountCode, DiscountError, DiscountLedger, ReservedRedemption,
};
pub use money::Money;
pub use orders::{LineItem, Order, OrderLog};
pub use stats::{StatsAggregator, StatsSnapshot};

pub use common::{OrderId, ProductId};
pub use notify::{NotificationHub, StoreEvent};
