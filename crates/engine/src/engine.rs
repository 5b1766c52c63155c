//! The store engine facade.
//!
//! One `StoreEngine` instance owns every piece of mutable store state behind
//! a single lock; the public methods here are the only mutation path.

use chrono::Utc;
use tokio::sync::Mutex;

use crate::cart::{Cart, CartView};
use crate::catalog::{Product, ProductCatalog};
use crate::error::{CartError, CheckoutError};
use crate::ledger::{DISCOUNT_PERCENT, DiscountCode, DiscountLedger};
use crate::money::Money;
use crate::orders::{LineItem, Order, OrderLog};
use crate::stats::{StatsAggregator, StatsSnapshot};
use common::ProductId;
use notify::{NotificationHub, StoreEvent};

/// Number of commits between discount-code mints unless configured otherwise.
pub const DEFAULT_MINT_INTERVAL: u64 = 3;

/// Result of an add-to-cart mutation.
#[derive(Debug, Clone)]
pub struct CartUpdate {
    /// The catalog product that was added.
    pub product: Product,

    /// Quantity added by this call.
    pub quantity: u32,

    /// Snapshot of the cart after the merge.
    pub cart: CartView,
}

/// Everything the engine guards with its lock.
///
/// The combination matters: checkout must observe and mutate cart, ledger,
/// log, and stats as one unit, so they share a single critical section.
struct EngineState {
    cart: Cart,
    ledger: DiscountLedger,
    orders: OrderLog,
    stats: StatsAggregator,
}

/// The order & discount engine.
///
/// Shared across request handlers as `Arc<StoreEngine>`. Every operation
/// takes the state lock; [`checkout`](StoreEngine::checkout) holds it for
/// the whole validate-reserve-commit-mint sequence with no interior await,
/// which is what makes redemption atomic, order ids gap-free, and minting
/// single-fire.
pub struct StoreEngine {
    catalog: ProductCatalog,
    state: Mutex<EngineState>,
    hub: NotificationHub,
    mint_interval: u64,
}

impl StoreEngine {
    /// Creates an engine over the given catalog with the default mint
    /// interval.
    pub fn new(catalog: ProductCatalog, hub: NotificationHub) -> Self {
        Self::with_mint_interval(catalog, hub, DEFAULT_MINT_INTERVAL)
    }

    /// Creates an engine that mints a new code every `mint_interval`-th
    /// commit. An interval of 0 is treated as 1.
    pub fn with_mint_interval(
        catalog: ProductCatalog,
        hub: NotificationHub,
        mint_interval: u64,
    ) -> Self {
        Self {
            catalog,
            state: Mutex::new(EngineState {
                cart: Cart::new(),
                ledger: DiscountLedger::new(),
                orders: OrderLog::new(),
                stats: StatsAggregator::new(),
            }),
            hub,
            mint_interval: mint_interval.max(1),
        }
    }

    /// The notification hub this engine broadcasts through.
    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    /// Catalog products in id order.
    pub fn products(&self) -> Vec<Product> {
        self.catalog.iter().cloned().collect()
    }

    /// Adds a quantity of a product to the shared cart.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartUpdate, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let product = self
            .catalog
            .get(&product_id)
            .cloned()
            .ok_or_else(|| CartError::UnknownProduct(product_id.clone()))?;

        let mut state = self.state.lock().await;
        state.cart.add(product_id, quantity)?;
        let cart = state.cart.snapshot();
        drop(state);

        metrics::counter!("cart_adds_total").increment(1);
        tracing::debug!(product = %product.id, quantity, "added to cart");
        Ok(CartUpdate {
            product,
            quantity,
            cart,
        })
    }

    /// Snapshot of the current cart contents.
    pub async fn cart(&self) -> CartView {
        self.state.lock().await.cart.snapshot()
    }

    /// Runs the checkout state machine: Received → Validated → Committed,
    /// or Rejected with no state change.
    ///
    /// An absent or empty `discount_code` means no code. The entire
    /// sequence executes under one lock hold, so concurrent checkouts
    /// serialize: a code is redeemed by at most one of them, ids come out
    /// gap-free, and the mint milestone fires exactly once.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self, discount_code: Option<String>) -> Result<Order, CheckoutError> {
        metrics::counter!("checkout_requests_total").increment(1);
        let started = std::time::Instant::now();

        let mut state = self.state.lock().await;
        let result = self.checkout_locked(&mut state, discount_code);
        drop(state);

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        match &result {
            Ok(order) => {
                metrics::counter!("orders_committed_total").increment(1);
                tracing::info!(
                    order = %order.id,
                    subtotal = %order.subtotal,
                    total = %order.total,
                    discount = order.discount_applied(),
                    "checkout committed"
                );
            }
            Err(error) => {
                metrics::counter!("checkouts_rejected_total").increment(1);
                tracing::debug!(%error, "checkout rejected");
            }
        }
        result
    }

    fn checkout_locked(
        &self,
        state: &mut EngineState,
        discount_code: Option<String>,
    ) -> Result<Order, CheckoutError> {
        // 1. Validate against a snapshot; nothing mutates until commit.
        let cart = state.cart.snapshot();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut line_items = Vec::with_capacity(cart.len());
        let mut subtotal = Money::zero();
        for (product_id, quantity) in &cart {
            let product = self
                .catalog
                .get(product_id)
                .ok_or_else(|| CheckoutError::UnknownProduct(product_id.clone()))?;
            let line = LineItem::new(product_id.clone(), *quantity, product.price);
            subtotal += line.total_price();
            line_items.push(line);
        }

        // 2. Reserve the discount code, the last step that can fail.
        let supplied = discount_code.filter(|code| !code.is_empty());
        let reservation = match supplied {
            Some(code) => Some(state.ledger.validate_and_reserve(&code)?),
            None => None,
        };

        // 3. Totals per the reservation outcome.
        let (applied_code, discount_amount) = match &reservation {
            Some(reserved) => (
                Some(reserved.code().to_string()),
                subtotal.percent_of(DISCOUNT_PERCENT),
            ),
            None => (None, Money::zero()),
        };
        let total = subtotal - discount_amount;

        // 4. Commit. Infallible from here on: clear the cart, append the
        //    order, advance the counter, bind the reservation.
        let id = state.orders.next_id();
        let order = Order {
            id,
            line_items,
            subtotal,
            applied_code,
            discount_amount,
            total,
            sequence_index: id.value(),
            placed_at: Utc::now(),
        };
        state.cart.clear();
        state.orders.append(order.clone());
        if let Some(reservation) = reservation {
            state.ledger.bind(reservation, id);
            metrics::counter!("discount_codes_redeemed_total").increment(1);
        }

        // 5. Mint on the milestone and broadcast the new code.
        if state.orders.committed() % self.mint_interval == 0 {
            let code = state.ledger.mint(state.orders.committed());
            metrics::counter!("discount_codes_minted_total").increment(1);
            tracing::info!(%code, order = %id, "minted discount code");
            self.hub.broadcast(&StoreEvent::DiscountCodeMinted { code });
        }

        // 6. Fold the order into the running stats.
        state.stats.record(&order);

        Ok(order)
    }

    /// Current totals plus the full list of issued codes.
    pub async fn stats(&self) -> StatsSnapshot {
        let state = self.state.lock().await;
        state.stats.snapshot(state.ledger.codes())
    }

    /// All committed orders, in commit order.
    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.orders.all().to_vec()
    }

    /// Count of committed orders.
    pub async fn order_count(&self) -> u64 {
        self.state.lock().await.orders.committed()
    }

    /// Full ledger record for a code, if it exists.
    pub async fn discount_code(&self, code: &str) -> Option<DiscountCode> {
        self.state.lock().await.ledger.get(code).cloned()
    }
}

// TODO: per-session carts. Every client currently shares the one cart in
// `EngineState`; once the HTTP layer carries a session id, key carts by it.
