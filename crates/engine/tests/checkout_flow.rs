//! Integration tests for the checkout state machine.
//!
//! Covers the full commit path (totals, counter, milestone minting,
//! broadcast), redemption semantics, and the engine's behavior under
//! concurrent checkouts.

use std::sync::Arc;

use engine::{
    CheckoutError, CodeStatus, DiscountError, Money, NotificationHub, Order, Product,
    ProductCatalog, ProductId, StoreEngine,
};

use common::OrderId;

fn demo_engine() -> StoreEngine {
    StoreEngine::new(ProductCatalog::demo(), NotificationHub::new())
}

/// Catalog with a single 9.99 widget.
fn widget_engine() -> StoreEngine {
    let mut catalog = ProductCatalog::new();
    catalog.insert(Product::new("widget", "Widget", Money::from_cents(999)));
    StoreEngine::new(catalog, NotificationHub::new())
}

async fn commit_one(engine: &StoreEngine, product: &str, quantity: u32) -> Order {
    engine
        .add_to_cart(ProductId::from(product), quantity)
        .await
        .unwrap();
    engine.checkout(None).await.unwrap()
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn first_commit_has_plain_totals_and_no_mint() {
        let engine = widget_engine();
        let (_conn, mut events) = engine.hub().subscribe();

        engine
            .add_to_cart(ProductId::from("widget"), 2)
            .await
            .unwrap();
        let cart = engine.cart().await;
        assert_eq!(cart.get(&ProductId::from("widget")), Some(&2));

        let order = engine.checkout(None).await.unwrap();
        assert_eq!(order.id, OrderId::new(1));
        assert_eq!(order.subtotal, Money::from_cents(1998));
        assert_eq!(order.discount_amount, Money::zero());
        assert_eq!(order.total, Money::from_cents(1998));
        assert_eq!(engine.order_count().await, 1);

        // No milestone yet: nothing minted, nothing broadcast.
        assert!(engine.stats().await.issued_codes.is_empty());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn third_commit_mints_and_broadcasts_to_all_connections() {
        let engine = widget_engine();
        let (_a, mut events_a) = engine.hub().subscribe();
        let (_b, mut events_b) = engine.hub().subscribe();

        for _ in 0..3 {
            commit_one(&engine, "widget", 2).await;
        }

        let stats = engine.stats().await;
        assert_eq!(stats.issued_codes.len(), 1);
        let code = stats.issued_codes[0].clone();

        for events in [&mut events_a, &mut events_b] {
            match events.try_recv().unwrap() {
                notify::StoreEvent::DiscountCodeMinted { code: minted } => {
                    assert_eq!(minted, code);
                }
            }
            assert!(events.try_recv().is_err(), "exactly one mint expected");
        }

        let record = engine.discount_code(&code).await.unwrap();
        assert_eq!(record.status, CodeStatus::Unused);
        assert_eq!(record.minted_at_order_index, 3);
    }

    #[tokio::test]
    async fn minting_follows_the_interval_exactly() {
        let engine = demo_engine();
        for committed in 1..=7u64 {
            commit_one(&engine, "item_001", 1).await;
            let minted = engine.stats().await.issued_codes.len() as u64;
            assert_eq!(minted, committed / 3, "after {committed} commits");
        }

        let codes = engine.stats().await.issued_codes;
        let first = engine.discount_code(&codes[0]).await.unwrap();
        let second = engine.discount_code(&codes[1]).await.unwrap();
        assert_eq!(first.minted_at_order_index, 3);
        assert_eq!(second.minted_at_order_index, 6);
    }

    #[tokio::test]
    async fn sequential_mints_broadcast_in_commit_order() {
        let engine = demo_engine();
        let (_conn, mut events) = engine.hub().subscribe();

        for _ in 0..6 {
            commit_one(&engine, "item_002", 1).await;
        }

        let codes = engine.stats().await.issued_codes;
        assert_eq!(codes.len(), 2);
        for expected in &codes {
            match events.recv().await.unwrap() {
                notify::StoreEvent::DiscountCodeMinted { code } => assert_eq!(&code, expected),
            }
        }
    }

    #[tokio::test]
    async fn redeeming_a_minted_code_takes_ten_percent_off() {
        let engine = demo_engine();
        for _ in 0..3 {
            // Singularity Snapback, $24.99 each.
            commit_one(&engine, "item_003", 1).await;
        }
        let code = engine.stats().await.issued_codes[0].clone();

        engine
            .add_to_cart(ProductId::from("item_003"), 1)
            .await
            .unwrap();
        let order = engine.checkout(Some(code.clone())).await.unwrap();

        assert_eq!(order.id, OrderId::new(4));
        assert_eq!(order.subtotal, Money::from_cents(2499));
        assert_eq!(order.discount_amount, Money::from_cents(250));
        assert_eq!(order.total, Money::from_cents(2249));
        assert_eq!(order.applied_code.as_deref(), Some(code.as_str()));

        let record = engine.discount_code(&code).await.unwrap();
        assert_eq!(record.status, CodeStatus::Redeemed);
        assert_eq!(record.redeemed_by, Some(OrderId::new(4)));

        let stats = engine.stats().await;
        assert_eq!(stats.total_discount, Money::from_cents(250));
        assert_eq!(stats.total_revenue, Money::from_cents(3 * 2499 + 2249));
        assert_eq!(stats.items_sold, 4);
        // The spent code stays listed.
        assert!(stats.issued_codes.contains(&code));
    }

    #[tokio::test]
    async fn second_redemption_attempt_is_rejected() {
        let engine = demo_engine();
        for _ in 0..3 {
            commit_one(&engine, "item_001", 1).await;
        }
        let code = engine.stats().await.issued_codes[0].clone();

        engine
            .add_to_cart(ProductId::from("item_001"), 1)
            .await
            .unwrap();
        engine.checkout(Some(code.clone())).await.unwrap();

        engine
            .add_to_cart(ProductId::from("item_002"), 1)
            .await
            .unwrap();
        let result = engine.checkout(Some(code)).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Discount(DiscountError::AlreadyRedeemed(_)))
        ));

        // Rejection left the cart for a retry without the code.
        let retry = engine.checkout(None).await.unwrap();
        assert_eq!(retry.subtotal, Money::from_cents(1549));
        assert!(retry.applied_code.is_none());
    }
}

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_checkouts_redeem_a_code_exactly_once() {
        let engine = Arc::new(demo_engine());
        for _ in 0..3 {
            commit_one(&engine, "item_001", 1).await;
        }
        let code = engine.stats().await.issued_codes[0].clone();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            let code = code.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .add_to_cart(ProductId::from("item_002"), 1)
                    .await
                    .unwrap();
                engine.checkout(Some(code)).await
            }));
        }

        let mut discounted = 0;
        let mut already_redeemed = 0;
        let mut empty_cart = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(order) => {
                    assert!(order.discount_applied());
                    discounted += 1;
                }
                Err(CheckoutError::Discount(DiscountError::AlreadyRedeemed(_))) => {
                    already_redeemed += 1;
                }
                Err(CheckoutError::EmptyCart) => empty_cart += 1,
                Err(other) => panic!("unexpected checkout failure: {other}"),
            }
        }

        assert_eq!(discounted, 1, "the code must be spent exactly once");
        assert_eq!(discounted + already_redeemed + empty_cart, 8);

        // Ids stay gap-free: 3 from the warm-up plus the single discounted
        // commit.
        let orders = engine.orders().await;
        let ids: Vec<u64> = orders.iter().map(|o| o.id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_commits_issue_gap_free_ids() {
        let engine = Arc::new(demo_engine());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                engine
                    .add_to_cart(ProductId::from("item_001"), 1)
                    .await
                    .unwrap();
                engine.checkout(None).await
            }));
        }

        let mut committed_ids = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(order) => committed_ids.push(order.id.value()),
                // A checkout that ran right after another consumed the
                // shared cart sees it empty; that is the only legal failure.
                Err(CheckoutError::EmptyCart) => {}
                Err(other) => panic!("unexpected checkout failure: {other}"),
            }
        }

        committed_ids.sort_unstable();
        let successes = committed_ids.len() as u64;
        assert!(successes >= 1);
        assert_eq!(committed_ids, (1..=successes).collect::<Vec<_>>());
        assert_eq!(engine.order_count().await, successes);

        let stats = engine.stats().await;
        // Every added item was either sold or is still in the cart.
        let cart = engine.cart().await;
        let leftover = cart.values().map(|&q| q as u64).sum::<u64>();
        assert_eq!(stats.items_sold + leftover, 16);
        // Minting fired on every third commit and nowhere else.
        assert_eq!(stats.issued_codes.len() as u64, successes / 3);
    }
}
