//! Discount-code ledger.
//!
//! Owns every code ever minted and its redemption state. Reservation flips a
//! code to Redeemed under the engine lock, so two checkouts can never spend
//! the same code; the [`ReservedRedemption`] token is move-only and is bound
//! to the committing order's id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use common::OrderId;

/// Percentage off the subtotal carried by every minted code.
pub const DISCOUNT_PERCENT: u32 = 10;

/// Redemption state of a discount code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    /// Minted but not yet applied to an order.
    Unused,

    /// Spent; permanently unusable.
    Redeemed,
}

/// A single-use discount code.
///
/// Once `status` reaches [`CodeStatus::Redeemed`] the record never changes
/// again (apart from `redeemed_by` being filled in by the same commit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountCode {
    /// The unique code string, e.g. `SAVE10-4F2A`.
    pub code: String,

    /// Percentage off the order subtotal.
    pub percent: u32,

    /// Current redemption state.
    pub status: CodeStatus,

    /// Order counter value at the moment this code was minted.
    pub minted_at_order_index: u64,

    /// The order that spent this code, if any.
    pub redeemed_by: Option<OrderId>,
}

/// Errors raised when validating a supplied discount code.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// The code was never issued by this ledger.
    #[error("Invalid discount code: {0}")]
    InvalidCode(String),

    /// The code exists but has already been spent.
    #[error("Discount code already redeemed: {0}")]
    AlreadyRedeemed(String),
}

/// Proof that a code has been reserved for the checkout in progress.
///
/// Move-only. By the time a caller holds one, the code's status has already
/// flipped to Redeemed, so no concurrent checkout can claim it; the token is
/// consumed by [`DiscountLedger::bind`] when the order commits.
#[derive(Debug)]
pub struct ReservedRedemption {
    slot: usize,
    code: String,
}

impl ReservedRedemption {
    /// The reserved code string.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Insertion-ordered ledger of every discount code ever issued.
#[derive(Debug, Clone, Default)]
pub struct DiscountLedger {
    entries: Vec<DiscountCode>,
    by_code: HashMap<String, usize>,
}

impl DiscountLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a new unique code with status Unused and appends it.
    ///
    /// Codes have the shape `SAVE10-XXXX` (four uppercase hex characters
    /// drawn from a v4 UUID) and are collision-checked against every code
    /// ever issued.
    pub fn mint(&mut self, minted_at_order_index: u64) -> String {
        let code = loop {
            let candidate = generate_code();
            if !self.by_code.contains_key(&candidate) {
                break candidate;
            }
        };
        self.by_code.insert(code.clone(), self.entries.len());
        self.entries.push(DiscountCode {
            code: code.clone(),
            percent: DISCOUNT_PERCENT,
            status: CodeStatus::Unused,
            minted_at_order_index,
            redeemed_by: None,
        });
        code
    }

    /// Validates a supplied code and reserves it for redemption.
    ///
    /// Fails with [`DiscountError::InvalidCode`] if the code was never
    /// issued and [`DiscountError::AlreadyRedeemed`] if it has been spent.
    /// On success the status flips to Redeemed immediately; the caller binds
    /// the returned token to an order id at commit.
    pub fn validate_and_reserve(
        &mut self,
        code: &str,
    ) -> Result<ReservedRedemption, DiscountError> {
        let slot = *self
            .by_code
            .get(code)
            .ok_or_else(|| DiscountError::InvalidCode(code.to_string()))?;
        let entry = &mut self.entries[slot];
        match entry.status {
            CodeStatus::Redeemed => Err(DiscountError::AlreadyRedeemed(code.to_string())),
            CodeStatus::Unused => {
                entry.status = CodeStatus::Redeemed;
                Ok(ReservedRedemption {
                    slot,
                    code: code.to_string(),
                })
            }
        }
    }

    /// Records which order consumed a reservation.
    pub fn bind(&mut self, reservation: ReservedRedemption, order_id: OrderId) {
        self.entries[reservation.slot].redeemed_by = Some(order_id);
    }

    /// Every code string ever issued, in mint order.
    pub fn codes(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.code.clone()).collect()
    }

    /// Looks up the full record for a code.
    pub fn get(&self, code: &str) -> Option<&DiscountCode> {
        self.by_code.get(code).map(|&slot| &self.entries[slot])
    }

    /// Number of codes ever issued.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no code has ever been issued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn generate_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("SAVE10-{}", hex[..4].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mint_generates_unique_prefixed_codes() {
        let mut ledger = DiscountLedger::new();
        let codes: Vec<String> = (0..50).map(|i| ledger.mint(i)).collect();

        for code in &codes {
            assert!(code.starts_with("SAVE10-"), "unexpected format: {code}");
            assert_eq!(code.len(), "SAVE10-".len() + 4);
        }
        let unique: HashSet<&String> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
        assert_eq!(ledger.len(), 50);
    }

    #[test]
    fn reserve_flips_status_exactly_once() {
        let mut ledger = DiscountLedger::new();
        let code = ledger.mint(3);

        let reservation = ledger.validate_and_reserve(&code).unwrap();
        assert_eq!(reservation.code(), code);
        assert_eq!(ledger.get(&code).unwrap().status, CodeStatus::Redeemed);

        let second = ledger.validate_and_reserve(&code);
        assert!(matches!(second, Err(DiscountError::AlreadyRedeemed(_))));
    }

    #[test]
    fn reserve_unknown_code_fails() {
        let mut ledger = DiscountLedger::new();
        ledger.mint(3);

        let result = ledger.validate_and_reserve("BOGUS");
        assert!(matches!(result, Err(DiscountError::InvalidCode(_))));
    }

    #[test]
    fn bind_records_the_redeeming_order() {
        let mut ledger = DiscountLedger::new();
        let code = ledger.mint(3);

        let reservation = ledger.validate_and_reserve(&code).unwrap();
        ledger.bind(reservation, OrderId::new(4));

        let entry = ledger.get(&code).unwrap();
        assert_eq!(entry.redeemed_by, Some(OrderId::new(4)));
        assert_eq!(entry.minted_at_order_index, 3);
        assert_eq!(entry.percent, DISCOUNT_PERCENT);
    }

    #[test]
    fn codes_lists_in_mint_order() {
        let mut ledger = DiscountLedger::new();
        let first = ledger.mint(3);
        let second = ledger.mint(6);
        let third = ledger.mint(9);

        assert_eq!(ledger.codes(), vec![first, second, third]);
    }
}
