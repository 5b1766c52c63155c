use serde::{Deserialize, Serialize};

/// Typed event delivered to registered listeners.
///
/// Listeners receive the structured value and decide their own wire format;
/// the WebSocket layer, for example, forwards only the bare code string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A new discount code was minted by the order engine.
    DiscountCodeMinted { code: String },
}

impl StoreEvent {
    /// Short event name used in logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreEvent::DiscountCodeMinted { .. } => "discount_code_minted",
        }
    }
}
