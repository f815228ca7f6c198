// ============================================================================
// Trade Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{OrderId, Quantity, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents a matched trade between two orders
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    /// Unique trade identifier
    pub id: Uuid,

    pub buy_order_id: OrderId,

    pub sell_order_id: OrderId,

    /// Order ID of the passive order (resting in book)
    pub maker_order_id: OrderId,

    /// Order ID of the aggressive order (incoming)
    pub taker_order_id: OrderId,

    /// Execution price, always the maker's limit
    pub price: Decimal,

    /// Executed quantity
    pub quantity: Quantity,

    /// Trade timestamp
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn new(
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        taker_side: Side,
        price: Decimal,
        quantity: Quantity,
    ) -> Self {
        let (buy_order_id, sell_order_id) = match taker_side {
            Side::Buy => (taker_order_id, maker_order_id),
            Side::Sell => (maker_order_id, taker_order_id),
        };

        Self {
            id: Uuid::new_v4(),
            buy_order_id,
            sell_order_id,
            maker_order_id,
            taker_order_id,
            price,
            quantity,
            timestamp: Utc::now(),
        }
    }

    /// The side that initiated the trade
    pub fn aggressor_side(&self) -> Side {
        if self.taker_order_id == self.buy_order_id {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    /// Notional value of the trade (price * quantity), `None` if it does not
    /// fit in a `Decimal`
    pub fn notional_value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}
