// ============================================================================
// Order Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

use super::participant::ParticipantId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Order quantities are whole units
pub type Quantity = u64;

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

// ============================================================================
// Order Status Machine
// ============================================================================

pub mod status {
    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum OrderStatus {
        Accepted,
        PartiallyFilled,
        Filled,
        Cancelled,
    }

    impl OrderStatus {
        pub fn is_terminal(&self) -> bool {
            matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
        }

        pub fn can_be_cancelled(&self) -> bool {
            matches!(self, OrderStatus::Accepted | OrderStatus::PartiallyFilled)
        }
    }

    #[derive(Debug, Clone, Copy)]
    pub enum OrderStatusTransition {
        PartialFill,
        Fill,
        Cancel,
    }

    impl OrderStatus {
        pub fn transition(&self, transition: OrderStatusTransition) -> Result<OrderStatus, String> {
            match (self, transition) {
                (OrderStatus::Accepted, OrderStatusTransition::PartialFill)
                | (OrderStatus::PartiallyFilled, OrderStatusTransition::PartialFill) => {
                    Ok(OrderStatus::PartiallyFilled)
                },
                (OrderStatus::Accepted, OrderStatusTransition::Fill)
                | (OrderStatus::PartiallyFilled, OrderStatusTransition::Fill) => {
                    Ok(OrderStatus::Filled)
                },
                (OrderStatus::Accepted, OrderStatusTransition::Cancel)
                | (OrderStatus::PartiallyFilled, OrderStatusTransition::Cancel) => {
                    Ok(OrderStatus::Cancelled)
                },
                _ => Err(format!(
                    "Invalid transition from {:?} via {:?}",
                    self, transition
                )),
            }
        }
    }
}

use status::{OrderStatus, OrderStatusTransition};

// ============================================================================
// Order Entity
// ============================================================================

/// A limit order. Identity, owner, side and limit are fixed; the remaining
/// quantity only ever decreases.
///
/// Orders are mutated exclusively by the matching engine while it holds the
/// book's write lock, so plain fields are enough here.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub owner: ParticipantId,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Quantity,
    pub timestamp: DateTime<Utc>,

    remaining_quantity: Quantity,
    status: OrderStatus,
    sequence_number: u64,
}

impl Order {
    pub fn new(owner: ParticipantId, side: Side, price: Decimal, quantity: Quantity) -> Self {
        Self {
            id: OrderId::new(),
            owner,
            side,
            price,
            quantity,
            timestamp: Utc::now(),
            remaining_quantity: quantity,
            status: OrderStatus::Accepted,
            sequence_number: 0,
        }
    }

    /// Rebuild an order under an existing id with a fresh arrival time.
    /// Used by modify: same identity, no queue priority carried over.
    pub(crate) fn replacement(
        id: OrderId,
        owner: ParticipantId,
        side: Side,
        price: Decimal,
        quantity: Quantity,
    ) -> Self {
        Self {
            id,
            ..Self::new(owner, side, price, quantity)
        }
    }

    pub fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    pub(crate) fn set_sequence_number(&mut self, seq: u64) {
        self.sequence_number = seq;
    }

    /// Fill part of this order.
    /// Returns false (and changes nothing) if the quantity exceeds what remains.
    pub(crate) fn fill(&mut self, quantity: Quantity) -> bool {
        if quantity == 0 || quantity > self.remaining_quantity {
            return false;
        }

        let transition = if quantity == self.remaining_quantity {
            OrderStatusTransition::Fill
        } else {
            OrderStatusTransition::PartialFill
        };

        match self.status.transition(transition) {
            Ok(next) => {
                self.remaining_quantity -= quantity;
                self.status = next;
                true
            },
            Err(_) => false,
        }
    }

    /// Mark the order cancelled. Returns false if it already reached a terminal status.
    pub(crate) fn cancel(&mut self) -> bool {
        match self.status.transition(OrderStatusTransition::Cancel) {
            Ok(next) => {
                self.status = next;
                true
            },
            Err(_) => false,
        }
    }

    /// Whether this order's limit crosses a resting price on the opposite side
    pub fn crosses(&self, resting_price: Decimal) -> bool {
        match self.side {
            Side::Buy => self.price >= resting_price,
            Side::Sell => self.price <= resting_price,
        }
    }
}
