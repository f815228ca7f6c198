// ============================================================================
// Event Handler Interface
// Defines the contract for handling order, trade and lifecycle events
// ============================================================================

use crate::domain::{OrderId, ParticipantId, Quantity, Side, StateChange, Trade};
use chrono::{DateTime, Utc};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the matching engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Order validated and sequenced
    OrderAccepted {
        order_id: OrderId,
        owner: ParticipantId,
        side: Side,
        price: Decimal,
        quantity: Quantity,
        sequence_number: u64,
        timestamp: DateTime<Utc>,
    },

    /// Order matched, trade generated
    OrderMatched {
        trade: Trade,
        timestamp: DateTime<Utc>,
    },

    /// Order partially filled (taker or maker)
    OrderPartiallyFilled {
        order_id: OrderId,
        filled_quantity: Quantity,
        remaining_quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Order fully filled (taker or maker)
    OrderFilled {
        order_id: OrderId,
        total_filled: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Unfilled remainder rested on the book
    OrderAddedToBook {
        order_id: OrderId,
        price: Decimal,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Order cancelled
    OrderCancelled {
        order_id: OrderId,
        remaining_quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Order replaced; it re-enters the book at the back of the queue
    OrderModified {
        order_id: OrderId,
        old_price: Decimal,
        old_quantity: Quantity,
        new_price: Decimal,
        new_quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Contract moved to its next lifecycle state
    ContractStateChanged { change: StateChange },
}

impl OrderEvent {
    /// The order this event is about, if any
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            OrderEvent::OrderAccepted { order_id, .. }
            | OrderEvent::OrderPartiallyFilled { order_id, .. }
            | OrderEvent::OrderFilled { order_id, .. }
            | OrderEvent::OrderAddedToBook { order_id, .. }
            | OrderEvent::OrderCancelled { order_id, .. }
            | OrderEvent::OrderModified { order_id, .. } => Some(*order_id),
            OrderEvent::OrderMatched { trade, .. } => Some(trade.taker_order_id),
            OrderEvent::ContractStateChanged { .. } => None,
        }
    }

    pub fn trade(&self) -> Option<&Trade> {
        match self {
            OrderEvent::OrderMatched { trade, .. } => Some(trade),
            _ => None,
        }
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Event handler trait for processing matching engine events
///
/// Handlers run while the engine holds its write lock, so they see events in
/// book sequence order. They must not call back into the same engine.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        tracing::debug!("Order book event: {:?}", event);
    }
}

/// Forwards events over a crossbeam channel to a settlement or reporting
/// consumer running on another thread.
pub struct ChannelEventHandler {
    sender: Sender<OrderEvent>,
}

impl ChannelEventHandler {
    /// Unbounded channel; the consumer can never stall the book
    pub fn unbounded() -> (Self, Receiver<OrderEvent>) {
        let (sender, receiver) = channel::unbounded();
        (Self { sender }, receiver)
    }

    /// Bounded channel. Events that do not fit are dropped with a warning
    /// instead of blocking the book.
    pub fn bounded(capacity: usize) -> (Self, Receiver<OrderEvent>) {
        let (sender, receiver) = channel::bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl EventHandler for ChannelEventHandler {
    fn on_event(&self, event: OrderEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {},
            Err(TrySendError::Full(event)) => {
                tracing::warn!(order_id = ?event.order_id(), "event channel full, dropping event");
            },
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!("event channel receiver dropped");
            },
        }
    }
}
