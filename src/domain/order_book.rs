// ============================================================================
// Order Book Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::contract::ContractState;
use super::participant::ParticipantId;
use super::{Order, OrderId, Quantity, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Aggregated quantity across orders. Wide enough that summing any number of
/// `Quantity` values cannot overflow.
pub type DepthQuantity = u128;

// ============================================================================
// Order Book Level
// ============================================================================

/// Orders resting at one price, served in arrival order.
///
/// Keyed by sequence number, so the front of the queue is the smallest key
/// and removal from the middle is logarithmic.
#[derive(Debug, Clone)]
pub struct OrderBookLevel {
    pub price: Decimal,
    orders: BTreeMap<u64, Order>,
    total_quantity: DepthQuantity,
}

impl OrderBookLevel {
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: BTreeMap::new(),
            total_quantity: 0,
        }
    }

    /// Append to the back of the queue. The order's sequence number must be
    /// greater than any already queued.
    pub fn add_order(&mut self, order: Order) {
        self.total_quantity += DepthQuantity::from(order.remaining_quantity());
        self.orders.insert(order.sequence_number(), order);
    }

    pub fn front(&self) -> Option<&Order> {
        self.orders.values().next()
    }

    pub fn front_mut(&mut self) -> Option<&mut Order> {
        self.orders.values_mut().next()
    }

    pub fn pop_front(&mut self) -> Option<Order> {
        let (_, order) = self.orders.pop_first()?;
        self.total_quantity -= DepthQuantity::from(order.remaining_quantity());
        Some(order)
    }

    pub fn remove(&mut self, sequence_number: u64) -> Option<Order> {
        let order = self.orders.remove(&sequence_number)?;
        self.total_quantity -= DepthQuantity::from(order.remaining_quantity());
        Some(order)
    }

    pub fn get(&self, sequence_number: u64) -> Option<&Order> {
        self.orders.get(&sequence_number)
    }

    /// Keep the level total in step with a fill applied to one of its orders
    pub fn subtract_quantity(&mut self, quantity: Quantity) {
        self.total_quantity = self
            .total_quantity
            .saturating_sub(DepthQuantity::from(quantity));
    }

    pub fn total_quantity(&self) -> DepthQuantity {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders in FIFO order
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }
}

// ============================================================================
// Order Book Side
// ============================================================================

/// One side of the book (bids or asks), price levels sorted by price
#[derive(Debug, Clone)]
pub struct OrderBookSide {
    levels: BTreeMap<Decimal, OrderBookLevel>,
    pub side: Side,
}

impl OrderBookSide {
    pub fn new(side: Side) -> Self {
        Self {
            levels: BTreeMap::new(),
            side,
        }
    }

    pub fn add_order(&mut self, order: Order) {
        self.levels
            .entry(order.price)
            .or_insert_with(|| OrderBookLevel::new(order.price))
            .add_order(order);
    }

    /// Get the best (top-of-book) price
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            // Highest bid (last in sorted order)
            Side::Buy => self.levels.last_key_value().map(|(price, _)| *price),
            // Lowest ask (first in sorted order)
            Side::Sell => self.levels.first_key_value().map(|(price, _)| *price),
        }
    }

    pub fn best_level(&self) -> Option<&OrderBookLevel> {
        match self.side {
            Side::Buy => self.levels.last_key_value().map(|(_, level)| level),
            Side::Sell => self.levels.first_key_value().map(|(_, level)| level),
        }
    }

    pub fn best_level_mut(&mut self) -> Option<&mut OrderBookLevel> {
        match self.side {
            Side::Buy => self.levels.last_entry().map(|entry| entry.into_mut()),
            Side::Sell => self.levels.first_entry().map(|entry| entry.into_mut()),
        }
    }

    pub fn level(&self, price: Decimal) -> Option<&OrderBookLevel> {
        self.levels.get(&price)
    }

    pub fn remove_order(&mut self, price: Decimal, sequence_number: u64) -> Option<Order> {
        let level = self.levels.get_mut(&price)?;
        let order = level.remove(sequence_number)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(order)
    }

    /// Drop a level once its queue has drained
    pub fn remove_level_if_empty(&mut self, price: Decimal) {
        if self.levels.get(&price).is_some_and(|level| level.is_empty()) {
            self.levels.remove(&price);
        }
    }

    /// Levels from best to worst
    pub fn levels(&self) -> Box<dyn Iterator<Item = &OrderBookLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    /// Orders in priority order: best price first, FIFO within a price
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.levels().flat_map(|level| level.iter())
    }

    /// Get depth at N levels
    pub fn get_depth(&self, num_levels: usize) -> Vec<(Decimal, DepthQuantity)> {
        self.levels()
            .take(num_levels)
            .map(|level| (level.price, level.total_quantity()))
            .collect()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn total_quantity(&self) -> DepthQuantity {
        self.levels.values().map(|level| level.total_quantity()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

// ============================================================================
// Order Book
// ============================================================================

/// Where a resting order lives: side, price bucket and queue position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLocation {
    pub side: Side,
    pub price: Decimal,
    pub sequence_number: u64,
}

/// Both sides of the book plus an id index over every resting order.
///
/// Every indexed id resolves to exactly one (side, price, sequence) slot.
#[derive(Debug, Clone)]
pub struct OrderBook {
    bids: OrderBookSide,
    asks: OrderBookSide,
    index: HashMap<OrderId, OrderLocation>,
    open_orders_by_owner: HashMap<ParticipantId, usize>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: OrderBookSide::new(Side::Buy),
            asks: OrderBookSide::new(Side::Sell),
            index: HashMap::new(),
            open_orders_by_owner: HashMap::new(),
        }
    }

    pub fn side(&self, side: Side) -> &OrderBookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut OrderBookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    pub fn bids(&self) -> &OrderBookSide {
        &self.bids
    }

    pub fn asks(&self) -> &OrderBookSide {
        &self.asks
    }

    /// Rest an order on its side, then index it
    pub fn insert(&mut self, order: Order) {
        let id = order.id;
        let owner = order.owner;
        let location = OrderLocation {
            side: order.side,
            price: order.price,
            sequence_number: order.sequence_number(),
        };
        self.side_mut(location.side).add_order(order);
        self.index.insert(id, location);
        *self.open_orders_by_owner.entry(owner).or_insert(0) += 1;
    }

    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        let location = self.index.get(order_id)?;
        self.side(location.side)
            .level(location.price)?
            .get(location.sequence_number)
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    pub fn location(&self, order_id: &OrderId) -> Option<OrderLocation> {
        self.index.get(order_id).copied()
    }

    /// Take an order out of the book entirely
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let location = self.index.remove(order_id)?;
        let order = self
            .side_mut(location.side)
            .remove_order(location.price, location.sequence_number)?;
        self.release_owner_slot(order.owner);
        Some(order)
    }

    /// Drop index entries for an order already popped from its level by matching
    pub fn forget(&mut self, order: &Order) {
        if self.index.remove(&order.id).is_some() {
            self.release_owner_slot(order.owner);
        }
    }

    pub fn open_order_count(&self, owner: &ParticipantId) -> usize {
        self.open_orders_by_owner.get(owner).copied().unwrap_or(0)
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.checked_sub(bid),
            _ => None,
        }
    }

    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            // bid <= ask at rest, so neither step can overflow
            (Some(bid), Some(ask)) => ask
                .checked_sub(bid)
                .and_then(|spread| bid.checked_add(spread / Decimal::TWO)),
            _ => None,
        }
    }

    /// True if best bid >= best ask. Never true at rest.
    pub fn is_crossed(&self) -> bool {
        matches!((self.best_bid(), self.best_ask()), (Some(bid), Some(ask)) if bid >= ask)
    }

    /// All resting orders: bids best-first, then asks best-first
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.bids.orders().chain(self.asks.orders())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn release_owner_slot(&mut self, owner: ParticipantId) {
        if let Some(count) = self.open_orders_by_owner.get_mut(&owner) {
            *count -= 1;
            if *count == 0 {
                self.open_orders_by_owner.remove(&owner);
            }
        }
    }
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Immutable snapshot of the order book state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub instrument: String,
    pub contract_state: ContractState,
    /// Bid levels (price, quantity), best first
    pub bids: Vec<(Decimal, DepthQuantity)>,
    /// Ask levels (price, quantity), best first
    pub asks: Vec<(Decimal, DepthQuantity)>,
    /// Current spread (ask - bid)
    pub spread: Option<Decimal>,
    /// Mid price
    pub mid_price: Option<Decimal>,
    /// Number of resting orders across both sides
    pub order_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl OrderBookSnapshot {
    pub fn capture(
        instrument: String,
        contract_state: ContractState,
        book: &OrderBook,
        depth: usize,
    ) -> Self {
        Self {
            instrument,
            contract_state,
            bids: book.bids.get_depth(depth),
            asks: book.asks.get_depth(depth),
            spread: book.spread(),
            mid_price: book.mid_price(),
            order_count: book.len(),
            timestamp: Utc::now(),
        }
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|(price, _)| *price)
    }

    pub fn total_bid_quantity(&self) -> DepthQuantity {
        self.bids.iter().map(|(_, qty)| qty).sum()
    }

    pub fn total_ask_quantity(&self) -> DepthQuantity {
        self.asks.iter().map(|(_, qty)| qty).sum()
    }
}
