// ============================================================================
// Matching Engine
// Core business logic for order matching and contract gating
// ============================================================================

use crate::domain::{
    BookError, BookResult, Contract, ContractState, Order, OrderBook, OrderBookConfig,
    OrderBookSnapshot, OrderId, Participant, Quantity, Side, StateChange, Trade,
};
use crate::interfaces::{EventHandler, MatchingAlgorithm, OrderEvent};
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a mutation touches, guarded as one unit
struct BookState {
    contract: Contract,
    book: OrderBook,
    sequence_counter: u64,
}

/// Result of a submit or modify call
#[derive(Debug, Clone)]
pub struct SubmitResult {
    pub order_id: OrderId,
    /// Trades in execution order
    pub trades: Vec<Trade>,
    /// Quantity left resting on the book (0 if fully filled)
    pub resting_quantity: Quantity,
    /// Events emitted for this call, in order
    pub events: Vec<OrderEvent>,
}

impl SubmitResult {
    pub fn filled_quantity(&self) -> Quantity {
        self.trades.iter().map(|trade| trade.quantity).sum()
    }

    pub fn is_fully_filled(&self) -> bool {
        self.resting_quantity == 0
    }
}

/// Single-writer matching engine for one contract's order book.
///
/// Contract state, both book sides, the order index and the sequence counter
/// sit behind one `RwLock`: mutations (submit, cancel, modify, contract
/// transitions) hold the write lock for their whole duration, reads share the
/// read lock and never observe a half-applied match.
pub struct MatchingEngine {
    /// Offered security (e.g., "ACME-IPO")
    instrument: Arc<String>,

    config: OrderBookConfig,

    state: RwLock<BookState>,

    /// Pluggable matching algorithm
    algorithm: Box<dyn MatchingAlgorithm>,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,
}

impl MatchingEngine {
    /// Create a new matching engine with default configuration
    pub fn new(
        instrument: String,
        algorithm: Box<dyn MatchingAlgorithm>,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        let config = OrderBookConfig::new(instrument);
        Self::with_config(config, algorithm, event_handler)
    }

    /// Create an engine from an already validated configuration
    pub(crate) fn with_config(
        config: OrderBookConfig,
        algorithm: Box<dyn MatchingAlgorithm>,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            instrument: Arc::new(config.instrument.clone()),
            config,
            state: RwLock::new(BookState {
                contract: Contract::new(),
                book: OrderBook::new(),
                sequence_counter: 0,
            }),
            algorithm,
            event_handler,
        }
    }

    // ========================================================================
    // Contract lifecycle
    // ========================================================================

    /// Move the contract to its next state. Admin only, one step forward.
    pub fn set_contract_state(
        &self,
        requestor: &Participant,
        new_state: ContractState,
    ) -> BookResult<StateChange> {
        let mut state = self.state.write();

        let change = state
            .contract
            .set_state(requestor, new_state)
            .inspect_err(|err| {
                warn!(
                    instrument = %self.instrument,
                    requestor = %requestor.id(),
                    error = %err,
                    "contract state change rejected"
                );
            })?;

        info!(
            instrument = %self.instrument,
            from = %change.from,
            to = %change.to,
            resting_orders = state.book.len(),
            "contract state changed"
        );

        self.event_handler
            .on_event(OrderEvent::ContractStateChanged {
                change: change.clone(),
            });

        Ok(change)
    }

    pub fn contract_state(&self) -> ContractState {
        self.state.read().contract.state()
    }

    pub fn is_open(&self) -> bool {
        self.state.read().contract.is_open()
    }

    // ========================================================================
    // Order mutation
    // ========================================================================

    /// Submit a limit order on behalf of `owner`.
    ///
    /// The order is matched against the opposite side at maker prices; any
    /// unfilled remainder rests at the back of its price level.
    pub fn submit_order(
        &self,
        owner: &Participant,
        side: Side,
        quantity: Quantity,
        price: Decimal,
    ) -> BookResult<SubmitResult> {
        let mut state = self.state.write();

        let checked = state
            .contract
            .ensure_open()
            .and_then(|_| self.check_can_trade(owner, side))
            .and_then(|_| self.validate_order(quantity, price))
            .and_then(|_| self.check_order_limit(&state.book, owner));
        if let Err(err) = checked {
            debug!(
                instrument = %self.instrument,
                owner = %owner.id(),
                %side,
                quantity,
                %price,
                error = %err,
                "order rejected"
            );
            return Err(err);
        }

        let order = Order::new(owner.id(), side, price, quantity);
        let order_id = order.id;
        let mut events = Vec::new();
        let (trades, resting_quantity) = self.execute(&mut state, order, &mut events);

        self.event_handler.on_events(events.clone());

        Ok(SubmitResult {
            order_id,
            trades,
            resting_quantity,
            events,
        })
    }

    /// Cancel a resting order. Only its owner or an admin may do so.
    pub fn cancel_order(&self, order_id: OrderId, requestor: &Participant) -> BookResult<Order> {
        let mut state = self.state.write();

        state.contract.ensure_open()?;
        Self::check_can_manage(&state.book, order_id, requestor)?;

        let mut order = state
            .book
            .remove(&order_id)
            .ok_or(BookError::NotFound(order_id))?;
        order.cancel();

        info!(
            instrument = %self.instrument,
            %order_id,
            requestor = %requestor.id(),
            remaining = order.remaining_quantity(),
            "order cancelled"
        );

        self.event_handler.on_event(OrderEvent::OrderCancelled {
            order_id,
            remaining_quantity: order.remaining_quantity(),
            timestamp: Utc::now(),
        });

        Ok(order)
    }

    /// Replace an order's quantity and price.
    ///
    /// This is an explicit cancel + resubmit: the order keeps its id and
    /// owner but takes a new arrival sequence, so it always goes to the back
    /// of the queue at its (new) price, even if only the quantity shrank. The
    /// replacement may trade immediately if it crosses.
    pub fn modify_order(
        &self,
        order_id: OrderId,
        new_quantity: Quantity,
        new_price: Decimal,
        requestor: &Participant,
    ) -> BookResult<SubmitResult> {
        let mut state = self.state.write();

        state.contract.ensure_open()?;
        Self::check_can_manage(&state.book, order_id, requestor)?;
        self.validate_order(new_quantity, new_price)?;

        let original = state
            .book
            .remove(&order_id)
            .ok_or(BookError::NotFound(order_id))?;

        let mut events = vec![OrderEvent::OrderModified {
            order_id,
            old_price: original.price,
            old_quantity: original.remaining_quantity(),
            new_price,
            new_quantity,
            timestamp: Utc::now(),
        }];

        info!(
            instrument = %self.instrument,
            %order_id,
            old_price = %original.price,
            old_quantity = original.remaining_quantity(),
            %new_price,
            new_quantity,
            "order modified, queue priority reset"
        );

        let replacement = Order::replacement(
            original.id,
            original.owner,
            original.side,
            new_price,
            new_quantity,
        );
        let (trades, resting_quantity) = self.execute(&mut state, replacement, &mut events);

        self.event_handler.on_events(events.clone());

        Ok(SubmitResult {
            order_id,
            trades,
            resting_quantity,
            events,
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Orders visible to `requestor`: everything for admin, bookrunner and
    /// issuer; only their own for investors, buyers and sellers.
    pub fn get_orders(&self, requestor: &Participant) -> Vec<Order> {
        let state = self.state.read();

        if requestor.can_view_all_orders() {
            state.book.orders().cloned().collect()
        } else {
            let owner = requestor.id();
            state
                .book
                .orders()
                .filter(|order| order.owner == owner)
                .cloned()
                .collect()
        }
    }

    /// Look up one resting order under the same visibility rules as `get_orders`
    pub fn get_order(&self, order_id: OrderId, requestor: &Participant) -> BookResult<Order> {
        let state = self.state.read();
        let order = state
            .book
            .get(&order_id)
            .ok_or(BookError::NotFound(order_id))?;

        if requestor.can_view_all_orders() || order.owner == requestor.id() {
            Ok(order.clone())
        } else {
            Err(BookError::Permission(format!(
                "role {} may only view its own orders",
                requestor.role()
            )))
        }
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.state.read().book.best_bid()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.state.read().book.best_ask()
    }

    /// Get spread
    pub fn get_spread(&self) -> Option<Decimal> {
        self.state.read().book.spread()
    }

    /// Get mid price
    pub fn get_mid_price(&self) -> Option<Decimal> {
        self.state.read().book.mid_price()
    }

    /// Get order book snapshot
    pub fn get_snapshot(&self, depth: usize) -> OrderBookSnapshot {
        let state = self.state.read();
        OrderBookSnapshot::capture(
            (*self.instrument).clone(),
            state.contract.state(),
            &state.book,
            depth,
        )
    }

    /// Snapshot at the configured depth
    pub fn default_snapshot(&self) -> OrderBookSnapshot {
        self.get_snapshot(self.config.snapshot_depth)
    }

    pub fn order_count(&self) -> usize {
        self.state.read().book.len()
    }

    /// Get the instrument name
    pub fn get_instrument(&self) -> &str {
        &self.instrument
    }

    pub fn config(&self) -> &OrderBookConfig {
        &self.config
    }

    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    /// Sequence, match and rest an already validated order.
    /// Returns the trades and the quantity left resting.
    fn execute(
        &self,
        state: &mut BookState,
        mut order: Order,
        events: &mut Vec<OrderEvent>,
    ) -> (Vec<Trade>, Quantity) {
        state.sequence_counter += 1;
        order.set_sequence_number(state.sequence_counter);

        events.push(OrderEvent::OrderAccepted {
            order_id: order.id,
            owner: order.owner,
            side: order.side,
            price: order.price,
            quantity: order.quantity,
            sequence_number: order.sequence_number(),
            timestamp: Utc::now(),
        });

        let opposite = order.side.opposite();
        let outcome = self
            .algorithm
            .match_order(&mut order, state.book.side_mut(opposite));

        for maker in &outcome.filled_makers {
            state.book.forget(maker);
        }

        let now = Utc::now();
        for trade in &outcome.trades {
            debug!(
                instrument = %self.instrument,
                trade_id = %trade.id,
                buy_order_id = %trade.buy_order_id,
                sell_order_id = %trade.sell_order_id,
                price = %trade.price,
                quantity = trade.quantity,
                "trade executed"
            );

            events.push(OrderEvent::OrderMatched {
                trade: trade.clone(),
                timestamp: now,
            });

            // Maker side of the fill
            match state.book.get(&trade.maker_order_id) {
                Some(maker) => events.push(OrderEvent::OrderPartiallyFilled {
                    order_id: maker.id,
                    filled_quantity: maker.filled_quantity(),
                    remaining_quantity: maker.remaining_quantity(),
                    timestamp: now,
                }),
                None => {
                    if let Some(maker) = outcome
                        .filled_makers
                        .iter()
                        .find(|maker| maker.id == trade.maker_order_id)
                    {
                        events.push(OrderEvent::OrderFilled {
                            order_id: maker.id,
                            total_filled: maker.filled_quantity(),
                            timestamp: now,
                        });
                    }
                },
            }
        }

        let remaining = order.remaining_quantity();
        let filled = order.filled_quantity();

        if remaining == 0 {
            events.push(OrderEvent::OrderFilled {
                order_id: order.id,
                total_filled: filled,
                timestamp: now,
            });
        } else {
            if filled > 0 {
                events.push(OrderEvent::OrderPartiallyFilled {
                    order_id: order.id,
                    filled_quantity: filled,
                    remaining_quantity: remaining,
                    timestamp: now,
                });
            }

            debug!(
                instrument = %self.instrument,
                order_id = %order.id,
                side = %order.side,
                price = %order.price,
                quantity = remaining,
                "order rested"
            );

            events.push(OrderEvent::OrderAddedToBook {
                order_id: order.id,
                price: order.price,
                quantity: remaining,
                timestamp: now,
            });
            state.book.insert(order);
        }

        (outcome.trades, remaining)
    }

    fn check_can_trade(&self, owner: &Participant, side: Side) -> BookResult<()> {
        if owner.can_trade(side) {
            Ok(())
        } else {
            Err(BookError::Permission(format!(
                "role {} cannot place {} orders",
                owner.role(),
                side
            )))
        }
    }

    /// Owner or admin may cancel/modify an existing order
    fn check_can_manage(
        book: &OrderBook,
        order_id: OrderId,
        requestor: &Participant,
    ) -> BookResult<()> {
        let order = book.get(&order_id).ok_or(BookError::NotFound(order_id))?;

        if order.owner == requestor.id() || requestor.is_admin() {
            Ok(())
        } else {
            Err(BookError::Permission(format!(
                "participant {} does not own order {}",
                requestor.id(),
                order_id
            )))
        }
    }

    fn validate_order(&self, quantity: Quantity, price: Decimal) -> BookResult<()> {
        if quantity == 0 {
            return Err(BookError::InvalidOrder(
                "Quantity must be positive".to_string(),
            ));
        }

        if price < Decimal::ZERO {
            return Err(BookError::InvalidOrder(format!(
                "Price must be non-negative, got {}",
                price
            )));
        }

        if !self.config.is_on_tick(price) {
            return Err(BookError::InvalidOrder(format!(
                "Price {} is not a multiple of tick size {}",
                price,
                self.config.tick_size.unwrap_or_default()
            )));
        }

        Ok(())
    }

    fn check_order_limit(&self, book: &OrderBook, owner: &Participant) -> BookResult<()> {
        match self.config.max_open_orders_per_participant {
            Some(limit) if book.open_order_count(&owner.id()) >= limit => {
                Err(BookError::InvalidOrder(format!(
                    "participant already has {} open orders (limit {})",
                    book.open_order_count(&owner.id()),
                    limit
                )))
            },
            _ => Ok(()),
        }
    }
}
