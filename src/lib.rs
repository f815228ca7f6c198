// ============================================================================
// Contract Order Book Library
// Role-gated securities order book with price/time matching
// ============================================================================

//! # Contract Order Book
//!
//! A single-writer limit order book attached to an offering contract.
//!
//! ## Features
//!
//! - **Price/time priority matching** at the resting (maker) order's price
//! - **Contract lifecycle** `terms -> orderbook_open -> settlement`, admin-driven
//! - **Role-gated access** for submitting, cancelling and viewing orders
//! - **Event stream** of trades and lifecycle changes for settlement consumers
//!
//! ## Example
//!
//! ```rust
//! use contract_orderbook::prelude::*;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let engine = MatchingEngine::new(
//!     "ACME-IPO".to_string(),
//!     Box::new(PriceTimePriority::new()),
//!     Arc::new(NoOpEventHandler),
//! );
//!
//! let admin = Participant::new(Role::Admin);
//! let buyer = Participant::new(Role::Buyer);
//! let seller = Participant::new(Role::Seller);
//!
//! engine.set_contract_state(&admin, ContractState::OrderbookOpen).unwrap();
//!
//! engine.submit_order(&buyer, Side::Buy, 5, Decimal::from(101)).unwrap();
//! let result = engine.submit_order(&seller, Side::Sell, 10, Decimal::from(100)).unwrap();
//!
//! // Maker price wins
//! assert_eq!(result.trades[0].price, Decimal::from(101));
//! assert_eq!(engine.best_ask(), Some(Decimal::from(100)));
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        BookError, BookResult, ConfigError, Contract, ContractState, DepthQuantity, Order,
        OrderBookConfig, OrderBookSnapshot, OrderId, OrderStatus, Participant, ParticipantId,
        Quantity, Role, Side, StateChange, Trade,
    };
    pub use crate::engine::{
        create_from_config, MatchingEngine, MatchingEngineBuilder, PriceTimePriority,
        SubmitResult,
    };
    pub use crate::interfaces::{
        ChannelEventHandler, EventHandler, LoggingEventHandler, MatchingAlgorithm,
        NoOpEventHandler, OrderEvent,
    };
}


#[cfg(test)]
mod property_tests {
    use super::prelude::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    enum Op {
        Submit { buy: bool, quantity: Quantity, price: i64 },
        Cancel { pick: usize },
        Modify { pick: usize, quantity: Quantity, price: i64 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (any::<bool>(), 1u64..50, 90i64..110)
                .prop_map(|(buy, quantity, price)| Op::Submit { buy, quantity, price }),
            1 => any::<usize>().prop_map(|pick| Op::Cancel { pick }),
            1 => (any::<usize>(), 1u64..50, 90i64..110)
                .prop_map(|(pick, quantity, price)| Op::Modify { pick, quantity, price }),
        ]
    }

    fn open_engine() -> (MatchingEngine, Participant) {
        let engine = MatchingEngine::new(
            "PROP".to_string(),
            Box::new(PriceTimePriority::new()),
            Arc::new(NoOpEventHandler),
        );
        let admin = Participant::new(Role::Admin);
        engine
            .set_contract_state(&admin, ContractState::OrderbookOpen)
            .unwrap();
        (engine, admin)
    }

    proptest! {
        #[test]
        fn prop_book_never_crossed_and_quantity_conserved(
            ops in prop::collection::vec(op_strategy(), 1..120)
        ) {
            let (engine, admin) = open_engine();
            let investor = Participant::new(Role::Investor);

            let mut submitted: HashMap<Side, Quantity> = HashMap::new();
            let mut cancelled: HashMap<Side, Quantity> = HashMap::new();
            let mut traded: Quantity = 0;
            let mut prices: HashMap<OrderId, (Side, Decimal)> = HashMap::new();
            let mut ids: Vec<OrderId> = Vec::new();

            for op in ops {
                match op {
                    Op::Submit { buy, quantity, price } => {
                        let side = if buy { Side::Buy } else { Side::Sell };
                        let price = Decimal::from(price);
                        let result = engine.submit_order(&investor, side, quantity, price).unwrap();

                        *submitted.entry(side).or_insert(0) += quantity;
                        for trade in &result.trades {
                            traded += trade.quantity;
                            // maker price, never worse than the taker's limit
                            let (_, maker_price) = prices[&trade.maker_order_id];
                            prop_assert_eq!(trade.price, maker_price);
                            match side {
                                Side::Buy => prop_assert!(trade.price <= price),
                                Side::Sell => prop_assert!(trade.price >= price),
                            }
                        }
                        prices.insert(result.order_id, (side, price));
                        ids.push(result.order_id);
                    }
                    Op::Cancel { pick } => {
                        if ids.is_empty() {
                            continue;
                        }
                        let id = ids[pick % ids.len()];
                        match engine.cancel_order(id, &admin) {
                            Ok(order) => {
                                *cancelled.entry(order.side).or_insert(0) += order.remaining_quantity();
                            }
                            Err(err) => prop_assert_eq!(err, BookError::NotFound(id)),
                        }
                    }
                    Op::Modify { pick, quantity, price } => {
                        if ids.is_empty() {
                            continue;
                        }
                        let id = ids[pick % ids.len()];
                        let price = Decimal::from(price);
                        let before = engine.get_order(id, &admin);
                        match (before, engine.modify_order(id, quantity, price, &admin)) {
                            (Ok(original), Ok(result)) => {
                                let side = original.side;
                                // withdraws the old remainder, re-enters with the new size
                                *cancelled.entry(side).or_insert(0) += original.remaining_quantity();
                                *submitted.entry(side).or_insert(0) += quantity;
                                for trade in &result.trades {
                                    traded += trade.quantity;
                                    prop_assert_ne!(trade.maker_order_id, id);
                                    let (_, maker_price) = prices[&trade.maker_order_id];
                                    prop_assert_eq!(trade.price, maker_price);
                                }
                                prices.insert(id, (side, price));
                            }
                            (Err(_), Err(err)) => prop_assert_eq!(err, BookError::NotFound(id)),
                            (before, after) => prop_assert!(
                                false,
                                "lookup and modify disagree: {:?} vs {:?}",
                                before.map(|o| o.id),
                                after.map(|r| r.order_id)
                            ),
                        }
                    }
                }

                if let (Some(bid), Some(ask)) = (engine.best_bid(), engine.best_ask()) {
                    prop_assert!(bid < ask, "crossed book at rest: {} >= {}", bid, ask);
                }
            }

            let orders = engine.get_orders(&admin);
            for side in [Side::Buy, Side::Sell] {
                let resting: Quantity = orders
                    .iter()
                    .filter(|o| o.side == side)
                    .map(|o| o.remaining_quantity())
                    .sum();
                prop_assert_eq!(
                    submitted.get(&side).copied().unwrap_or(0),
                    traded + resting + cancelled.get(&side).copied().unwrap_or(0)
                );
            }
        }

        #[test]
        fn prop_buy_through_best_ask_trades_at_resting_price(
            ask_price in 1i64..1_000,
            premium in 0i64..100,
            ask_qty in 1u64..100,
            bid_qty in 1u64..100,
        ) {
            let (engine, _) = open_engine();
            let seller = Participant::new(Role::Seller);
            let buyer = Participant::new(Role::Buyer);

            engine.submit_order(&seller, Side::Sell, ask_qty, Decimal::from(ask_price)).unwrap();
            let result = engine
                .submit_order(&buyer, Side::Buy, bid_qty, Decimal::from(ask_price + premium))
                .unwrap();

            prop_assert_eq!(result.trades.len(), 1);
            prop_assert_eq!(result.trades[0].price, Decimal::from(ask_price));
            prop_assert_eq!(result.trades[0].quantity, ask_qty.min(bid_qty));
        }
    }
}
