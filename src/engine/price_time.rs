// ============================================================================
// Price/Time Priority Matching Algorithm (FIFO)
// ============================================================================

use crate::domain::{Order, OrderBookSide, Trade};
use crate::interfaces::{MatchOutcome, MatchingAlgorithm};

/// Price/Time Priority (FIFO) matching algorithm
///
/// The best-priced resting order is matched first; among orders at the same
/// price, the earliest arrival wins. Trades execute at the resting (maker)
/// order's price.
///
/// # Example
/// ```text
/// Book:  100 @ 10 (Order A, seq=1)
///        100 @ 20 (Order B, seq=2)
///
/// Incoming: Buy 15 @ 101
/// Result: 10 with A @ 100, then 5 with B @ 100; B rests with 15
/// ```
#[derive(Debug, Default)]
pub struct PriceTimePriority;

impl PriceTimePriority {
    pub fn new() -> Self {
        Self
    }
}

impl MatchingAlgorithm for PriceTimePriority {
    fn match_order(
        &self,
        incoming_order: &mut Order,
        opposite_side: &mut OrderBookSide,
    ) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();

        while !incoming_order.is_filled() {
            let level = match opposite_side.best_level_mut() {
                Some(level) => level,
                None => break,
            };

            let level_price = level.price;
            if !self.prices_cross(incoming_order, level_price) {
                break;
            }

            let (maker_id, trade_quantity, maker_done) = match level.front_mut() {
                Some(maker) => {
                    let trade_quantity = incoming_order
                        .remaining_quantity()
                        .min(maker.remaining_quantity());
                    if !maker.fill(trade_quantity) {
                        break;
                    }
                    (maker.id, trade_quantity, maker.is_filled())
                },
                None => {
                    opposite_side.remove_level_if_empty(level_price);
                    continue;
                },
            };

            if !incoming_order.fill(trade_quantity) {
                break;
            }
            level.subtract_quantity(trade_quantity);

            if maker_done {
                if let Some(maker) = level.pop_front() {
                    outcome.filled_makers.push(maker);
                }
            }

            outcome.trades.push(Trade::new(
                maker_id,
                incoming_order.id,
                incoming_order.side,
                level_price,
                trade_quantity,
            ));

            opposite_side.remove_level_if_empty(level_price);
        }

        outcome
    }

    fn name(&self) -> &str {
        "PriceTime"
    }
}
