// ============================================================================
// Matching Algorithm Interface
// Defines the contract for pluggable matching algorithms
// ============================================================================

use crate::domain::{Order, OrderBookSide, Trade};
use rust_decimal::Decimal;

/// What one incoming order did to the opposite side
#[derive(Debug, Default)]
pub struct MatchOutcome {
    /// Trades in execution order
    pub trades: Vec<Trade>,

    /// Resting orders that were completely filled and popped from their level.
    /// The caller must drop them from the book's index.
    pub filled_makers: Vec<Order>,
}

/// Strategy pattern interface for matching algorithms
pub trait MatchingAlgorithm: Send + Sync {
    /// Match an incoming order against the opposite side of the book
    ///
    /// # Arguments
    /// * `incoming_order` - The new order to match; its remaining quantity is decremented
    /// * `opposite_side` - The opposite side of the order book
    ///
    /// Implementations must never leave an empty level or a zero-quantity
    /// order behind on `opposite_side`.
    fn match_order(&self, incoming_order: &mut Order, opposite_side: &mut OrderBookSide)
        -> MatchOutcome;

    /// Get the algorithm name for logging/metrics
    fn name(&self) -> &str;

    /// Check if the incoming order's limit crosses a resting price
    fn prices_cross(&self, incoming: &Order, book_price: Decimal) -> bool {
        incoming.crosses(book_price)
    }
}
