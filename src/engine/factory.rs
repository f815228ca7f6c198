// ============================================================================
// Order Book Factory
// Creates matching engines with proper configuration
// ============================================================================

use crate::domain::{BookResult, OrderBookConfig};
use crate::engine::{MatchingEngine, PriceTimePriority};
use crate::interfaces::EventHandler;
use rust_decimal::Decimal;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a matching engine from configuration
///
/// # Arguments
/// * `config` - Order book configuration
/// * `event_handler` - Event handler for order, trade and lifecycle events
///
/// # Example
/// ```
/// use contract_orderbook::prelude::*;
/// use std::sync::Arc;
///
/// let config = OrderBookConfig::equity_offering("ACME-IPO");
/// let engine = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(engine.contract_state(), ContractState::Terms);
/// ```
pub fn create_from_config(
    config: OrderBookConfig,
    event_handler: Arc<dyn EventHandler>,
) -> BookResult<MatchingEngine> {
    // Validate configuration first
    config.validate()?;

    tracing::debug!(
        instrument = %config.instrument,
        tick_size = ?config.tick_size,
        max_open_orders = ?config.max_open_orders_per_participant,
        "creating order book"
    );

    Ok(MatchingEngine::with_config(
        config,
        Box::new(PriceTimePriority::new()),
        event_handler,
    ))
}

// ============================================================================
// Builder Pattern for Advanced Configuration
// ============================================================================

/// Builder for creating matching engines with fluent API
///
/// # Example
/// ```
/// use contract_orderbook::prelude::*;
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
///
/// let engine = MatchingEngineBuilder::new("ACME-IPO")
///     .with_tick_size(Decimal::new(1, 2))
///     .with_max_open_orders(5)
///     .build(Arc::new(NoOpEventHandler))
///     .unwrap();
/// assert_eq!(engine.get_instrument(), "ACME-IPO");
/// ```
pub struct MatchingEngineBuilder {
    config: OrderBookConfig,
}

impl MatchingEngineBuilder {
    /// Create a new builder for the specified instrument
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            config: OrderBookConfig::new(instrument),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: OrderBookConfig) -> Self {
        Self { config }
    }

    /// Set price tick size
    pub fn with_tick_size(mut self, tick_size: Decimal) -> Self {
        self.config.tick_size = Some(tick_size);
        self
    }

    /// Set default snapshot depth
    pub fn with_snapshot_depth(mut self, depth: usize) -> Self {
        self.config.snapshot_depth = depth;
        self
    }

    /// Cap resting orders per participant
    pub fn with_max_open_orders(mut self, limit: usize) -> Self {
        self.config.max_open_orders_per_participant = Some(limit);
        self
    }

    /// Build the matching engine
    pub fn build(self, event_handler: Arc<dyn EventHandler>) -> BookResult<MatchingEngine> {
        create_from_config(self.config, event_handler)
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &OrderBookConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookError, ConfigError, ContractState, Participant, Role, Side};
    use crate::interfaces::NoOpEventHandler;

    fn open(engine: &MatchingEngine) {
        engine
            .set_contract_state(&Participant::new(Role::Admin), ContractState::OrderbookOpen)
            .unwrap();
    }

    #[test]
    fn test_create_from_config() {
        let config = OrderBookConfig::equity_offering("ACME-IPO");
        let engine = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
        assert_eq!(engine.get_instrument(), "ACME-IPO");
        assert_eq!(engine.algorithm_name(), "PriceTime");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = create_from_config(OrderBookConfig::new(""), Arc::new(NoOpEventHandler));
        assert!(matches!(
            result,
            Err(BookError::Config(ConfigError::EmptyInstrument))
        ));
    }

    #[test]
    fn test_tick_size_enforced() {
        let engine = MatchingEngineBuilder::new("ACME-IPO")
            .with_tick_size(Decimal::new(5, 2))
            .build(Arc::new(NoOpEventHandler))
            .unwrap();
        open(&engine);
        let investor = Participant::new(Role::Investor);

        assert!(engine
            .submit_order(&investor, Side::Buy, 1, Decimal::new(1005, 2))
            .is_ok());
        assert!(matches!(
            engine.submit_order(&investor, Side::Buy, 1, Decimal::new(1003, 2)),
            Err(BookError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_open_order_limit_enforced() {
        let engine = MatchingEngineBuilder::from_config(OrderBookConfig::bond_offering("ACME-2030", 2))
            .build(Arc::new(NoOpEventHandler))
            .unwrap();
        open(&engine);
        let investor = Participant::new(Role::Investor);
        let other = Participant::new(Role::Investor);

        let first = engine
            .submit_order(&investor, Side::Buy, 1, Decimal::new(995, 1))
            .unwrap();
        engine
            .submit_order(&investor, Side::Buy, 1, Decimal::new(994, 1))
            .unwrap();
        assert!(matches!(
            engine.submit_order(&investor, Side::Buy, 1, Decimal::new(993, 1)),
            Err(BookError::InvalidOrder(_))
        ));
        // the cap is per participant
        assert!(engine
            .submit_order(&other, Side::Buy, 1, Decimal::new(993, 1))
            .is_ok());

        engine.cancel_order(first.order_id, &investor).unwrap();
        assert!(engine
            .submit_order(&investor, Side::Buy, 1, Decimal::new(993, 1))
            .is_ok());
    }

    #[test]
    fn test_builder_snapshot_depth() {
        let builder = MatchingEngineBuilder::new("ACME-IPO").with_snapshot_depth(2);
        assert_eq!(builder.get_config().snapshot_depth, 2);

        let engine = builder.build(Arc::new(NoOpEventHandler)).unwrap();
        open(&engine);
        let investor = Participant::new(Role::Investor);
        for i in 0..4 {
            engine
                .submit_order(&investor, Side::Sell, 1, Decimal::from(100 + i))
                .unwrap();
        }

        assert_eq!(engine.default_snapshot().asks.len(), 2);
    }
}
