// ============================================================================
// Order Book Configuration
// ============================================================================

use rust_decimal::Decimal;

use super::errors::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of levels per side in a snapshot
pub const DEFAULT_SNAPSHOT_DEPTH: usize = 10;

/// Configuration for creating an order book
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookConfig {
    /// The security being offered (e.g., "ACME-IPO", "XS123456789")
    pub instrument: String,

    /// Optional: Price tick size (minimum price increment)
    /// None means no tick size enforcement
    pub tick_size: Option<Decimal>,

    /// Levels per side returned by `MatchingEngine::default_snapshot`
    pub snapshot_depth: usize,

    /// Optional: cap on resting orders a single participant may hold
    /// None means unlimited
    pub max_open_orders_per_participant: Option<usize>,
}

impl OrderBookConfig {
    /// Create a new configuration with required parameters
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            tick_size: None,
            snapshot_depth: DEFAULT_SNAPSHOT_DEPTH,
            max_open_orders_per_participant: None,
        }
    }

    /// Builder method: Set price tick size
    pub fn with_tick_size(mut self, tick: Decimal) -> Self {
        self.tick_size = Some(tick);
        self
    }

    pub fn with_snapshot_depth(mut self, depth: usize) -> Self {
        self.snapshot_depth = depth;
        self
    }

    pub fn with_max_open_orders(mut self, limit: usize) -> Self {
        self.max_open_orders_per_participant = Some(limit);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.trim().is_empty() {
            return Err(ConfigError::EmptyInstrument);
        }

        if let Some(tick) = self.tick_size {
            if tick <= Decimal::ZERO {
                return Err(ConfigError::NonPositiveTickSize);
            }
        }

        if self.snapshot_depth == 0 {
            return Err(ConfigError::ZeroSnapshotDepth);
        }

        if self.max_open_orders_per_participant == Some(0) {
            return Err(ConfigError::ZeroOrderLimit);
        }

        Ok(())
    }

    /// Whether a price sits on the tick grid (always true without a tick size)
    pub fn is_on_tick(&self, price: Decimal) -> bool {
        match self.tick_size {
            Some(tick) if tick > Decimal::ZERO => (price % tick).is_zero(),
            _ => true,
        }
    }
}

// ============================================================================
// Preset Configurations (Factory Methods)
// ============================================================================

impl OrderBookConfig {
    /// Equity bookbuilding: cent ticks, no per-participant cap
    pub fn equity_offering(instrument: impl Into<String>) -> Self {
        Self::new(instrument).with_tick_size(Decimal::new(1, 2))
    }

    /// Bond bookbuilding: prices quoted to 1/1000th of par, bounded order count
    /// per investor
    pub fn bond_offering(instrument: impl Into<String>, max_orders: usize) -> Self {
        Self::new(instrument)
            .with_tick_size(Decimal::new(1, 3))
            .with_max_open_orders(max_orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = OrderBookConfig::new("ACME-IPO");

        assert_eq!(config.instrument, "ACME-IPO");
        assert_eq!(config.snapshot_depth, DEFAULT_SNAPSHOT_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = OrderBookConfig::equity_offering("ACME-IPO")
            .with_snapshot_depth(5)
            .with_max_open_orders(3);

        assert_eq!(config.tick_size, Some(Decimal::new(1, 2)));
        assert_eq!(config.snapshot_depth, 5);
        assert_eq!(config.max_open_orders_per_participant, Some(3));
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            OrderBookConfig::new(" ").validate(),
            Err(ConfigError::EmptyInstrument)
        );
        assert_eq!(
            OrderBookConfig::new("X").with_tick_size(Decimal::ZERO).validate(),
            Err(ConfigError::NonPositiveTickSize)
        );
        assert_eq!(
            OrderBookConfig::new("X").with_snapshot_depth(0).validate(),
            Err(ConfigError::ZeroSnapshotDepth)
        );
        assert_eq!(
            OrderBookConfig::new("X").with_max_open_orders(0).validate(),
            Err(ConfigError::ZeroOrderLimit)
        );
    }

    #[test]
    fn test_tick_grid() {
        let config = OrderBookConfig::equity_offering("ACME-IPO");
        assert!(config.is_on_tick(Decimal::new(10025, 2)));
        assert!(!config.is_on_tick(Decimal::new(100255, 3)));

        let unrestricted = OrderBookConfig::new("ACME-IPO");
        assert!(unrestricted.is_on_tick(Decimal::new(100255, 3)));
    }
}
