// ============================================================================
// Order Book Errors
// Error taxonomy for order book, permission and lifecycle failures
// ============================================================================

use thiserror::Error;

use super::contract::ContractState;
use super::order::OrderId;

/// Errors returned by order book operations.
///
/// All of them are raised before the book is mutated, so a failed call
/// leaves the book exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// Quantity or price failed validation
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// Order mutation attempted while the contract is not in `orderbook_open`
    #[error("order book is closed (contract state: {state})")]
    BookClosed { state: ContractState },

    /// Requestor's role lacks the capability
    #[error("permission denied: {0}")]
    Permission(String),

    /// Unknown order id
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// Illegal contract state change
    #[error("invalid contract transition from {from} to {to}")]
    InvalidTransition {
        from: ContractState,
        to: ContractState,
    },

    /// Role name outside the fixed role set
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Balance operation rejected
    #[error("invalid balance operation: {0}")]
    Balance(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("instrument cannot be empty")]
    EmptyInstrument,

    #[error("tick size must be positive")]
    NonPositiveTickSize,

    #[error("snapshot depth must be at least 1")]
    ZeroSnapshotDepth,

    #[error("open order limit must be at least 1")]
    ZeroOrderLimit,
}

/// Result type alias for order book operations
pub type BookResult<T> = Result<T, BookError>;
