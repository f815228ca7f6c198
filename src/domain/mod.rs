// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod contract;
pub mod errors;
pub mod order;
pub mod order_book;
pub mod participant;
pub mod trade;

pub use config::OrderBookConfig;
pub use contract::{Contract, ContractState, StateChange};
pub use errors::{BookError, BookResult, ConfigError};
pub use order::{Order, OrderId, Quantity, Side};
pub use order_book::{
    DepthQuantity, OrderBook, OrderBookLevel, OrderBookSide, OrderBookSnapshot, OrderLocation,
};
pub use participant::{Participant, ParticipantId, Role};
pub use trade::Trade;

// Re-export status machine
pub use order::status::{OrderStatus, OrderStatusTransition};
