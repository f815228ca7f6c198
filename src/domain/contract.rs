// ============================================================================
// Contract Lifecycle
// terms -> orderbook_open -> settlement, admin-driven
// ============================================================================

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use super::errors::{BookError, BookResult};
use super::participant::{Participant, ParticipantId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContractState {
    /// Terms are being negotiated; the book is not accepting orders yet
    #[default]
    Terms,
    /// Orders may be submitted, cancelled and modified
    OrderbookOpen,
    /// Terminal. The book is frozen and readable only
    Settlement,
}

impl ContractState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractState::Terms => "terms",
            ContractState::OrderbookOpen => "orderbook_open",
            ContractState::Settlement => "settlement",
        }
    }

    /// The only state this one may move to, if any
    pub fn successor(&self) -> Option<ContractState> {
        match self {
            ContractState::Terms => Some(ContractState::OrderbookOpen),
            ContractState::OrderbookOpen => Some(ContractState::Settlement),
            ContractState::Settlement => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }

    pub fn permits_order_mutation(&self) -> bool {
        matches!(self, ContractState::OrderbookOpen)
    }

    pub fn transition(&self, next: ContractState) -> BookResult<ContractState> {
        if self.successor() == Some(next) {
            Ok(next)
        } else {
            Err(BookError::InvalidTransition {
                from: *self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ContractState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terms" => Ok(ContractState::Terms),
            "orderbook_open" => Ok(ContractState::OrderbookOpen),
            "settlement" => Ok(ContractState::Settlement),
            other => Err(format!("unknown contract state: {}", other)),
        }
    }
}

/// Record of an applied state change
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateChange {
    pub from: ContractState,
    pub to: ContractState,
    pub changed_by: ParticipantId,
    pub timestamp: DateTime<Utc>,
}

/// Contract lifecycle holder. Only admins may move it forward, one step at a time.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    state: ContractState,
}

impl Contract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ContractState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.permits_order_mutation()
    }

    /// Fails with `BookClosed` unless orders may be mutated right now
    pub fn ensure_open(&self) -> BookResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(BookError::BookClosed { state: self.state })
        }
    }

    /// Apply a state change. Permission is checked before legality, and a
    /// failed call leaves the state unchanged.
    pub fn set_state(
        &mut self,
        requestor: &Participant,
        next: ContractState,
    ) -> BookResult<StateChange> {
        if !requestor.is_admin() {
            return Err(BookError::Permission(format!(
                "role {} cannot change the contract state",
                requestor.role()
            )));
        }

        let from = self.state;
        self.state = from.transition(next)?;

        Ok(StateChange {
            from,
            to: self.state,
            changed_by: requestor.id(),
            timestamp: Utc::now(),
        })
    }
}
