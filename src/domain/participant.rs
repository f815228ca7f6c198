// ============================================================================
// Participant Domain Model
// ============================================================================

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::{BookError, BookResult};
use super::Side;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed set of roles a participant can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    Buyer,
    Seller,
    Admin,
    Issuer,
    Bookrunner,
    Investor,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Buyer,
        Role::Seller,
        Role::Admin,
        Role::Issuer,
        Role::Bookrunner,
        Role::Investor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
            Role::Issuer => "issuer",
            Role::Bookrunner => "bookrunner",
            Role::Investor => "investor",
        }
    }

    /// Whether this role sees every order in the book, or only its own
    pub fn can_view_all_orders(&self) -> bool {
        match self {
            Role::Admin | Role::Bookrunner | Role::Issuer => true,
            Role::Investor | Role::Buyer | Role::Seller => false,
        }
    }

    /// Sides this role may place orders on
    pub fn can_trade(&self, side: Side) -> bool {
        match (self, side) {
            (Role::Investor, _) => true,
            (Role::Buyer, Side::Buy) => true,
            (Role::Seller | Role::Issuer, Side::Sell) => true,
            (Role::Buyer, Side::Sell)
            | (Role::Seller | Role::Issuer, Side::Buy)
            | (Role::Admin | Role::Bookrunner, _) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BookError;

    /// Case-insensitive; anything outside the six role names is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| BookError::InvalidRole(s.to_string()))
    }
}

// ============================================================================
// Participant Entity
// ============================================================================

/// A market participant. The role is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Participant {
    id: ParticipantId,
    role: Role,
    balance: Decimal,
}

impl Participant {
    pub fn new(role: Role) -> Self {
        Self::with_balance(role, Decimal::ZERO)
    }

    pub fn with_balance(role: Role, balance: Decimal) -> Self {
        Self {
            id: ParticipantId::new(),
            role,
            balance,
        }
    }

    /// Build a participant from a role name, failing on unknown roles
    pub fn from_role_name(role: &str) -> BookResult<Self> {
        Ok(Self::new(role.parse()?))
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can_view_all_orders(&self) -> bool {
        self.role.can_view_all_orders()
    }

    pub fn can_trade(&self, side: Side) -> bool {
        self.role.can_trade(side)
    }

    pub fn credit(&mut self, amount: Decimal) -> BookResult<Decimal> {
        if amount < Decimal::ZERO {
            return Err(BookError::Balance(format!(
                "credit amount must be non-negative, got {}",
                amount
            )));
        }
        self.balance += amount;
        Ok(self.balance)
    }

    /// Debit the balance. Overdrafts are rejected and leave the balance untouched.
    pub fn debit(&mut self, amount: Decimal) -> BookResult<Decimal> {
        if amount < Decimal::ZERO {
            return Err(BookError::Balance(format!(
                "debit amount must be non-negative, got {}",
                amount
            )));
        }
        if amount > self.balance {
            return Err(BookError::Balance(format!(
                "insufficient balance: required {}, available {}",
                amount, self.balance
            )));
        }
        self.balance -= amount;
        Ok(self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("buyer".parse::<Role>().unwrap(), Role::Buyer);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Bookrunner ".parse::<Role>().unwrap(), Role::Bookrunner);
        assert_eq!(
            "trader".parse::<Role>(),
            Err(BookError::InvalidRole("trader".to_string()))
        );
    }

    #[test]
    fn test_invalid_role_fails_construction() {
        assert!(Participant::from_role_name("market-maker").is_err());

        let investor = Participant::from_role_name("investor").unwrap();
        assert_eq!(investor.role(), Role::Investor);
        assert_eq!(investor.balance(), Decimal::ZERO);
    }

    #[test]
    fn test_order_visibility() {
        for role in Role::ALL {
            let expected = matches!(role, Role::Admin | Role::Bookrunner | Role::Issuer);
            assert_eq!(role.can_view_all_orders(), expected, "{}", role);
        }
    }

    #[test]
    fn test_trading_permissions() {
        assert!(Role::Buyer.can_trade(Side::Buy));
        assert!(!Role::Buyer.can_trade(Side::Sell));
        assert!(Role::Seller.can_trade(Side::Sell));
        assert!(!Role::Seller.can_trade(Side::Buy));
        assert!(Role::Investor.can_trade(Side::Buy));
        assert!(Role::Investor.can_trade(Side::Sell));
        assert!(Role::Issuer.can_trade(Side::Sell));
        assert!(!Role::Admin.can_trade(Side::Buy));
        assert!(!Role::Bookrunner.can_trade(Side::Sell));
    }

    #[test]
    fn test_balance_operations() {
        let mut investor = Participant::with_balance(Role::Investor, Decimal::from(100));

        assert_eq!(investor.credit(Decimal::from(50)).unwrap(), Decimal::from(150));
        assert_eq!(investor.debit(Decimal::from(120)).unwrap(), Decimal::from(30));

        assert!(investor.debit(Decimal::from(31)).is_err());
        assert!(investor.credit(Decimal::from(-1)).is_err());
        assert_eq!(investor.balance(), Decimal::from(30));
    }
}
