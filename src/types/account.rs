//! Account-related types for the Rust Transfer Engine
//!
//! This module defines the account holder identity and the balance-carrying
//! account snapshot handed out by the account store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account identifier
///
/// Supports account IDs from 0 to 18,446,744,073,709,551,615
pub type AccountId = u64;

/// Public identity of an account
///
/// This is the `{ id, name, email }` triple embedded in transfer results,
/// notifications and history pages. It never changes after provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHolder {
    pub id: AccountId,
    pub name: String,
    pub email: String,
}

/// Snapshot of an account
///
/// Returned by read-side queries. The balance is the last committed value
/// at the time of the read; it may be stale as soon as it is returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// Identity of the account owner
    #[serde(flatten)]
    pub holder: AccountHolder,

    /// Committed balance, fixed-point with 2 fractional digits
    ///
    /// Never negative outside an in-flight unit of work.
    pub balance: Decimal,
}

impl Account {
    /// The account identifier
    pub fn id(&self) -> AccountId {
        self.holder.id
    }
}

/// Provisioning request for a new account
///
/// Accounts are created outside the transfer path (seeding, tests) and are
/// never deleted by the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewAccount {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub balance: Decimal,
}

impl NewAccount {
    /// Create a provisioning request
    pub fn new(id: AccountId, name: &str, email: &str, balance: Decimal) -> Self {
        NewAccount {
            id,
            name: name.to_string(),
            email: email.to_string(),
            balance,
        }
    }

    /// Split into the immutable holder identity and the opening balance
    pub fn into_parts(self) -> (AccountHolder, Decimal) {
        (
            AccountHolder {
                id: self.id,
                name: self.name,
                email: self.email,
            },
            self.balance,
        )
    }
}
