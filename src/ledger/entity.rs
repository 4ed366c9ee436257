use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityKind {
    Credit,
    Debit,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Credit => "CREDIT",
            ActivityKind::Debit => "DEBIT",
        }
    }

    /// Balance after an entry of this kind is applied
    pub fn apply(&self, account: &Account, amount: i64) -> Result<i64, LedgerError> {
        match self {
            ActivityKind::Credit => account.credited(amount),
            ActivityKind::Debit => account.debited(amount),
        }
    }

    /// Balance after an entry of this kind is undone
    pub fn reverse(&self, account: &Account, amount: i64) -> Result<i64, LedgerError> {
        match self {
            ActivityKind::Credit => account.debited(amount),
            ActivityKind::Debit => account.credited(amount),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(ActivityKind::Credit),
            "DEBIT" => Ok(ActivityKind::Debit),
            other => Err(LedgerError::InvalidKind(other.to_string())),
        }
    }
}

/// Token balance of a single user. The id is the owning user's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub balance: i64,
}

impl Account {
    fn credited(&self, amount: i64) -> Result<i64, LedgerError> {
        self.balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount(amount))
    }

    fn debited(&self, amount: i64) -> Result<i64, LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account_id: self.id,
                balance: self.balance,
                required: amount,
            });
        }
        Ok(self.balance - amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub account_id: Uuid,
    #[serde(rename = "activity_type")]
    pub kind: ActivityKind,
    pub amount: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Validated entry waiting to be persisted
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: ActivityKind,
    pub amount: i64,
    pub description: String,
}

impl NewLedgerEntry {
    pub fn new(account_id: Uuid, kind: ActivityKind, amount: i64, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind,
            amount,
            description,
        }
    }
}
