use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ledger::{LedgerEntry, LedgerError};

pub const ACTIVITY_COLUMNS: &str = "id, user_id, activity_type, amount, description, created_at";

/// Row of `token_activities`, the stored form of a ledger entry
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: String,
    pub amount: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for LedgerEntry {
    type Error = LedgerError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(LedgerEntry {
            id: row.id,
            account_id: row.user_id,
            kind: row.activity_type.parse()?,
            amount: row.amount,
            description: row.description,
            created_at: row.created_at,
        })
    }
}
