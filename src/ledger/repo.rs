use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::entity::{Account, LedgerEntry, NewLedgerEntry};
use super::error::LedgerError;
use super::store::{LedgerSession, LedgerStore};
use crate::database::models::activity::{ActivityRow, ACTIVITY_COLUMNS};
use crate::database::pagination::{Page, PageRequest};

/// Ledger persistence on the `users.token_balance` column and the
/// `token_activities` table
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub struct PgLedgerSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Session = PgLedgerSession;

    async fn begin(&self) -> Result<Self::Session, LedgerError> {
        let tx = self.pool.begin().await?;
        Ok(PgLedgerSession { tx })
    }

    async fn list_entries(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, LedgerError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM token_activities WHERE user_id = $1")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM token_activities WHERE user_id = $1 \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(account_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total))
    }

    async fn find_entry(
        &self,
        account_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM token_activities WHERE id = $1 AND user_id = $2"
        );
        let row = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(entry_id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LedgerEntry::try_from).transpose()
    }
}

#[async_trait]
impl LedgerSession for PgLedgerSession {
    async fn lock_account(&mut self, account_id: Uuid) -> Result<Option<Account>, LedgerError> {
        let row: Option<(Uuid, i64)> =
            sqlx::query_as("SELECT id, token_balance FROM users WHERE id = $1 FOR UPDATE")
                .bind(account_id)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(row.map(|(id, balance)| Account { id, balance }))
    }

    async fn entry_account(&mut self, entry_id: Uuid) -> Result<Option<Uuid>, LedgerError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM token_activities WHERE id = $1")
            .bind(entry_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|(user_id,)| user_id))
    }

    async fn lock_entry(&mut self, entry_id: Uuid) -> Result<Option<LedgerEntry>, LedgerError> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM token_activities WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(entry_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(LedgerEntry::try_from).transpose()
    }

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, LedgerError> {
        let sql = format!(
            "INSERT INTO token_activities (id, user_id, activity_type, amount, description) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ACTIVITY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(entry.id)
            .bind(entry.account_id)
            .bind(entry.kind.as_str())
            .bind(entry.amount)
            .bind(&entry.description)
            .fetch_one(&mut *self.tx)
            .await?;

        LedgerEntry::try_from(row)
    }

    async fn delete_entry(&mut self, entry_id: Uuid) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM token_activities WHERE id = $1")
            .bind(entry_id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::EntryNotFound(entry_id));
        }
        Ok(())
    }

    async fn set_balance(&mut self, account_id: Uuid, balance: i64) -> Result<(), LedgerError> {
        let result =
            sqlx::query("UPDATE users SET token_balance = $2, updated_at = NOW() WHERE id = $1")
                .bind(account_id)
                .bind(balance)
                .execute(&mut *self.tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::AccountNotFound(account_id));
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), LedgerError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), LedgerError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
