use async_trait::async_trait;
use uuid::Uuid;

use super::entity::{Account, LedgerEntry, NewLedgerEntry};
use super::error::LedgerError;
use crate::database::pagination::{Page, PageRequest};

/// Persistence seam of the ledger. Every mutation happens inside a session
/// obtained from `begin`, which is committed or rolled back exactly once.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Session: LedgerSession;

    async fn begin(&self) -> Result<Self::Session, LedgerError>;

    async fn list_entries(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, LedgerError>;

    async fn find_entry(
        &self,
        account_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError>;
}

/// A single unit of work. Dropping a session without committing discards it.
#[async_trait]
pub trait LedgerSession: Send {
    /// Load the account and hold it until the session ends
    async fn lock_account(&mut self, account_id: Uuid) -> Result<Option<Account>, LedgerError>;

    /// Owning account of an entry, read without taking a lock
    async fn entry_account(&mut self, entry_id: Uuid) -> Result<Option<Uuid>, LedgerError>;

    /// Load the entry and hold it until the session ends
    async fn lock_entry(&mut self, entry_id: Uuid) -> Result<Option<LedgerEntry>, LedgerError>;

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, LedgerError>;

    async fn delete_entry(&mut self, entry_id: Uuid) -> Result<(), LedgerError>;

    async fn set_balance(&mut self, account_id: Uuid, balance: i64) -> Result<(), LedgerError>;

    async fn commit(self) -> Result<(), LedgerError>;

    async fn rollback(self) -> Result<(), LedgerError>;
}
