use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::database::pagination::{Page, PageRequest};
use crate::ledger::{Account, ActivityKind, LedgerEntry, LedgerError, LedgerSession, LedgerStore, NewLedgerEntry};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    balances: HashMap<Uuid, i64>,
    entries: HashMap<Uuid, LedgerEntry>,
}

/// In-memory ledger store for unit tests. A session holds the whole store
/// locked and works on a staged copy that replaces the state on commit.
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<MemoryState>>,
    fail_next_commit: Arc<AtomicBool>,
}

pub struct MemorySession {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    fail_commit: Arc<AtomicBool>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account with an opening balance, bypassing the ledger
    pub async fn open_account(&self, balance: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.balances.insert(id, balance);
        id
    }

    pub async fn balance(&self, account_id: Uuid) -> Option<i64> {
        self.state.lock().await.balances.get(&account_id).copied()
    }

    pub async fn entry_count(&self, account_id: Uuid) -> usize {
        let state = self.state.lock().await;
        state.entries.values().filter(|e| e.account_id == account_id).count()
    }

    /// Credits minus debits recorded for the account
    pub async fn ledger_sum(&self, account_id: Uuid) -> i64 {
        let state = self.state.lock().await;
        state
            .entries
            .values()
            .filter(|e| e.account_id == account_id)
            .map(|e| match e.kind {
                ActivityKind::Credit => e.amount,
                ActivityKind::Debit => -e.amount,
            })
            .sum()
    }

    /// Drop an account together with its entries, as deleting the user does
    pub async fn close_account(&self, account_id: Uuid) {
        let mut state = self.state.lock().await;
        state.balances.remove(&account_id);
        state.entries.retain(|_, e| e.account_id != account_id);
    }

    /// Make the next commit fail with a storage error
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Session = MemorySession;

    async fn begin(&self) -> Result<Self::Session, LedgerError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemorySession {
            guard,
            staged,
            fail_commit: self.fail_next_commit.clone(),
        })
    }

    async fn list_entries(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, LedgerError> {
        let state = self.state.lock().await;
        let mut entries: Vec<LedgerEntry> = state
            .entries
            .values()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = entries.len() as i64;
        let items = entries
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn find_entry(
        &self,
        account_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .entries
            .get(&entry_id)
            .filter(|e| e.account_id == account_id)
            .cloned())
    }
}

#[async_trait]
impl LedgerSession for MemorySession {
    async fn lock_account(&mut self, account_id: Uuid) -> Result<Option<Account>, LedgerError> {
        Ok(self
            .staged
            .balances
            .get(&account_id)
            .map(|&balance| Account { id: account_id, balance }))
    }

    async fn entry_account(&mut self, entry_id: Uuid) -> Result<Option<Uuid>, LedgerError> {
        Ok(self.staged.entries.get(&entry_id).map(|e| e.account_id))
    }

    async fn lock_entry(&mut self, entry_id: Uuid) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.staged.entries.get(&entry_id).cloned())
    }

    async fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry, LedgerError> {
        let entry = LedgerEntry {
            id: entry.id,
            account_id: entry.account_id,
            kind: entry.kind,
            amount: entry.amount,
            description: entry.description,
            created_at: Utc::now(),
        };
        self.staged.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn delete_entry(&mut self, entry_id: Uuid) -> Result<(), LedgerError> {
        self.staged
            .entries
            .remove(&entry_id)
            .map(|_| ())
            .ok_or(LedgerError::EntryNotFound(entry_id))
    }

    async fn set_balance(&mut self, account_id: Uuid, balance: i64) -> Result<(), LedgerError> {
        match self.staged.balances.get_mut(&account_id) {
            Some(current) => {
                *current = balance;
                Ok(())
            }
            None => Err(LedgerError::AccountNotFound(account_id)),
        }
    }

    async fn commit(self) -> Result<(), LedgerError> {
        let MemorySession { mut guard, staged, fail_commit } = self;
        if fail_commit.swap(false, Ordering::SeqCst) {
            return Err(LedgerError::StorageFailure(sqlx::Error::PoolClosed));
        }
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), LedgerError> {
        Ok(())
    }
}
