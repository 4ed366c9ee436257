use uuid::Uuid;

use super::entity::{ActivityKind, LedgerEntry, NewLedgerEntry};
use super::error::LedgerError;
use super::store::{LedgerSession, LedgerStore};
use crate::auth::Admin;
use crate::database::pagination::{Page, PageRequest};

/// Credits, debits and reversals of account balances. Mutations require the
/// `Admin` capability and run inside one store session each.
#[derive(Clone)]
pub struct LedgerService<S> {
    store: S,
}

impl<S: LedgerStore> LedgerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a credit or debit against `account_id` and move its balance
    /// accordingly. A debit may not take the balance below zero.
    pub async fn apply_entry(
        &self,
        admin: &Admin,
        account_id: Uuid,
        kind: &str,
        amount: i64,
        description: impl Into<String>,
    ) -> Result<LedgerEntry, LedgerError> {
        let kind: ActivityKind = kind.parse()?;
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let new_entry = NewLedgerEntry::new(account_id, kind, amount, description.into());

        let mut session = self.store.begin().await?;
        match Self::apply_in(&mut session, new_entry).await {
            Ok(entry) => {
                session.commit().await?;
                tracing::info!(
                    admin = %admin.user_id(),
                    account = %entry.account_id,
                    entry = %entry.id,
                    kind = %entry.kind,
                    amount = entry.amount,
                    "ledger entry applied"
                );
                Ok(entry)
            }
            Err(e) => {
                Self::abandon(session).await;
                Err(e)
            }
        }
    }

    /// Delete an entry and undo its effect on the balance. Reversing a credit
    /// fails if the tokens have already been spent.
    pub async fn reverse_entry(&self, admin: &Admin, entry_id: Uuid) -> Result<(), LedgerError> {
        let mut session = self.store.begin().await?;
        match Self::reverse_in(&mut session, entry_id).await {
            Ok(entry) => {
                session.commit().await?;
                tracing::info!(
                    admin = %admin.user_id(),
                    account = %entry.account_id,
                    entry = %entry.id,
                    kind = %entry.kind,
                    amount = entry.amount,
                    "ledger entry reversed"
                );
                Ok(())
            }
            Err(e) => {
                Self::abandon(session).await;
                Err(e)
            }
        }
    }

    pub async fn list_entries(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, LedgerError> {
        self.store.list_entries(account_id, page).await
    }

    pub async fn find_entry(&self, account_id: Uuid, entry_id: Uuid) -> Result<LedgerEntry, LedgerError> {
        self.store
            .find_entry(account_id, entry_id)
            .await?
            .ok_or(LedgerError::EntryNotFound(entry_id))
    }

    async fn apply_in(
        session: &mut S::Session,
        new_entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, LedgerError> {
        let account = session
            .lock_account(new_entry.account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(new_entry.account_id))?;

        let balance = new_entry.kind.apply(&account, new_entry.amount)?;
        session.set_balance(account.id, balance).await?;
        session.insert_entry(new_entry).await
    }

    // Lock order is account row, then entry row, the same order a user
    // deletion takes when it cascades to the entries.
    async fn reverse_in(session: &mut S::Session, entry_id: Uuid) -> Result<LedgerEntry, LedgerError> {
        let account_id = session
            .entry_account(entry_id)
            .await?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        // A missing account means the user and its entries were deleted meanwhile
        let account = session
            .lock_account(account_id)
            .await?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        let entry = session
            .lock_entry(entry_id)
            .await?
            .filter(|e| e.account_id == account.id)
            .ok_or(LedgerError::EntryNotFound(entry_id))?;

        let balance = entry.kind.reverse(&account, entry.amount)?;
        session.set_balance(account.id, balance).await?;
        session.delete_entry(entry.id).await?;
        Ok(entry)
    }

    async fn abandon(session: S::Session) {
        if let Err(e) = session.rollback().await {
            tracing::error!("Ledger rollback failed: {}", e);
        }
    }
}
