pub mod entity;
pub mod error;
pub mod repo;
pub mod service;
pub mod store;

pub use entity::{Account, ActivityKind, LedgerEntry, NewLedgerEntry};
pub use error::LedgerError;
pub use repo::PgLedgerStore;
pub use service::LedgerService;
pub use store::{LedgerSession, LedgerStore};
