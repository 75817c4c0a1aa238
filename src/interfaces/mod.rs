//! Abstract interfaces for tinsel components.
//!
//! These traits define the contracts for:
//! - Claim storage (the ledger's system of record)
//! - Day configuration (active day and item of each day)
//! - Roster lookups (student identity)
//! - Outbound mail (claim confirmations)

pub mod claim_store;
pub mod day_store;
pub mod mailer;
pub mod roster_store;

pub use claim_store::{ClaimStore, Result, StorageError};
pub use day_store::DayStore;
pub use mailer::{EmailMessage, MailError, Mailer};
pub use roster_store::RosterStore;
