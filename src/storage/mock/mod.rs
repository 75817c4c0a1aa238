//! Mock storage implementations for testing.

mod claim_store;
mod day_store;
mod roster_store;

pub use claim_store::MockClaimStore;
pub use day_store::MockDayStore;
pub use roster_store::MockRosterStore;
