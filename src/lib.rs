//! Tinsel - claim ledger with live fan-out.
//!
//! Officers at a staffed treat-distribution event search the student
//! roster and record at most one claim per student per event day. Every
//! committed claim is pushed live to all connected officer sessions.

pub mod bus;
pub mod config;
pub mod http;
pub mod interfaces;
pub mod ledger;
pub mod model;
pub mod notify;
pub mod read_model;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod test_utils;
