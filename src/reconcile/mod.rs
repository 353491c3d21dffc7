//! Reconciling locally submitted transfers with explorer history and
//! tracking their status.

mod classify;
mod merge;
mod service;
pub mod view;

pub use classify::{classify, status_from_confirmations, CONFIRMATION_THRESHOLD};
pub use merge::merge;
pub use service::{TransactionError, TransactionService};
