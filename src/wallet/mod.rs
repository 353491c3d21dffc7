pub mod address;
mod session;
mod transfer;
pub mod units;

pub use session::{WalletError, WalletSession, WalletSnapshot, WalletState};
pub use transfer::{TransferError, TransferForm};
