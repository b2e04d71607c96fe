//! Chain and wallet services.
//!
//! # Services
//!
//! - [`rpc`] - Read-only JSON-RPC client (view calls, dry-runs, receipts)
//! - [`wallet`] - Injected EIP-1193 wallet (accounts, chain switch, signing)
//! - [`vault`] - Vault operations built on the two clients

pub mod rpc;
pub mod wallet;
pub mod vault;

pub use rpc::*;
pub use wallet::*;
pub use vault::*;
