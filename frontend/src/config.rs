//! Application configuration.
//!
//! Deployment constants for the vault frontend. The factory and the cCOP
//! token live on Celo Alfajores; everything here is baked in at compile time.

use std::time::Duration;

use alloy::primitives::{address, Address};

/// Application name, shown in the page title.
pub const APP_NAME: &str = "Bóvedas de Transparencia";

// =============================================================================
// Chain
// =============================================================================

/// Celo Alfajores chain id.
pub const CHAIN_ID: u64 = 44787;

/// Human readable chain name (used by `wallet_addEthereumChain`).
pub const CHAIN_NAME: &str = "Celo Alfajores Testnet";

/// Native currency symbol.
pub const NATIVE_SYMBOL: &str = "CELO";

/// Native currency decimals.
pub const NATIVE_DECIMALS: u8 = 18;

/// Block explorer base URL.
pub const EXPLORER_URL: &str = "https://celo-alfajores.blockscout.com";

/// Default RPC endpoint, used for balance reads.
pub const DEFAULT_RPC: &str = "https://alfajores-forno.celo-testnet.org";

/// Forno RPC endpoint, used for vault reads, simulations and gas estimation.
pub const FORNO_RPC: &str = "https://alfajores-forno.celo-testnet.org";

// =============================================================================
// Contracts
// =============================================================================

/// TimeLockVaultFactory deployment.
pub const FACTORY_ADDRESS: Address = address!("6Dcbd404e62151Bea13e3670b231F5846AB1dA97");

/// cCOP token on Alfajores.
pub const CCOP_ADDRESS: Address = address!("e6A57340f0df6E020c1c0a80bC6E13048601f0d4");

/// CELO ERC-20 wrapper address on Alfajores.
pub const CELO_TOKEN_ADDRESS: Address = address!("471ece3750da237f93b8e339c536989b8978a438");

// =============================================================================
// Polling & transactions
// =============================================================================

/// How often the connected account's balance and vaults are refreshed.
pub const BALANCE_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Delay between `eth_getTransactionReceipt` polls.
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Receipt polls before giving up (about two minutes).
pub const RECEIPT_POLL_ATTEMPTS: u32 = 60;

/// Gas limit sent with a withdrawal, as a percentage of the estimate.
pub const GAS_BUFFER_PERCENT: u64 = 110;

// =============================================================================
// Display
// =============================================================================

/// Fractional digits shown for the header balance.
pub const BALANCE_DISPLAY_DECIMALS: usize = 4;

/// Maximum activity entries kept in memory.
pub const MAX_LOG_ENTRIES: usize = 100;

/// `0x`-prefixed hex chain id, as wallets expect it.
pub fn chain_id_hex() -> String {
    format!("{:#x}", CHAIN_ID)
}
