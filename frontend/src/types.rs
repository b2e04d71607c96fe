//! Common types used across the frontend application.
//!
//! # Categories
//!
//! - **Vault Types** - On-chain vault records as displayed by the UI
//! - **Balance Types** - ERC-20 balances
//! - **Log Types** - Activity feed shown under the forms
//! - **Error Types** - Frontend error handling

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::tokens::display_label;
use crate::units::{format_fixed, format_units};

// =============================================================================
// Vault Types
// =============================================================================

/// A vault as stored by the factory, enriched with its token metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Vault {
    /// Factory-assigned id
    pub id: U256,
    /// Depositor; the only account allowed to withdraw
    pub creator: Address,
    /// Locked ERC-20 token
    pub token: Address,
    /// Locked amount in base units
    pub amount: U256,
    /// Unix timestamp (seconds) after which withdrawal is allowed
    pub unlock_time: u64,
    /// Whether the funds were already withdrawn
    pub withdrawn: bool,
    /// Token symbol, `"TOKEN"` when the token could not be queried
    pub symbol: String,
    /// Token decimals, 18 when the token could not be queried
    pub decimals: u8,
}

impl Vault {
    /// Addresses compare by bytes, so checksum casing never matters here.
    pub fn is_owned_by(&self, account: Address) -> bool {
        self.creator == account
    }

    pub fn is_unlocked(&self, now_secs: u64) -> bool {
        self.unlock_time <= now_secs
    }

    /// Whether the withdraw button should be offered to `account`.
    pub fn can_withdraw(&self, account: Address, now_secs: u64) -> bool {
        !self.withdrawn && self.is_unlocked(now_secs) && self.is_owned_by(account)
    }

    /// Token label for display (`CELO`, `COP$ (cCOP)`, symbol or address).
    pub fn token_label(&self) -> String {
        display_label(self.token, Some(&self.symbol))
    }

    pub fn formatted_amount(&self) -> String {
        if self.decimals == 0 {
            self.amount.to_string()
        } else {
            format_units(self.amount, self.decimals)
        }
    }

    /// Unlock time rendered in the browser's local time zone.
    pub fn unlock_date(&self) -> String {
        i64::try_from(self.unlock_time)
            .ok()
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|utc| {
                utc.with_timezone(&chrono::Local)
                    .format("%d/%m/%Y %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| self.unlock_time.to_string())
    }

    pub fn status_label(&self) -> &'static str {
        if self.withdrawn {
            "Retirado"
        } else {
            "En custodia"
        }
    }
}

// =============================================================================
// Balance Types
// =============================================================================

/// ERC-20 balance of the connected account.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenBalance {
    pub raw: U256,
    pub decimals: u8,
    pub symbol: String,
}

impl TokenBalance {
    /// Exact amount, trailing zeros trimmed.
    pub fn formatted(&self) -> String {
        format_units(self.raw, self.decimals)
    }

    /// Amount truncated to `places` fractional digits.
    pub fn display(&self, places: usize) -> String {
        format_fixed(self.raw, self.decimals, places)
    }
}

// =============================================================================
// Log Types
// =============================================================================

/// Activity severity level.
#[derive(Clone, Debug, PartialEq)]
pub enum LogLevel {
    Info,
    Success,
    Error,
    Warning,
}

impl LogLevel {
    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Error => "log-error",
            LogLevel::Warning => "log-warning",
        }
    }

    /// Get emoji prefix for display.
    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Info => "ℹ️",
            LogLevel::Success => "✅",
            LogLevel::Error => "❌",
            LogLevel::Warning => "⚠️",
        }
    }
}

/// A single entry in the activity feed.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Timestamp string (HH:MM:SS)
    pub timestamp: String,
}

impl LogEntry {
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
///
/// `Clone` so errors can be stored in signals.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AppError {
    /// No injected EIP-1193 provider.
    #[error("No se encontró una wallet compatible. Instala MetaMask u otra wallet.")]
    WalletMissing,

    /// The user dismissed the wallet prompt.
    #[error("Solicitud rechazada en la wallet")]
    UserRejected,

    /// Wallet provider error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// JSON-RPC error returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The contract reverted (during simulation or on-chain).
    #[error("{0}")]
    Reverted(String),

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Unexpected payload from the node or the wallet.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid user input.
    #[error("{0}")]
    Validation(String),

    /// The connected account did not create the vault.
    #[error("Solo el responsable designado puede retirar esta bóveda.")]
    NotOwner,

    /// The unlock time has not been reached.
    #[error("Aún no ha llegado el tiempo de desbloqueo definido en el contrato.")]
    StillLocked { unlock_time: u64 },

    #[error("La bóveda ya fue retirada.")]
    AlreadyWithdrawn,

    /// A transaction was submitted but no receipt appeared in time.
    #[error("Sin confirmación para la transacción {0}")]
    ReceiptTimeout(String),
}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn vault(withdrawn: bool, unlock_time: u64) -> Vault {
        Vault {
            id: U256::from(7),
            creator: address!("00000000000000000000000000000000000000aa"),
            token: crate::config::CCOP_ADDRESS,
            amount: U256::from(1_500_000_000_000_000_000u128),
            unlock_time,
            withdrawn,
            symbol: "cCOP".to_string(),
            decimals: 18,
        }
    }

    #[test]
    fn withdraw_requires_owner_unlock_and_custody() {
        let owner = address!("00000000000000000000000000000000000000aa");
        let stranger = address!("00000000000000000000000000000000000000bb");

        assert!(vault(false, 100).can_withdraw(owner, 100));
        assert!(!vault(false, 101).can_withdraw(owner, 100));
        assert!(!vault(true, 100).can_withdraw(owner, 200));
        assert!(!vault(false, 100).can_withdraw(stranger, 200));
    }

    #[test]
    fn vault_display_helpers() {
        let v = vault(false, 0);
        assert_eq!(v.formatted_amount(), "1.5");
        assert_eq!(v.token_label(), "COP$ (cCOP)");
        assert_eq!(v.status_label(), "En custodia");
        assert_eq!(vault(true, 0).status_label(), "Retirado");
    }

    #[test]
    fn zero_decimals_show_raw_amount() {
        let mut v = vault(false, 0);
        v.decimals = 0;
        v.amount = U256::from(42);
        assert_eq!(v.formatted_amount(), "42");
    }

    #[test]
    fn balance_display_is_truncated() {
        let balance = TokenBalance {
            raw: U256::from(12_345_678_900_000_000_000u128),
            decimals: 18,
            symbol: "cCOP".to_string(),
        };
        assert_eq!(balance.formatted(), "12.3456789");
        assert_eq!(balance.display(4), "12.3456");
    }

    #[test]
    fn log_level_classes() {
        assert_eq!(LogLevel::Error.css_class(), "log-error");
        assert_eq!(LogLevel::Success.emoji(), "✅");
    }
}
