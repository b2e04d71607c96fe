//! UI Components for the vault application.
//!
//! # Layout Components
//! - [`Header`] - Wallet connection and cCOP balance
//! - [`Hero`] - Title and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`VaultCreation`] - Amount/duration form that locks cCOP in a new vault
//! - [`VaultList`] - Vaults of the connected account, with withdrawal
//! - [`ActivityPanel`] - Submitted transactions and their outcome

use alloy::primitives::Address;

mod header;
mod hero;
mod vault_creation;
mod vault_list;
mod footer;
mod activity;

pub use header::*;
pub use hero::*;
pub use vault_creation::*;
pub use vault_list::*;
pub use footer::*;
pub use activity::*;

/// Blocking browser alert, used for failures the user must acknowledge.
pub(crate) fn alert(message: &str) {
    if gloo_utils::window().alert_with_message(message).is_err() {
        log::warn!("alert() unavailable: {}", message);
    }
}

/// Whether a read issued for `requested` still belongs to the connected
/// account. Results that arrive after an account switch are dropped.
pub fn is_current_account(current: Option<Address>, requested: Address) -> bool {
    current == Some(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_stale_account_results_are_dropped() {
        let a = address!("00000000000000000000000000000000000000aa");
        let b = address!("00000000000000000000000000000000000000bb");

        assert!(is_current_account(Some(a), a));
        assert!(!is_current_account(Some(b), a));
        assert!(!is_current_account(None, a));
    }
}
