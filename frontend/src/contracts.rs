//! Contract bindings.
//!
//! Solidity interfaces for the ERC-20 tokens and the TimeLockVaultFactory,
//! plus revert payload decoding for simulation failures.

use alloy::sol;
use alloy::sol_types::{Panic, Revert, SolError};

sol! {
    /// Minimal ERC-20 surface used by the UI.
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address recipient, uint256 amount) external returns (bool);
        function transferFrom(address sender, address recipient, uint256 amount) external returns (bool);
    }

    /// Factory holding every vault, indexed per depositor.
    interface ITimeLockVaultFactory {
        function createVaultERC20(address token, uint256 amount, uint256 unlockTime) external returns (uint256);
        function userVaultsLength(address user) external view returns (uint256);
        function userVaults(address user, uint256 index) external view returns (uint256);
        function vaults(uint256 id) external view returns (
            address creator,
            address token,
            uint256 amount,
            uint256 unlockTime,
            bool withdrawn
        );
        function withdraw(uint256 id) external;
    }
}

/// Fallback when a revert carries no payload.
pub const REVERT_WITHOUT_REASON: &str = "Reversión sin motivo específico";

/// Fallback when a revert payload cannot be decoded.
pub const REVERT_UNREADABLE: &str = "Reversión sin detalle legible";

/// Decode `Error(string)` / `Panic(uint256)` revert data into a readable reason.
pub fn revert_reason(data: &[u8]) -> String {
    if data.is_empty() {
        return REVERT_WITHOUT_REASON.to_string();
    }
    if let Ok(revert) = Revert::abi_decode(data) {
        if revert.reason.is_empty() {
            return REVERT_WITHOUT_REASON.to_string();
        }
        return revert.reason;
    }
    if let Ok(panic) = Panic::abi_decode(data) {
        return match panic.kind() {
            Some(kind) => format!("panic: {}", kind),
            None => format!("panic: código {}", panic.code),
        };
    }
    REVERT_UNREADABLE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, U256};
    use alloy::sol_types::SolCall;

    #[test]
    fn decodes_error_string() {
        let data = Revert {
            reason: "Vault is still locked".to_string(),
        }
        .abi_encode();
        assert_eq!(revert_reason(&data), "Vault is still locked");
    }

    #[test]
    fn decodes_panic() {
        let data = Panic { code: U256::from(0x11) }.abi_encode();
        assert!(revert_reason(&data).starts_with("panic: "));
    }

    #[test]
    fn empty_and_unknown_payloads() {
        assert_eq!(revert_reason(&[]), REVERT_WITHOUT_REASON);
        assert_eq!(revert_reason(&[0xde, 0xad, 0xbe, 0xef]), REVERT_UNREADABLE);
    }

    #[test]
    fn selectors_match_deployed_abi() {
        assert_eq!(IERC20::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(IERC20::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(ITimeLockVaultFactory::withdrawCall::SELECTOR, [0x2e, 0x1a, 0x7d, 0x4d]);
    }

    #[test]
    fn create_vault_calldata_layout() {
        let call = ITimeLockVaultFactory::createVaultERC20Call {
            token: address!("e6A57340f0df6E020c1c0a80bC6E13048601f0d4"),
            amount: U256::from(5u64),
            unlockTime: U256::from(1_700_000_000u64),
        };
        let data = call.abi_encode();
        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(&data[..4], &ITimeLockVaultFactory::createVaultERC20Call::SELECTOR);
    }

    #[test]
    fn vault_tuple_decodes_into_named_fields() {
        use alloy::sol_types::SolValue;

        let creator = address!("00000000000000000000000000000000000000aa");
        let token = address!("e6A57340f0df6E020c1c0a80bC6E13048601f0d4");
        let encoded = (
            creator,
            token,
            U256::from(1000u64),
            U256::from(1_700_000_000u64),
            true,
        )
            .abi_encode_params();

        let decoded = ITimeLockVaultFactory::vaultsCall::abi_decode_returns(&encoded).unwrap();
        assert_eq!(decoded.creator, creator);
        assert_eq!(decoded.token, token);
        assert_eq!(decoded.amount, U256::from(1000u64));
        assert_eq!(decoded.unlockTime, U256::from(1_700_000_000u64));
        assert!(decoded.withdrawn);
    }
}
