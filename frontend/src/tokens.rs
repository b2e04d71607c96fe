//! Supported token registry.
//!
//! Single source of truth for the tokens the UI knows about by address.

use alloy::primitives::Address;

use crate::config::{CCOP_ADDRESS, CELO_TOKEN_ADDRESS, NATIVE_SYMBOL};

/// Token metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenInfo {
    pub address: Address,
    /// Token symbol (e.g., "cCOP")
    pub symbol: &'static str,
    pub decimals: u8,
    /// Label used in the vault list
    pub label: &'static str,
}

/// Colombian peso stablecoin; the token vaults are created with.
pub const CCOP: TokenInfo = TokenInfo {
    address: CCOP_ADDRESS,
    symbol: "cCOP",
    decimals: 18,
    label: "COP$ (cCOP)",
};

pub const CELO: TokenInfo = TokenInfo {
    address: CELO_TOKEN_ADDRESS,
    symbol: NATIVE_SYMBOL,
    decimals: 18,
    label: NATIVE_SYMBOL,
};

pub const TOKENS: [TokenInfo; 2] = [CCOP, CELO];

pub fn token_by_address(address: Address) -> Option<TokenInfo> {
    TOKENS.iter().copied().find(|t| t.address == address)
}

/// Display label for a vault token.
///
/// The zero address denotes native CELO; cCOP gets its peso label; anything
/// else shows its on-chain symbol, or the address when no symbol is known.
pub fn display_label(token: Address, symbol: Option<&str>) -> String {
    if token == Address::ZERO {
        return NATIVE_SYMBOL.to_string();
    }
    if token == CCOP.address {
        return CCOP.label.to_string();
    }
    match symbol {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => token.to_string(),
    }
}
