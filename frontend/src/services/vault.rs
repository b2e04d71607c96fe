//! Vault operations.
//!
//! Each user action is a straight sequence: read → dry-run → sign → submit.
//! The factory enforces ownership, unlock time and balances; the checks here
//! only avoid prompting the wallet for transactions that would revert.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use futures::future::{join, try_join3, try_join_all};

use crate::config::{FACTORY_ADDRESS, GAS_BUFFER_PERCENT, RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL};
use crate::contracts::{IERC20, ITimeLockVaultFactory};
use crate::services::rpc::{RpcClient, TransactionReceipt};
use crate::services::wallet::{InjectedWallet, TransactionRequest};
use crate::tokens::CCOP;
use crate::types::{AppError, AppResult, LogLevel, TokenBalance, Vault};
use crate::units::{parse_duration, parse_units};

/// Symbol shown when a vault token's metadata cannot be read.
pub const FALLBACK_SYMBOL: &str = "TOKEN";

/// Decimals assumed when a vault token's metadata cannot be read.
pub const FALLBACK_DECIMALS: u8 = 18;

/// Current Unix time in seconds, from the browser clock.
pub fn now_secs() -> u64 {
    (js_sys::Date::now() / 1000.0) as u64
}

/// Gas limit with the safety margin applied.
pub fn buffered_gas(estimate: u64) -> u64 {
    estimate.saturating_mul(GAS_BUFFER_PERCENT) / 100
}

/// Unlock timestamp for a vault created now.
pub fn unlock_time(now_secs: u64, duration_secs: u64) -> AppResult<u64> {
    now_secs
        .checked_add(duration_secs)
        .ok_or_else(|| AppError::Validation("Duración demasiado grande".to_string()))
}

/// Client-side preconditions for a withdrawal.
pub fn check_withdrawable(vault: &Vault, account: Address, now_secs: u64) -> AppResult<()> {
    if !vault.is_owned_by(account) {
        return Err(AppError::NotOwner);
    }
    if !vault.is_unlocked(now_secs) {
        return Err(AppError::StillLocked {
            unlock_time: vault.unlock_time,
        });
    }
    if vault.withdrawn {
        return Err(AppError::AlreadyWithdrawn);
    }
    Ok(())
}

fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Indices to query for a `userVaultsLength` of `len`; empty for zero.
pub fn vault_index_range(len: U256) -> std::ops::Range<u64> {
    0..to_u64(len)
}

/// Token symbol and decimals, each falling back on its own when unreadable.
pub fn metadata_or_fallback(
    token: Address,
    symbol: AppResult<String>,
    decimals: AppResult<u8>,
) -> (String, u8) {
    let symbol = symbol.unwrap_or_else(|e| {
        log::warn!("Could not read ERC-20 symbol of {}: {}", token, e);
        FALLBACK_SYMBOL.to_string()
    });
    let decimals = decimals.unwrap_or_else(|e| {
        log::warn!("Could not read ERC-20 decimals of {}: {}", token, e);
        FALLBACK_DECIMALS
    });
    (symbol, decimals)
}

/// An `approve` is sent only when the current allowance cannot cover `amount`.
pub fn needs_approval(allowance: U256, amount: U256) -> bool {
    allowance < amount
}

/// A mined receipt with status 0 is a revert.
pub fn receipt_outcome(receipt: TransactionReceipt, hash: &str) -> AppResult<TransactionReceipt> {
    if receipt.succeeded() {
        Ok(receipt)
    } else {
        Err(AppError::Reverted(format!("La transacción {} fue revertida", hash)))
    }
}

/// Vault service sharing the read clients between components.
#[derive(Debug, Clone)]
pub struct VaultService {
    /// Balance reads and vault-creation dry-runs
    public: RpcClient,
    /// Vault reads, withdraw dry-runs and gas estimation
    forno: RpcClient,
}

impl Default for VaultService {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultService {
    pub fn new() -> Self {
        Self {
            public: RpcClient::public(),
            forno: RpcClient::forno(),
        }
    }

    /// cCOP balance, decimals and symbol of `account`.
    pub async fn token_balance(&self, account: Address) -> AppResult<TokenBalance> {
        let (raw, decimals, symbol) = try_join3(
            self.public.read(CCOP.address, &IERC20::balanceOfCall { account }),
            self.public.read(CCOP.address, &IERC20::decimalsCall {}),
            self.public.read(CCOP.address, &IERC20::symbolCall {}),
        )
        .await?;

        Ok(TokenBalance { raw, decimals, symbol })
    }

    /// Symbol and decimals of a vault token, with per-field fallbacks.
    async fn token_metadata(&self, token: Address) -> (String, u8) {
        let (symbol, decimals) = join(
            self.forno.read(token, &IERC20::symbolCall {}),
            self.forno.read(token, &IERC20::decimalsCall {}),
        )
        .await;

        metadata_or_fallback(token, symbol, decimals)
    }

    async fn load_vault(&self, id: U256) -> AppResult<Vault> {
        let record = self
            .forno
            .read(FACTORY_ADDRESS, &ITimeLockVaultFactory::vaultsCall { id })
            .await?;
        let (symbol, decimals) = self.token_metadata(record.token).await;

        Ok(Vault {
            id,
            creator: record.creator,
            token: record.token,
            amount: record.amount,
            unlock_time: to_u64(record.unlockTime),
            withdrawn: record.withdrawn,
            symbol,
            decimals,
        })
    }

    /// Every vault created by `account`, in factory order.
    pub async fn list_vaults(&self, account: Address) -> AppResult<Vec<Vault>> {
        let len = self
            .forno
            .read(
                FACTORY_ADDRESS,
                &ITimeLockVaultFactory::userVaultsLengthCall { user: account },
            )
            .await?;

        let indices = vault_index_range(len);
        if indices.is_empty() {
            return Ok(Vec::new());
        }
        log::debug!("{} vaults registered for {}", indices.end, account);

        let ids = try_join_all(indices.map(|i| async move {
            let call = ITimeLockVaultFactory::userVaultsCall {
                user: account,
                index: U256::from(i),
            };
            self.forno.read(FACTORY_ADDRESS, &call).await
        }))
        .await?;

        try_join_all(ids.into_iter().map(|id| self.load_vault(id))).await
    }

    /// Approve the factory for `amount` cCOP when the current allowance is short.
    async fn ensure_allowance(
        &self,
        account: Address,
        amount: U256,
        notify: &dyn Fn(LogLevel, String),
    ) -> AppResult<()> {
        let allowance = self
            .public
            .read(
                CCOP.address,
                &IERC20::allowanceCall {
                    owner: account,
                    spender: FACTORY_ADDRESS,
                },
            )
            .await?;

        if !needs_approval(allowance, amount) {
            return Ok(());
        }

        notify(
            LogLevel::Info,
            format!("Autorizando a la fábrica a usar {}...", CCOP.symbol),
        );
        let approve = IERC20::approveCall {
            spender: FACTORY_ADDRESS,
            amount,
        };
        let tx = TransactionRequest::new(account, CCOP.address, approve.abi_encode());
        let hash = InjectedWallet::send_transaction(&tx).await?;
        notify(LogLevel::Info, format!("Aprobación enviada: {}", hash));

        self.wait_for_receipt(&hash).await?;
        notify(LogLevel::Success, "Aprobación confirmada".to_string());
        Ok(())
    }

    /// Lock `amount` cCOP for `duration` seconds. Returns the transaction hash.
    pub async fn create_vault(
        &self,
        account: Address,
        amount: &str,
        duration: &str,
        notify: &dyn Fn(LogLevel, String),
    ) -> AppResult<String> {
        if amount.trim().is_empty() || duration.trim().is_empty() {
            return Err(AppError::Validation("Debes ingresar monto y duración".to_string()));
        }
        let parsed_amount = parse_units(amount, CCOP.decimals)?;
        let parsed_duration = parse_duration(duration)?;

        InjectedWallet::ensure_chain().await?;

        let unlock = unlock_time(now_secs(), parsed_duration)?;
        log::info!(
            "🔒 Creating vault: {} base units of {} until {}",
            parsed_amount,
            CCOP.symbol,
            unlock
        );

        self.ensure_allowance(account, parsed_amount, notify).await?;

        let call = ITimeLockVaultFactory::createVaultERC20Call {
            token: CCOP.address,
            amount: parsed_amount,
            unlockTime: U256::from(unlock),
        };

        // Dry-run: a revert here never reaches the wallet
        let vault_id = self
            .public
            .simulate(Some(account), FACTORY_ADDRESS, &call)
            .await?;
        log::info!("🧪 Simulation ok, vault id would be {}", vault_id);

        let tx = TransactionRequest::new(account, FACTORY_ADDRESS, call.abi_encode());
        let hash = InjectedWallet::send_transaction(&tx).await?;
        log::info!("📤 Vault creation sent: {}", hash);
        Ok(hash)
    }

    /// Withdraw an unlocked vault owned by `account`. Returns the transaction hash.
    pub async fn withdraw(&self, account: Address, vault: &Vault, now_secs: u64) -> AppResult<String> {
        check_withdrawable(vault, account, now_secs)?;

        InjectedWallet::ensure_chain().await?;

        let call = ITimeLockVaultFactory::withdrawCall { id: vault.id };
        let data = call.abi_encode();

        self.forno
            .simulate(Some(account), FACTORY_ADDRESS, &call)
            .await?;

        let gas = self.forno.estimate_gas(account, FACTORY_ADDRESS, &data).await?;
        let gas_price = self.forno.gas_price().await?;
        let gas_price = u128::try_from(gas_price)
            .map_err(|_| AppError::Decode(format!("gas price out of range: {}", gas_price)))?;

        let tx = TransactionRequest::new(account, FACTORY_ADDRESS, data)
            .with_gas(buffered_gas(gas))
            .with_gas_price(gas_price);
        let hash = InjectedWallet::send_transaction(&tx).await?;
        log::info!("✅ Withdrawal sent: {}", hash);
        Ok(hash)
    }

    /// Withdraw and wait for the receipt, so callers keep the vault marked
    /// as in flight until the transaction is settled. `on_sent` receives the
    /// hash as soon as the wallet returns it.
    pub async fn withdraw_confirmed(
        &self,
        account: Address,
        vault: &Vault,
        now_secs: u64,
        on_sent: &dyn Fn(&str),
    ) -> AppResult<TransactionReceipt> {
        let hash = self.withdraw(account, vault, now_secs).await?;
        on_sent(&hash);
        self.wait_for_receipt(&hash).await
    }

    /// Poll until the transaction is mined. A reverted receipt is an error.
    pub async fn wait_for_receipt(&self, hash: &str) -> AppResult<TransactionReceipt> {
        for attempt in 0..RECEIPT_POLL_ATTEMPTS {
            match self.forno.transaction_receipt(hash).await {
                Ok(Some(receipt)) => {
                    let receipt = receipt_outcome(receipt, hash)?;
                    log::info!("⛓️ {} mined in block {:?}", hash, receipt.block());
                    return Ok(receipt);
                }
                Ok(None) => {}
                Err(e) => log::warn!("Receipt poll {} for {} failed: {}", attempt, hash, e),
            }
            gloo_timers::future::sleep(RECEIPT_POLL_INTERVAL).await;
        }
        Err(AppError::ReceiptTimeout(hash.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn vault(withdrawn: bool, unlock_time: u64) -> Vault {
        Vault {
            id: U256::from(3),
            creator: address!("00000000000000000000000000000000000000aa"),
            token: CCOP.address,
            amount: U256::from(10u64),
            unlock_time,
            withdrawn,
            symbol: "cCOP".to_string(),
            decimals: 18,
        }
    }

    #[test]
    fn test_check_withdrawable() {
        let owner = address!("00000000000000000000000000000000000000aa");
        let stranger = address!("00000000000000000000000000000000000000bb");

        assert_eq!(check_withdrawable(&vault(false, 50), owner, 100), Ok(()));
        assert_eq!(check_withdrawable(&vault(false, 100), owner, 100), Ok(()));
        assert_eq!(
            check_withdrawable(&vault(false, 50), stranger, 100),
            Err(AppError::NotOwner)
        );
        assert_eq!(
            check_withdrawable(&vault(false, 150), owner, 100),
            Err(AppError::StillLocked { unlock_time: 150 })
        );
        assert_eq!(
            check_withdrawable(&vault(true, 50), owner, 100),
            Err(AppError::AlreadyWithdrawn)
        );
    }

    #[test]
    fn test_ownership_checked_before_unlock() {
        let stranger = address!("00000000000000000000000000000000000000bb");
        assert_eq!(
            check_withdrawable(&vault(false, 500), stranger, 100),
            Err(AppError::NotOwner)
        );
    }

    #[test]
    fn test_buffered_gas() {
        assert_eq!(buffered_gas(100_000), 110_000);
        assert_eq!(buffered_gas(21_001), 23_101);
        assert_eq!(buffered_gas(0), 0);
    }

    #[test]
    fn test_unlock_time() {
        assert_eq!(unlock_time(1_700_000_000, 86_400).unwrap(), 1_700_086_400);
        assert!(unlock_time(u64::MAX, 1).is_err());
    }

    #[test]
    fn test_metadata_fallback() {
        let token = address!("1111111111111111111111111111111111111111");
        fn failed<T>() -> AppResult<T> {
            Err(AppError::Network("timeout".to_string()))
        }

        assert_eq!(
            metadata_or_fallback(token, Ok("USDC".to_string()), Ok(6)),
            ("USDC".to_string(), 6)
        );
        assert_eq!(
            metadata_or_fallback(token, failed(), failed()),
            (FALLBACK_SYMBOL.to_string(), FALLBACK_DECIMALS)
        );
        assert_eq!(
            metadata_or_fallback(token, Ok("USDC".to_string()), failed()),
            ("USDC".to_string(), 18)
        );
    }

    #[test]
    fn test_empty_vault_index_range() {
        assert!(vault_index_range(U256::ZERO).is_empty());
        assert_eq!(vault_index_range(U256::from(3u64)).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_needs_approval() {
        assert!(needs_approval(U256::ZERO, U256::from(1u64)));
        assert!(needs_approval(U256::from(99u64), U256::from(100u64)));
        assert!(!needs_approval(U256::from(100u64), U256::from(100u64)));
        assert!(!needs_approval(U256::MAX, U256::from(100u64)));
    }

    #[test]
    fn test_receipt_outcome() {
        let mined: TransactionReceipt =
            serde_json::from_str(r#"{"transactionHash":"0xabc","status":"0x1"}"#).unwrap();
        assert_eq!(receipt_outcome(mined.clone(), "0xabc"), Ok(mined));

        let reverted: TransactionReceipt =
            serde_json::from_str(r#"{"transactionHash":"0xabc","status":"0x0"}"#).unwrap();
        assert!(matches!(
            receipt_outcome(reverted, "0xabc"),
            Err(AppError::Reverted(reason)) if reason.contains("0xabc")
        ));
    }

    #[test]
    fn test_create_vault_validates_before_wallet() {
        let service = VaultService::new();
        let account = address!("00000000000000000000000000000000000000aa");
        let quiet = |_: LogLevel, _: String| {};

        for (amount, duration) in [("", "1"), ("10", ""), ("  ", "  "), ("abc", "60"), ("10", "0")] {
            let result = futures::executor::block_on(service.create_vault(account, amount, duration, &quiet));
            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "{:?}/{:?} gave {:?}",
                amount,
                duration,
                result
            );
        }
    }

    #[test]
    fn test_withdraw_confirmed_stops_before_sending() {
        let service = VaultService::new();
        let stranger = address!("00000000000000000000000000000000000000bb");
        let sent = std::cell::Cell::new(false);
        let on_sent = |_: &str| sent.set(true);

        let result = futures::executor::block_on(service.withdraw_confirmed(
            stranger,
            &vault(false, 50),
            100,
            &on_sent,
        ));
        assert_eq!(result, Err(AppError::NotOwner));
        assert!(!sent.get());
    }

    #[test]
    fn test_to_u64_saturates() {
        assert_eq!(to_u64(U256::from(5u64)), 5);
        assert_eq!(to_u64(U256::MAX), u64::MAX);
    }
}
