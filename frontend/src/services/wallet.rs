//! Injected wallet (EIP-1193) wrapper.
//!
//! MetaMask, Valora and friends expose `window.ethereum`; every signing
//! request goes through its `request({ method, params })` entry point.

use alloy::primitives::{Address, Bytes};
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::config::{
    chain_id_hex, CHAIN_ID, CHAIN_NAME, EXPLORER_URL, FORNO_RPC, NATIVE_DECIMALS, NATIVE_SYMBOL,
};
use crate::services::rpc::parse_quantity;
use crate::types::{AppError, AppResult};

/// User rejected the request.
pub const USER_REJECTED: i64 = 4001;

/// The wallet does not know the requested chain.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// Error thrown by the provider: `{ code, message }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    fn from_js(err: JsValue) -> Self {
        let code = Reflect::get(&err, &JsValue::from_str("code"))
            .ok()
            .and_then(|v| v.as_f64())
            .map(|c| c as i64);
        let message = Reflect::get(&err, &JsValue::from_str("message"))
            .ok()
            .and_then(|v| v.as_string())
            .or_else(|| err.as_string())
            .unwrap_or_else(|| "Unknown wallet error".to_string());
        Self { code, message }
    }

    fn local(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err.code {
            Some(USER_REJECTED) => AppError::UserRejected,
            Some(code) => AppError::Wallet(format!("{} (code {})", err.message, code)),
            None => AppError::Wallet(err.message),
        }
    }
}

/// Transaction handed to `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    /// Gas limit; the wallet estimates when absent
    pub gas: Option<u64>,
    /// Legacy gas price in wei; the wallet picks one when absent
    pub gas_price: Option<u128>,
}

impl TransactionRequest {
    pub fn new(from: Address, to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from,
            to,
            data: data.into(),
            gas: None,
            gas_price: None,
        }
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// Wire form: addresses and data as hex strings, quantities as `0x` hex.
    pub fn to_json(&self) -> Value {
        let mut obj = json!({
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "data": self.data.to_string(),
        });
        if let Some(gas) = self.gas {
            obj["gas"] = Value::String(format!("{:#x}", gas));
        }
        if let Some(price) = self.gas_price {
            obj["gasPrice"] = Value::String(format!("{:#x}", price));
        }
        obj
    }
}

/// `wallet_addEthereumChain` parameters for the configured network.
pub fn add_chain_params() -> Value {
    json!({
        "chainId": chain_id_hex(),
        "chainName": CHAIN_NAME,
        "nativeCurrency": {
            "name": NATIVE_SYMBOL,
            "symbol": NATIVE_SYMBOL,
            "decimals": NATIVE_DECIMALS,
        },
        "rpcUrls": [FORNO_RPC],
        "blockExplorerUrls": [EXPLORER_URL],
    })
}

/// Parse the account list returned by `eth_requestAccounts` / `eth_accounts`.
pub fn parse_accounts(raw: &[String]) -> AppResult<Vec<Address>> {
    raw.iter()
        .map(|a| {
            a.parse::<Address>()
                .map_err(|e| AppError::Decode(format!("invalid account {}: {}", a, e)))
        })
        .collect()
}

/// Wrapper around the injected provider.
pub struct InjectedWallet;

impl InjectedWallet {
    fn provider() -> Option<JsValue> {
        let window = gloo_utils::window();
        Reflect::get(&window, &JsValue::from_str("ethereum"))
            .ok()
            .filter(|v| !v.is_null() && !v.is_undefined())
    }

    /// Checks whether an EIP-1193 provider is injected.
    pub fn is_available() -> bool {
        let available = Self::provider().is_some();
        if !available {
            log::warn!("⚠️  No injected wallet found");
        }
        available
    }

    /// Raw `request({ method, params })`.
    async fn request(method: &str, params: Value) -> Result<JsValue, ProviderError> {
        let provider = Self::provider().ok_or_else(|| ProviderError::local("window.ethereum missing"))?;

        let params = params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ProviderError::local(format!("Failed to encode params: {}", e)))?;

        let args = Object::new();
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .map_err(ProviderError::from_js)?;
        Reflect::set(&args, &JsValue::from_str("params"), &params).map_err(ProviderError::from_js)?;

        let request_fn: Function = Reflect::get(&provider, &JsValue::from_str("request"))
            .map_err(ProviderError::from_js)?
            .dyn_into()
            .map_err(|_| ProviderError::local("provider.request is not a function"))?;

        let promise: Promise = request_fn
            .call1(&provider, &args)
            .map_err(ProviderError::from_js)?
            .dyn_into()
            .map_err(|_| ProviderError::local("provider.request did not return a Promise"))?;

        JsFuture::from(promise).await.map_err(ProviderError::from_js)
    }

    async fn request_app(method: &str, params: Value) -> AppResult<JsValue> {
        if Self::provider().is_none() {
            return Err(AppError::WalletMissing);
        }
        Ok(Self::request(method, params).await?)
    }

    async fn account_list(method: &str) -> AppResult<Vec<Address>> {
        let result = Self::request_app(method, json!([])).await?;
        let raw: Vec<String> = serde_wasm_bindgen::from_value(result)
            .map_err(|e| AppError::Decode(format!("Failed to parse accounts: {}", e)))?;
        parse_accounts(&raw)
    }

    /// Prompts the user and returns the first authorized account.
    pub async fn connect() -> AppResult<Address> {
        log::info!("🔌 Connecting to wallet...");
        let account = Self::account_list("eth_requestAccounts")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Wallet("The wallet returned no accounts".to_string()))?;
        log::info!("✅ Connected to wallet: {}", account);
        Ok(account)
    }

    /// Already authorized accounts; never prompts.
    pub async fn accounts() -> AppResult<Vec<Address>> {
        Self::account_list("eth_accounts").await
    }

    pub async fn chain_id() -> AppResult<u64> {
        let result = Self::request_app("eth_chainId", json!([])).await?;
        let hex = result
            .as_string()
            .ok_or_else(|| AppError::Decode("eth_chainId returned a non-string".to_string()))?;
        let id = parse_quantity(&hex)?;
        u64::try_from(id).map_err(|_| AppError::Decode(format!("chain id out of range: {}", hex)))
    }

    /// Switch the wallet to the configured chain, adding it when unknown.
    pub async fn ensure_chain() -> AppResult<()> {
        let current = Self::chain_id().await?;
        if current == CHAIN_ID {
            return Ok(());
        }

        log::info!("🔀 Switching wallet from chain {} to {}", current, CHAIN_ID);
        let switch = Self::request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": chain_id_hex() }]),
        )
        .await;

        match switch {
            Ok(_) => Ok(()),
            Err(err) if err.code == Some(UNRECOGNIZED_CHAIN) => {
                log::info!("➕ Chain unknown to the wallet, adding {}", CHAIN_NAME);
                Self::request("wallet_addEthereumChain", json!([add_chain_params()])).await?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Ask the wallet to sign and broadcast; returns the transaction hash.
    pub async fn send_transaction(tx: &TransactionRequest) -> AppResult<String> {
        let result = Self::request_app("eth_sendTransaction", json!([tx.to_json()])).await?;
        result
            .as_string()
            .ok_or_else(|| AppError::Decode("eth_sendTransaction returned a non-string".to_string()))
    }

    fn subscribe(event: &str, handler: Closure<dyn FnMut(JsValue)>) {
        let Some(provider) = Self::provider() else {
            return;
        };
        let on = Reflect::get(&provider, &JsValue::from_str("on"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok());

        match on {
            Some(on) => {
                if let Err(e) = on.call2(&provider, &JsValue::from_str(event), handler.as_ref()) {
                    log::warn!("Failed to subscribe to {}: {:?}", event, e);
                }
                // The listener lives for the whole page
                handler.forget();
            }
            None => log::warn!("Provider does not support events"),
        }
    }

    /// Called with the new account list whenever the user switches accounts.
    pub fn on_accounts_changed(mut callback: impl FnMut(Vec<Address>) + 'static) {
        let handler = Closure::wrap(Box::new(move |value: JsValue| {
            let raw: Vec<String> = serde_wasm_bindgen::from_value(value).unwrap_or_default();
            match parse_accounts(&raw) {
                Ok(accounts) => callback(accounts),
                Err(e) => log::warn!("Ignoring accountsChanged: {}", e),
            }
        }) as Box<dyn FnMut(JsValue)>);
        Self::subscribe("accountsChanged", handler);
    }

    /// Called with the new chain id whenever the wallet changes network.
    pub fn on_chain_changed(mut callback: impl FnMut(u64) + 'static) {
        let handler = Closure::wrap(Box::new(move |value: JsValue| {
            let parsed = value
                .as_string()
                .and_then(|hex| parse_quantity(&hex).ok())
                .and_then(|id| u64::try_from(id).ok());
            match parsed {
                Some(id) => callback(id),
                None => log::warn!("Ignoring chainChanged: {:?}", value),
            }
        }) as Box<dyn FnMut(JsValue)>);
        Self::subscribe("chainChanged", handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_transaction_request_json() {
        let from = address!("00000000000000000000000000000000000000aa");
        let to = address!("6Dcbd404e62151Bea13e3670b231F5846AB1dA97");
        let tx = TransactionRequest::new(from, to, vec![0x2e, 0x1a, 0x7d, 0x4d])
            .with_gas(55_000)
            .with_gas_price(25_000_000_000);

        let json = tx.to_json();
        assert_eq!(json["from"], from.to_string());
        assert_eq!(json["to"], to.to_string());
        assert_eq!(json["data"], "0x2e1a7d4d");
        assert_eq!(json["gas"], "0xd6d8");
        assert_eq!(json["gasPrice"], "0x5d21dba00");
    }

    #[test]
    fn test_transaction_request_without_gas() {
        let tx = TransactionRequest::new(Address::ZERO, Address::ZERO, Bytes::new());
        let json = tx.to_json();
        assert!(json.get("gas").is_none());
        assert!(json.get("gasPrice").is_none());
    }

    #[test]
    fn test_provider_error_mapping() {
        let rejected = ProviderError {
            code: Some(USER_REJECTED),
            message: "User denied".to_string(),
        };
        assert_eq!(AppError::from(rejected), AppError::UserRejected);

        let other = ProviderError {
            code: Some(-32603),
            message: "Internal".to_string(),
        };
        assert_eq!(
            AppError::from(other),
            AppError::Wallet("Internal (code -32603)".to_string())
        );

        assert_eq!(
            AppError::from(ProviderError::local("boom")),
            AppError::Wallet("boom".to_string())
        );
    }

    #[test]
    fn test_add_chain_params() {
        let params = add_chain_params();
        assert_eq!(params["chainId"], "0xaef3");
        assert_eq!(params["nativeCurrency"]["decimals"], 18);
        assert_eq!(params["rpcUrls"][0], FORNO_RPC);
    }

    #[test]
    fn test_parse_accounts() {
        let raw = vec!["0x00000000000000000000000000000000000000aa".to_string()];
        assert_eq!(
            parse_accounts(&raw).unwrap(),
            vec![address!("00000000000000000000000000000000000000aa")]
        );
        assert!(parse_accounts(&["nope".to_string()]).is_err());
    }
}
