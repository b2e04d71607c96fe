//! Time-Lock Vaults - Frontend Rust/Leptos Application
//!
//! A WebAssembly frontend for locking cCOP in factory-deployed time-lock
//! vaults on Celo Alfajores and withdrawing them once unlocked.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header (wallet connection, cCOP balance, 15 s polling)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MainContent                                                 │
//! │  ├── Hero (title, description)                              │
//! │  ├── VaultCreation (amount + duration → createVaultERC20)   │
//! │  ├── VaultList (userVaults → vaults, withdraw)              │
//! │  └── ActivityPanel (submitted transactions)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Common types (Vault, TokenBalance, LogEntry, AppError)
//! - [`contracts`] - ERC-20 and factory ABI bindings
//! - [`units`] - Decimal ⇄ base unit conversions
//! - [`tokens`] - Supported token registry
//! - [`components`] - UI components
//! - [`services`] - RPC client, injected wallet, vault operations

use alloy::primitives::Address;
use leptos::*;
use leptos_meta::{provide_meta_context, Title};
use leptos_router::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod contracts;
pub mod units;
pub mod tokens;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // Vaults
    Vault, TokenBalance,
    // Logs
    LogEntry, LogLevel,
    // Errors
    AppError, AppResult,
};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application
// =============================================================================

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text=APP_NAME/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

/// Restore an already authorized account and follow wallet-side changes.
fn init_wallet_session(
    set_account: WriteSignal<Option<Address>>,
    set_refresh_key: WriteSignal<u32>,
    set_logs: WriteSignal<Vec<LogEntry>>,
) {
    if !InjectedWallet::is_available() {
        return;
    }

    spawn_local(async move {
        match InjectedWallet::accounts().await {
            Ok(accounts) => {
                if let Some(addr) = accounts.first().copied() {
                    log::info!("🔁 Restored wallet session: {}", addr);
                    set_account.set(Some(addr));
                    set_refresh_key.update(|k| *k += 1);
                }
            }
            Err(e) => log::warn!("Could not read authorized accounts: {}", e),
        }
    });

    InjectedWallet::on_accounts_changed(move |accounts| {
        let next = accounts.first().copied();
        log::info!("👤 Account changed: {:?}", next);
        set_account.set(next);
        set_refresh_key.update(|k| *k += 1);
    });

    InjectedWallet::on_chain_changed(move |chain_id| {
        if chain_id != CHAIN_ID {
            push_log(
                set_logs,
                LogLevel::Warning,
                format!("La wallet está en la red {}; se pedirá cambiar a {}", chain_id, CHAIN_NAME),
            );
        }
        set_refresh_key.update(|k| *k += 1);
    });
}

#[component]
fn MainContent() -> impl IntoView {
    // Shared state: the connected account and a counter bumped to trigger re-reads
    let (account, set_account) = create_signal(None::<Address>);
    let (refresh_key, set_refresh_key) = create_signal(0u32);
    let (logs, set_logs) = create_signal(Vec::<LogEntry>::new());

    init_wallet_session(set_account, set_refresh_key, set_logs);

    view! {
        <Header
            account=account
            set_account=set_account
            refresh_key=refresh_key
            set_refresh_key=set_refresh_key
            set_logs=set_logs
        />

        <div class="container">
            <Hero/>

            <VaultCreation
                account=account
                refresh_key=refresh_key
                set_refresh_key=set_refresh_key
                set_logs=set_logs
            />

            <VaultList
                account=account
                refresh_key=refresh_key
                set_refresh_key=set_refresh_key
                set_logs=set_logs
            />

            <Show
                when=move || !logs.get().is_empty()
                fallback=|| view! { }
            >
                <ActivityPanel logs=logs set_logs=set_logs/>
            </Show>
        </div>

        <Footer/>
    }
}
