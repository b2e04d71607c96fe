use alloy::primitives::Address;
use leptos::*;

use crate::components::{alert, is_current_account, push_log};
use crate::services::{InjectedWallet, VaultService};
use crate::tokens::CCOP;
use crate::{AppError, LogEntry, LogLevel, TokenBalance, BALANCE_DISPLAY_DECIMALS, BALANCE_POLL_INTERVAL};

#[component]
pub fn Header(
    account: ReadSignal<Option<Address>>,
    set_account: WriteSignal<Option<Address>>,
    refresh_key: ReadSignal<u32>,
    set_refresh_key: WriteSignal<u32>,
    set_logs: WriteSignal<Vec<LogEntry>>,
) -> impl IntoView {
    let (balance, set_balance) = create_signal(None::<TokenBalance>);

    // Re-read the balance whenever the account changes or a refresh is requested
    create_effect(move |_| {
        let _ = refresh_key.get();
        let Some(addr) = account.get() else {
            set_balance.set(None);
            return;
        };
        spawn_local(async move {
            let result = VaultService::new().token_balance(addr).await;
            if !is_current_account(account.get_untracked(), addr) {
                return;
            }
            match result {
                Ok(bal) => {
                    log::debug!("💰 Balance: {} {}", bal.formatted(), bal.symbol);
                    set_balance.set(Some(bal));
                }
                Err(e) => log::error!("Error leyendo balance de {}: {}", CCOP.symbol, e),
            }
        });
    });

    // Poll every 15 s while connected; vault list and balances follow the refresh key
    match set_interval_with_handle(
        move || {
            if account.get_untracked().is_some() {
                set_refresh_key.update(|k| *k += 1);
            }
        },
        BALANCE_POLL_INTERVAL,
    ) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(e) => log::warn!("Balance polling unavailable: {:?}", e),
    }

    let on_connect = move |_| {
        if account.get_untracked().is_some() {
            return;
        }
        if !InjectedWallet::is_available() {
            alert("Instala MetaMask u otra wallet compatible");
            return;
        }

        log::info!("🔑 Attempting to connect wallet...");
        spawn_local(async move {
            match InjectedWallet::connect().await {
                Ok(addr) => {
                    set_account.set(Some(addr));
                    set_refresh_key.update(|k| *k += 1);
                    push_log(set_logs, LogLevel::Success, format!("Wallet conectada: {}", addr));
                }
                Err(AppError::UserRejected) => {
                    push_log(set_logs, LogLevel::Warning, "Conexión rechazada en la wallet");
                }
                Err(e) => {
                    push_log(set_logs, LogLevel::Error, format!("Error conectando wallet: {}", e));
                }
            }
        });
    };

    view! {
        <header>
            <h1 class="title">"Wallet Web3"</h1>

            <button
                class="btn btn-primary"
                on:click=on_connect
                disabled=move || account.get().is_some()
            >
                {move || if account.get().is_some() { "Wallet Conectada" } else { "Conectar Wallet" }}
            </button>

            <Show
                when=move || account.get().is_some()
                fallback=|| view! { }
            >
                <div class="account-box">
                    <p class="account-address">
                        {move || account.get().map(|a| a.to_string()).unwrap_or_default()}
                    </p>
                </div>
                <div class="balance-box">
                    <p class="balance">
                        {move || match balance.get() {
                            Some(bal) => format!("{} {}", bal.display(BALANCE_DISPLAY_DECIMALS), bal.symbol),
                            None => format!("0.0000 {}", CCOP.symbol),
                        }}
                    </p>
                </div>
            </Show>
        </header>
    }
}
