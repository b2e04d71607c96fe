//! Vault creation form.
//!
//! Locks cCOP in a new factory vault for a number of seconds. The amount is
//! approved if needed, dry-run against the factory, then signed by the wallet.

use alloy::primitives::Address;
use leptos::*;

use crate::components::{alert, is_current_account, push_log};
use crate::services::VaultService;
use crate::tokens::CCOP;
use crate::{AppError, LogEntry, LogLevel, TokenBalance};

/// Text of the alert shown when creation fails.
pub fn creation_failure_message(err: &AppError) -> String {
    format!("Revert/Fail: {}", err)
}

#[component]
pub fn VaultCreation(
    account: ReadSignal<Option<Address>>,
    refresh_key: ReadSignal<u32>,
    set_refresh_key: WriteSignal<u32>,
    set_logs: WriteSignal<Vec<LogEntry>>,
) -> impl IntoView {
    let (amount, set_amount) = create_signal(String::new());
    let (duration, set_duration) = create_signal(String::new());
    let (tx_hash, set_tx_hash) = create_signal(None::<String>);
    let (is_loading, set_is_loading) = create_signal(false);
    let (balance, set_balance) = create_signal(None::<TokenBalance>);

    create_effect(move |_| {
        let _ = refresh_key.get();
        let _ = tx_hash.get();
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
                Ok(bal) => set_balance.set(Some(bal)),
                Err(e) => {
                    log::error!("Error al leer balance de {}: {}", CCOP.symbol, e);
                    set_balance.set(None);
                }
            }
        });
    });

    let on_create = move |_| {
        let Some(addr) = account.get_untracked() else {
            alert("Conecta la wallet antes de crear una bóveda.");
            return;
        };
        let amount = amount.get_untracked();
        let duration = duration.get_untracked();
        if amount.trim().is_empty() || duration.trim().is_empty() {
            alert("Debes ingresar monto y duración");
            return;
        }

        set_is_loading.set(true);
        spawn_local(async move {
            let service = VaultService::new();
            let notify = move |level: LogLevel, message: String| push_log(set_logs, level, message);

            match service.create_vault(addr, &amount, &duration, &notify).await {
                Ok(hash) => {
                    push_log(set_logs, LogLevel::Info, format!("Transacción enviada: {}", hash));
                    set_tx_hash.set(Some(hash.clone()));
                    set_refresh_key.update(|k| *k += 1);
                    set_is_loading.set(false);

                    match service.wait_for_receipt(&hash).await {
                        Ok(_) => {
                            push_log(set_logs, LogLevel::Success, "Bóveda creada y confirmada");
                            set_refresh_key.update(|k| *k += 1);
                        }
                        Err(e) => push_log(set_logs, LogLevel::Error, e.to_string()),
                    }
                }
                Err(e) => {
                    push_log(set_logs, LogLevel::Error, format!("Error al crear bóveda: {}", e));
                    alert(&creation_failure_message(&e));
                    set_is_loading.set(false);
                }
            }
        });
    };

    view! {
        <div class="vault-creation">
            <div class="available-balance">
                "Balance disponible: "
                {move || balance.get().map(|b| b.formatted()).unwrap_or_else(|| "0".to_string())}
                " " {CCOP.symbol}
            </div>

            <div class="field">
                <label for="amountInput">{format!("Monto (COP$ - {}):", CCOP.symbol)}</label>
                <input
                    id="amountInput"
                    type="number"
                    min="0"
                    step="0.01"
                    placeholder="Ej. 100000"
                    prop:value=amount
                    on:input=move |ev| set_amount.set(event_target_value(&ev))
                />
            </div>

            <div class="field">
                <label for="durationInput">"Duración del bloqueo (segundos):"</label>
                <input
                    id="durationInput"
                    type="number"
                    min="1"
                    placeholder="Ej. 86400 (1 día)"
                    prop:value=duration
                    on:input=move |ev| set_duration.set(event_target_value(&ev))
                />
            </div>

            <button
                class="btn btn-success"
                class:busy=move || is_loading.get()
                on:click=on_create
                disabled=move || is_loading.get()
            >
                {move || if is_loading.get() {
                    "Registrando compromiso..."
                } else {
                    "Crear bóveda de transparencia"
                }}
            </button>

            <Show
                when=move || tx_hash.get().is_some()
                fallback=|| view! { }
            >
                <div class="tx-notice">
                    <p class="tx-notice-title">"Transacción enviada al registro público"</p>
                    <p class="tx-hash">{move || tx_hash.get().unwrap_or_default()}</p>
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        let err = AppError::Reverted("Insufficient allowance".to_string());
        assert_eq!(creation_failure_message(&err), "Revert/Fail: Insufficient allowance");

        let err = AppError::Validation("Debes ingresar monto y duración".to_string());
        assert_eq!(creation_failure_message(&err), "Revert/Fail: Debes ingresar monto y duración");
    }
}
