//! Vaults registered to the connected account.

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use leptos::*;

use crate::components::{alert, is_current_account, push_log};
use crate::services::{now_secs, VaultService};
use crate::{AppError, LogEntry, LogLevel, Vault};

/// How a failed withdrawal is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawFailure {
    /// Alert text
    pub alert: String,
    /// Per-vault error line; `None` for precondition failures
    pub inline: Option<String>,
}

pub fn withdraw_failure(err: &AppError) -> WithdrawFailure {
    match err {
        AppError::NotOwner | AppError::AlreadyWithdrawn => WithdrawFailure {
            alert: format!("⚠️ {}", err),
            inline: None,
        },
        AppError::StillLocked { .. } => WithdrawFailure {
            alert: format!("⏳ {}", err),
            inline: None,
        },
        AppError::Reverted(reason) => WithdrawFailure {
            alert: format!("❌ Retiro rechazado:\n{}", reason),
            inline: Some(reason.clone()),
        },
        other => WithdrawFailure {
            alert: format!("❌ No se pudo retirar la bóveda:\n{}", other),
            inline: Some(other.to_string()),
        },
    }
}

#[component]
pub fn VaultList(
    account: ReadSignal<Option<Address>>,
    refresh_key: ReadSignal<u32>,
    set_refresh_key: WriteSignal<u32>,
    set_logs: WriteSignal<Vec<LogEntry>>,
) -> impl IntoView {
    let (vaults, set_vaults) = create_signal(Vec::<Vault>::new());
    let (loading, set_loading) = create_signal(false);
    let (withdrawing_id, set_withdrawing_id) = create_signal(None::<U256>);
    let (errors, set_errors) = create_signal(HashMap::<U256, String>::new());

    // Returns the account it loaded for, so a switch can be told apart from a poll
    create_effect(move |prev: Option<Option<Address>>| {
        let _ = refresh_key.get();
        let current = account.get();
        if prev.flatten() != current {
            set_vaults.set(Vec::new());
            set_errors.set(HashMap::new());
        }
        let Some(addr) = current else {
            set_loading.set(false);
            return current;
        };

        // Only the first load shows the loading message; polls refresh in place
        if vaults.get_untracked().is_empty() {
            set_loading.set(true);
        }
        spawn_local(async move {
            let result = VaultService::new().list_vaults(addr).await;
            if !is_current_account(account.get_untracked(), addr) {
                return;
            }
            match result {
                Ok(list) => set_vaults.set(list),
                Err(e) => {
                    log::error!("Error al leer bóvedas: {}", e);
                    set_vaults.set(Vec::new());
                }
            }
            set_loading.set(false);
        });
        current
    });

    let withdraw = move |id: U256| {
        let Some(addr) = account.get_untracked() else {
            return;
        };
        let Some(vault) = vaults.get_untracked().into_iter().find(|v| v.id == id) else {
            return;
        };

        set_withdrawing_id.set(Some(id));
        set_errors.update(|e| {
            e.remove(&id);
        });

        spawn_local(async move {
            let on_sent = |hash: &str| {
                push_log(set_logs, LogLevel::Info, format!("Retiro enviado: {}", hash));
            };
            let result = VaultService::new()
                .withdraw_confirmed(addr, &vault, now_secs(), &on_sent)
                .await;
            set_withdrawing_id.set(None);

            match result {
                Ok(_) => {
                    push_log(set_logs, LogLevel::Success, format!("Bóveda {} retirada", id));
                    set_refresh_key.update(|k| *k += 1);
                }
                Err(e) => {
                    let failure = withdraw_failure(&e);
                    if let Some(inline) = failure.inline {
                        if is_current_account(account.get_untracked(), addr) {
                            set_errors.update(|errs| {
                                errs.insert(id, inline);
                            });
                        }
                        push_log(set_logs, LogLevel::Error, format!("Error al retirar {}: {}", id, e));
                    }
                    alert(&failure.alert);
                }
            }
        });
    };

    move || {
        if account.get().is_none() {
            return view! {
                <p class="muted">"Conecta tu wallet para consultar las bóvedas asignadas."</p>
            }
            .into_view();
        }
        if loading.get() {
            return view! { <p class="muted">"Cargando información de bóvedas…"</p> }.into_view();
        }
        if vaults.get().is_empty() {
            return view! { <p class="muted">"No se registraron bóvedas a tu nombre."</p> }.into_view();
        }

        view! {
            <div class="vault-list">
                <h2>"Bóvedas Auditables"</h2>
                <For
                    each=move || vaults.get()
                    key=|v| (v.id, v.withdrawn)
                    children=move |v| {
                        let id = v.id;
                        let label = v.token_label();
                        let show_button = account
                            .get_untracked()
                            .map(|a| v.can_withdraw(a, now_secs()))
                            .unwrap_or(false);

                        view! {
                            <div class="vault-card">
                                <p><strong>"ID: "</strong> {id.to_string()}</p>
                                <p><strong>"Token: "</strong> {label.clone()}</p>
                                <p><strong>"Monto asignado: "</strong> {v.formatted_amount()} " " {label}</p>
                                <p><strong>"Fecha de desbloqueo: "</strong> {v.unlock_date()}</p>
                                <p><strong>"Estado: "</strong> {v.status_label()}</p>

                                <Show
                                    when=move || show_button
                                    fallback=|| view! { }
                                >
                                    <button
                                        class="btn btn-success"
                                        on:click=move |_| withdraw(id)
                                        disabled=move || withdrawing_id.get() == Some(id)
                                    >
                                        {move || if withdrawing_id.get() == Some(id) {
                                            "Procesando retiro…"
                                        } else {
                                            "Retirar fondos"
                                        }}
                                    </button>
                                </Show>

                                {move || errors.get().get(&id).cloned().map(|e| view! {
                                    <p class="vault-error">"Error: " {e}</p>
                                })}
                            </div>
                        }
                    }
                />
            </div>
        }
        .into_view()
    }
}
