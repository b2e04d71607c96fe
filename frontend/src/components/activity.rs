//! Activity feed.
//!
//! Every submitted transaction, confirmation and failure is appended here
//! with a timestamp, newest at the bottom with auto-scroll.

use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::{LogEntry, LogLevel, MAX_LOG_ENTRIES};

/// Request animation frame helper for smooth scrolling
fn request_animation_frame(f: impl FnOnce() + 'static) {
    let closure = Closure::once(f);
    if gloo_utils::window()
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .is_ok()
    {
        closure.forget();
    }
}

/// Append an entry, dropping the oldest beyond [`MAX_LOG_ENTRIES`].
pub fn append_capped(logs: &mut Vec<LogEntry>, entry: LogEntry) {
    logs.push(entry);
    if logs.len() > MAX_LOG_ENTRIES {
        let excess = logs.len() - MAX_LOG_ENTRIES;
        logs.drain(..excess);
    }
}

/// Push an entry into the feed and mirror it to the console.
pub fn push_log(set_logs: WriteSignal<Vec<LogEntry>>, level: LogLevel, message: impl Into<String>) {
    let entry = LogEntry::now(level, message);
    match entry.level {
        LogLevel::Error => log::error!("{}", entry.message),
        LogLevel::Warning => log::warn!("{}", entry.message),
        _ => log::info!("{}", entry.message),
    }
    set_logs.update(|logs| append_capped(logs, entry));
}

#[component]
pub fn ActivityPanel(
    logs: ReadSignal<Vec<LogEntry>>,
    set_logs: WriteSignal<Vec<LogEntry>>,
) -> impl IntoView {
    let logs_container = create_node_ref::<leptos::html::Div>();

    create_effect(move |_| {
        let _ = logs.get();
        if let Some(container) = logs_container.get() {
            request_animation_frame(move || {
                container.set_scroll_top(container.scroll_height());
            });
        }
    });

    view! {
        <div class="logs-panel">
            <div class="logs-header">
                <span class="logs-title">"📋 Actividad"</span>
                <button
                    class="logs-clear"
                    on:click=move |_| set_logs.set(vec![])
                >
                    "Limpiar"
                </button>
            </div>
            <div class="logs-content" node_ref=logs_container>
                <For
                    each=move || logs.get().into_iter().enumerate()
                    key=|(i, entry)| (*i, entry.timestamp.clone(), entry.message.clone())
                    children=move |(_, entry)| {
                        view! {
                            <div class=format!("log-entry {}", entry.level.css_class())>
                                <span class="log-time">"[" {entry.timestamp.clone()} "] "</span>
                                {entry.level.emoji()} " " {entry.message.clone()}
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            level: LogLevel::Info,
            message: message.to_string(),
            timestamp: "12:00:00".to_string(),
        }
    }

    #[test]
    fn test_append_keeps_newest() {
        let mut logs = Vec::new();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            append_capped(&mut logs, entry(&i.to_string()));
        }
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "5");
        assert_eq!(logs.last().unwrap().message, (MAX_LOG_ENTRIES + 4).to_string());
    }
}
