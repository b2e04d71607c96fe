//! Footer component

use leptos::*;

use crate::{CHAIN_NAME, EXPLORER_URL, FACTORY_ADDRESS};

#[component]
pub fn Footer() -> impl IntoView {
    let factory_url = format!("{}/address/{}", EXPLORER_URL, FACTORY_ADDRESS);

    view! {
        <footer>
            <div>{CHAIN_NAME} " • Powered by " <span class="rust-badge">"🦀 Rust + Leptos"</span></div>
            <div class="footer-links">
                <a href=factory_url class="footer-link" target="_blank">
                    "Contrato de bóvedas"
                </a>
                <a href=EXPLORER_URL class="footer-link" target="_blank">
                    "Explorador"
                </a>
            </div>
        </footer>
    }
}
