//! Hero section component

use leptos::*;

use crate::tokens::CCOP;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"Bóvedas de Transparencia"</h1>
            <p class="subtitle">
                {format!("Bloquea {} durante un plazo fijo en un contrato público. ", CCOP.symbol)}
                "Nadie, ni siquiera tú, puede retirar los fondos antes de la fecha de desbloqueo."
            </p>
        </div>
    }
}
