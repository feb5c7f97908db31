//! Modal showing the result of an AI assist request

use dioxus::prelude::*;

use magsday_core::assist::AssistOutput;

use crate::state::AppState;
use crate::theme::{button_style, card_style};

#[component]
pub fn AssistModal() -> Element {
    let mut state = use_context::<AppState>();
    let colors = state.palette();
    let card = card_style(colors);
    let primary = button_style(colors);

    let assist = state.dashboard.read().assist.clone();
    let title = assist.request.map_or("AI assist", |request| request.label());
    let output = match assist.output {
        Some(AssistOutput::Text(text)) => rsx! {
            p { style: "white-space: pre-wrap;", "{text}" }
        },
        Some(AssistOutput::Error(message)) => rsx! {
            p { style: "color: {colors.error};", "{message}" }
        },
        None => rsx! {},
    };

    rsx! {
        div {
            style: "position: fixed; inset: 0; background: rgba(0, 0, 0, 0.6); display: flex; align-items: center; justify-content: center; z-index: 50;",
            div {
                style: "{card} width: 340px; max-height: 70vh; overflow-y: auto; background: {colors.bg_secondary};",
                h3 { style: "margin-top: 0;", "{title}" }
                if assist.loading {
                    p { style: "color: {colors.text_secondary};", "Thinking..." }
                }
                {output}
                button {
                    style: "{primary} margin-top: 12px;",
                    onclick: move |_| state.dashboard.write().assist.close(),
                    "Close"
                }
            }
        }
    }
}
