//! PIN prompt for a locked daily note

use dioxus::prelude::*;

use magsday_core::gate::PinOutcome;

use crate::state::AppState;
use crate::theme::{button_style, card_style, input_style};

#[component]
pub fn PinModal() -> Element {
    let mut state = use_context::<AppState>();
    let colors = state.palette();
    let card = card_style(colors);
    let field = input_style(colors);
    let primary = button_style(colors);
    let mut rejected = use_signal(|| false);
    let pin_input = state.dashboard.read().gate.pin_input().to_string();

    let submit = move |_: MouseEvent| {
        let outcome = state.dashboard.write().submit_pin();
        rejected.set(outcome == PinOutcome::Rejected);
    };

    rsx! {
        div {
            style: "position: fixed; inset: 0; background: rgba(0, 0, 0, 0.6); display: flex; align-items: center; justify-content: center; z-index: 50;",
            div {
                style: "{card} width: 300px; background: {colors.bg_secondary};",
                h3 { style: "margin-top: 0;", "Enter PIN" }
                input {
                    r#type: "password",
                    style: "{field}",
                    value: "{pin_input}",
                    autofocus: true,
                    oninput: move |evt| state.dashboard.write().gate.set_pin_input(evt.value()),
                }
                if rejected() {
                    p { style: "color: {colors.error}; font-size: 13px;", "Incorrect PIN." }
                }
                div {
                    style: "display: flex; gap: 8px; margin-top: 12px; justify-content: flex-end;",
                    button {
                        style: "background: none; border: 1px solid {colors.border}; color: {colors.text_primary}; border-radius: 8px; padding: 8px 14px; cursor: pointer;",
                        onclick: move |_| state.dashboard.write().gate.close_prompt(),
                        "Cancel"
                    }
                    button { style: "{primary}", onclick: submit, "Unlock" }
                }
            }
        }
    }
}
