//! Today's note, behind the PIN gate when locked

use dioxus::prelude::*;

use magsday_core::models::DailyNote;
use magsday_core::WriteRequest;

use crate::state::AppState;
use crate::theme::{button_style, card_style, input_style};

#[component]
pub fn DailyNoteCard() -> Element {
    let mut state = use_context::<AppState>();
    let colors = state.palette();
    let card = card_style(colors);
    let field = input_style(colors);
    let primary = button_style(colors);

    let mirrored = use_memo(move || state.dashboard.read().mirrors.note.content.clone());
    let mut draft = use_signal(String::new);
    use_effect(move || draft.set(mirrored()));

    let dashboard = state.dashboard.read();
    let visible = dashboard.note_visible();
    let is_locked = dashboard.mirrors.note.is_locked;
    let has_pin = dashboard.mirrors.settings.has_pin();
    drop(dashboard);

    let save = move |is_locked: bool| {
        state.submit(WriteRequest::save_note(DailyNote {
            content: draft(),
            is_locked,
        }));
    };

    let lock_label = if is_locked { "Unlock note" } else { "Lock note" };

    rsx! {
        div {
            style: "{card}",
            h3 { style: "margin-top: 0;", "Daily note" }
            if visible {
                textarea {
                    style: "{field} min-height: 120px; resize: vertical;",
                    value: "{draft}",
                    placeholder: "How is today going?",
                    oninput: move |evt| draft.set(evt.value()),
                }
                div {
                    style: "display: flex; gap: 8px; margin-top: 8px;",
                    button {
                        style: "{primary}",
                        onclick: move |_| save(is_locked),
                        "Save"
                    }
                    button {
                        style: "background: none; border: 1px solid {colors.border}; color: {colors.text_primary}; border-radius: 8px; padding: 8px 14px; cursor: pointer;",
                        onclick: move |_| save(!is_locked),
                        "{lock_label}"
                    }
                }
                if is_locked && !has_pin {
                    p {
                        style: "font-size: 12px; color: {colors.text_muted};",
                        "Set a PIN in Settings to keep locked notes private."
                    }
                }
            } else {
                p { style: "color: {colors.text_secondary};", "This note is locked." }
                button {
                    style: "{primary}",
                    onclick: move |_| state.dashboard.write().gate.open_prompt(),
                    "Enter PIN"
                }
            }
        }
    }
}
