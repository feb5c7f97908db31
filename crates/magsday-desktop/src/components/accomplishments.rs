//! Triumphs panel: record accomplishments and celebrate them

use dioxus::prelude::*;

use magsday_core::assist::AssistRequest;
use magsday_core::models::{Accomplishment, Collection, Record};
use magsday_core::WriteRequest;

use crate::state::{AppState, Command};
use crate::theme::{button_style, card_style, input_style};

#[component]
pub fn AccomplishmentsPanel() -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let card = card_style(colors);
    let field = input_style(colors);
    let primary = button_style(colors);

    let mut text = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let dashboard = state.dashboard.read();
    let today = dashboard.today.format("%Y-%m-%d").to_string();
    let mut accomplishments = dashboard.mirrors.accomplishments.clone();
    let assist_loading = dashboard.assist.loading;
    drop(dashboard);
    accomplishments.sort_by(|left, right| right.data.date.cmp(&left.data.date));

    let add = move |_: MouseEvent| {
        let request = WriteRequest::create(Accomplishment {
            text: text(),
            date: Some(today.clone()),
        });
        error.set(state.write(request));
        if error.peek().is_none() {
            text.set(String::new());
        }
    };

    rsx! {
        div {
            h2 { "Triumphs" }
            div {
                style: "{card}",
                input {
                    style: "{field}",
                    placeholder: "What did you get done?",
                    value: "{text}",
                    oninput: move |evt| text.set(evt.value()),
                }
                if let Some(message) = error() {
                    p { style: "color: {colors.error}; font-size: 13px;", "{message}" }
                }
                div {
                    style: "display: flex; gap: 8px; margin-top: 12px;",
                    button { style: "{primary}", onclick: add, "Add triumph" }
                    button {
                        style: "{primary}",
                        disabled: assist_loading,
                        onclick: move |_| state.send(Command::Assist(AssistRequest::CelebrateWins)),
                        "Celebrate my wins"
                    }
                }
            }

            if accomplishments.is_empty() {
                p { style: "color: {colors.text_muted};", "No triumphs yet. Start small!" }
            }
            for record in accomplishments {
                AccomplishmentRow { key: "{record.id}", record: record.clone() }
            }
        }
    }
}

#[component]
fn AccomplishmentRow(record: Record<Accomplishment>) -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let field = input_style(colors);
    let primary = button_style(colors);

    let mut editing = use_signal(|| false);
    let mut text = use_signal(String::new);
    let mut date = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let shown_date = record.data.date.clone().unwrap_or_default();
    let delete_id = record.id.clone();
    let edit_id = record.id.clone();
    let current = record.data.clone();

    let start_edit = move |_: MouseEvent| {
        text.set(current.text.clone());
        date.set(current.date.clone().unwrap_or_default());
        error.set(None);
        editing.set(true);
    };

    let save = move |_: MouseEvent| {
        let request = WriteRequest::replace(
            edit_id.clone(),
            Accomplishment {
                text: text(),
                date: Some(date()),
            },
        );
        error.set(state.write(request));
        if error.peek().is_none() {
            editing.set(false);
        }
    };

    let body = if editing() {
        rsx! {
            div {
                style: "flex: 1; display: flex; flex-direction: column; gap: 6px;",
                input {
                    style: "{field}",
                    value: "{text}",
                    oninput: move |evt| text.set(evt.value()),
                }
                input {
                    r#type: "date",
                    style: "{field}",
                    value: "{date}",
                    oninput: move |evt| date.set(evt.value()),
                }
                if let Some(message) = error() {
                    p { style: "color: {colors.error}; font-size: 13px;", "{message}" }
                }
                div {
                    style: "display: flex; gap: 8px;",
                    button { style: "{primary}", onclick: save, "Save" }
                    button {
                        style: "background: none; border: none; color: {colors.text_secondary}; cursor: pointer;",
                        onclick: move |_| editing.set(false),
                        "Cancel"
                    }
                }
            }
        }
    } else {
        rsx! {
            div {
                style: "flex: 1;",
                div { "{record.data.text}" }
                div { style: "font-size: 12px; color: {colors.text_secondary};", "{shown_date}" }
            }
            button {
                style: "background: none; border: none; color: {colors.accent}; cursor: pointer;",
                onclick: start_edit,
                "Edit"
            }
            button {
                style: "background: none; border: none; color: {colors.error}; cursor: pointer;",
                onclick: move |_| {
                    state.submit(WriteRequest::delete(Collection::Accomplishments, delete_id.clone()));
                },
                "Delete"
            }
        }
    };

    rsx! {
        div {
            style: "display: flex; align-items: center; gap: 12px; padding: 10px 0; border-bottom: 1px solid {colors.border};",
            {body}
        }
    }
}
