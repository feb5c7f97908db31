//! Schedules panel: add, edit and remove scheduled items

use dioxus::prelude::*;

use magsday_core::models::{Collection, Record, Schedule};
use magsday_core::WriteRequest;

use crate::state::AppState;
use crate::theme::{button_style, card_style, input_style};

#[component]
pub fn SchedulesPanel() -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let card = card_style(colors);
    let field = input_style(colors);
    let primary = button_style(colors);

    let today = state.dashboard.read().today.format("%Y-%m-%d").to_string();
    let mut description = use_signal(String::new);
    let mut date = use_signal(move || today);
    let mut time = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let mut schedules = state.dashboard.read().mirrors.schedules.clone();
    schedules.sort_by(|left, right| {
        (&left.data.date, &left.data.time).cmp(&(&right.data.date, &right.data.time))
    });

    let add = move |_: MouseEvent| {
        let request = WriteRequest::create(Schedule {
            description: description(),
            date: date(),
            time: Some(time()),
        });
        error.set(state.write(request));
        if error.peek().is_none() {
            description.set(String::new());
            time.set(String::new());
        }
    };

    rsx! {
        div {
            h2 { "Schedules" }
            div {
                style: "{card}",
                input {
                    style: "{field}",
                    placeholder: "What's happening?",
                    value: "{description}",
                    oninput: move |evt| description.set(evt.value()),
                }
                div {
                    style: "display: flex; gap: 8px;",
                    input {
                        r#type: "date",
                        style: "{field}",
                        value: "{date}",
                        oninput: move |evt| date.set(evt.value()),
                    }
                    input {
                        r#type: "time",
                        style: "{field}",
                        value: "{time}",
                        oninput: move |evt| time.set(evt.value()),
                    }
                }
                if let Some(message) = error() {
                    p { style: "color: {colors.error}; font-size: 13px;", "{message}" }
                }
                button { style: "{primary} margin-top: 12px;", onclick: add, "Add schedule" }
            }

            if schedules.is_empty() {
                p { style: "color: {colors.text_muted};", "No schedules yet." }
            }
            for record in schedules {
                ScheduleRow { key: "{record.id}", record: record.clone() }
            }
        }
    }
}

#[component]
fn ScheduleRow(record: Record<Schedule>) -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let field = input_style(colors);
    let primary = button_style(colors);

    let mut editing = use_signal(|| false);
    let mut description = use_signal(String::new);
    let mut date = use_signal(String::new);
    let mut time = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let when = match &record.data.time {
        Some(time) => format!("{} {}", record.data.date, time),
        None => record.data.date.clone(),
    };
    let delete_id = record.id.clone();
    let edit_id = record.id.clone();
    let current = record.data.clone();

    let start_edit = move |_: MouseEvent| {
        description.set(current.description.clone());
        date.set(current.date.clone());
        time.set(current.time.clone().unwrap_or_default());
        error.set(None);
        editing.set(true);
    };

    let save = move |_: MouseEvent| {
        let request = WriteRequest::replace(
            edit_id.clone(),
            Schedule {
                description: description(),
                date: date(),
                time: Some(time()),
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
                    value: "{description}",
                    oninput: move |evt| description.set(evt.value()),
                }
                div {
                    style: "display: flex; gap: 8px;",
                    input {
                        r#type: "date",
                        style: "{field}",
                        value: "{date}",
                        oninput: move |evt| date.set(evt.value()),
                    }
                    input {
                        r#type: "time",
                        style: "{field}",
                        value: "{time}",
                        oninput: move |evt| time.set(evt.value()),
                    }
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
                div { "{record.data.description}" }
                div { style: "font-size: 12px; color: {colors.text_secondary};", "{when}" }
            }
            button {
                style: "background: none; border: none; color: {colors.accent}; cursor: pointer;",
                onclick: start_edit,
                "Edit"
            }
            button {
                style: "background: none; border: none; color: {colors.error}; cursor: pointer;",
                onclick: move |_| {
                    state.submit(WriteRequest::delete(Collection::Schedules, delete_id.clone()));
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
