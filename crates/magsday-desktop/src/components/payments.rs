//! Payments panel: track what is owed and mark it paid

use dioxus::prelude::*;

use magsday_core::models::{Collection, Payment, Record};
use magsday_core::{Error, WriteRequest};

use crate::state::AppState;
use crate::theme::{button_style, card_style, input_style};

#[component]
pub fn PaymentsPanel() -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let card = card_style(colors);
    let field = input_style(colors);
    let primary = button_style(colors);

    let mut description = use_signal(String::new);
    let mut amount = use_signal(String::new);
    let mut due_date = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let dashboard = state.dashboard.read();
    let payments = dashboard.mirrors.payments.clone();
    let summary = dashboard.summary();
    let outstanding = dashboard.format_amount(summary.outstanding_total);
    let currency = dashboard.currency().symbol();
    drop(dashboard);

    let add = move |_: MouseEvent| {
        let request = amount()
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidInput(format!("'{}' is not an amount", amount().trim())))
            .and_then(|amount| {
                WriteRequest::create(Payment {
                    description: description(),
                    amount,
                    due_date: Some(due_date()),
                    paid: false,
                })
            });
        error.set(state.write(request));
        if error.peek().is_none() {
            description.set(String::new());
            amount.set(String::new());
            due_date.set(String::new());
        }
    };

    rsx! {
        div {
            h2 { "Payments" }
            p { style: "color: {colors.text_secondary};", "Outstanding: {outstanding}" }
            div {
                style: "{card}",
                input {
                    style: "{field}",
                    placeholder: "What is it for?",
                    value: "{description}",
                    oninput: move |evt| description.set(evt.value()),
                }
                div {
                    style: "display: flex; gap: 8px;",
                    input {
                        r#type: "number",
                        style: "{field}",
                        placeholder: "Amount ({currency})",
                        value: "{amount}",
                        oninput: move |evt| amount.set(evt.value()),
                    }
                    input {
                        r#type: "date",
                        style: "{field}",
                        value: "{due_date}",
                        oninput: move |evt| due_date.set(evt.value()),
                    }
                }
                if let Some(message) = error() {
                    p { style: "color: {colors.error}; font-size: 13px;", "{message}" }
                }
                button { style: "{primary} margin-top: 12px;", onclick: add, "Add payment" }
            }

            if payments.is_empty() {
                p { style: "color: {colors.text_muted};", "No payments tracked." }
            }
            for record in payments {
                PaymentRow { key: "{record.id}", record: record.clone() }
            }
        }
    }
}

#[component]
fn PaymentRow(record: Record<Payment>) -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let amount = state.dashboard.read().format_amount(record.data.amount);
    let due = record
        .data
        .due_date
        .as_ref()
        .map(|date| format!("Due {date}"))
        .unwrap_or_default();
    let paid = record.data.paid;
    let text_decoration = if paid { "line-through" } else { "none" };
    let delete_id = record.id.clone();
    let toggled = record.clone();

    let toggle_paid = move |_: FormEvent| {
        let payment = Payment {
            paid: !toggled.data.paid,
            ..toggled.data.clone()
        };
        match WriteRequest::replace(toggled.id.clone(), payment) {
            Ok(request) => state.submit(request),
            Err(error) => tracing::warn!("Cannot update payment {}: {}", toggled.id, error),
        }
    };

    rsx! {
        div {
            style: "display: flex; align-items: center; gap: 12px; padding: 10px 0; border-bottom: 1px solid {colors.border};",
            input { r#type: "checkbox", checked: paid, onchange: toggle_paid }
            div {
                style: "flex: 1; text-decoration: {text_decoration};",
                div { "{record.data.description}" }
                div { style: "font-size: 12px; color: {colors.text_secondary};", "{amount} {due}" }
            }
            button {
                style: "background: none; border: none; color: {colors.error}; cursor: pointer;",
                onclick: move |_| {
                    state.submit(WriteRequest::delete(Collection::Payments, delete_id.clone()));
                },
                "Delete"
            }
        }
    }
}
