//! Settings panel: theme, currency, note PIN and account

use dioxus::prelude::*;

use magsday_core::models::Currency;

use crate::state::{AppState, Command};
use crate::theme::{button_style, card_style, input_style};

#[component]
pub fn SettingsPanel() -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let card = card_style(colors);
    let field = input_style(colors);
    let primary = button_style(colors);

    let mut new_pin = use_signal(String::new);
    let settings = state.settings();
    let account = state
        .dashboard
        .read()
        .auth
        .identity()
        .map(|identity| identity.email.clone().unwrap_or_else(|| identity.id.clone()))
        .unwrap_or_default();

    let theme = settings.theme;
    let theme_label = theme.as_str();
    let next_theme = theme.toggled();
    let currency_code = settings.currency.code();
    let pin_status = if settings.has_pin() {
        "A PIN protects locked notes."
    } else {
        "No PIN set. Locked notes stay readable."
    };
    let has_pin = settings.has_pin();

    rsx! {
        div {
            h2 { "Settings" }

            div {
                style: "{card}",
                h3 { style: "margin-top: 0;", "Appearance" }
                div {
                    style: "display: flex; align-items: center; justify-content: space-between;",
                    span { "Theme: {theme_label}" }
                    button {
                        style: "{primary}",
                        onclick: move |_| state.save_theme(next_theme),
                        "Switch theme"
                    }
                }
                div {
                    style: "display: flex; align-items: center; justify-content: space-between; margin-top: 12px;",
                    span { "Currency" }
                    select {
                        style: "padding: 6px; border-radius: 8px;",
                        value: "{currency_code}",
                        onchange: move |evt| match evt.value().parse::<Currency>() {
                            Ok(currency) => state.save_currency(currency),
                            Err(error) => tracing::warn!("Ignoring currency selection: {}", error),
                        },
                        for currency in Currency::ALL {
                            CurrencyOption { key: "{currency}", currency: currency, selected: currency == settings.currency }
                        }
                    }
                }
            }

            div {
                style: "{card}",
                h3 { style: "margin-top: 0;", "Note PIN" }
                p { style: "font-size: 13px; color: {colors.text_secondary};", "{pin_status}" }
                input {
                    r#type: "password",
                    style: "{field}",
                    placeholder: "New PIN",
                    value: "{new_pin}",
                    oninput: move |evt| new_pin.set(evt.value()),
                }
                div {
                    style: "display: flex; gap: 8px; margin-top: 12px;",
                    button {
                        style: "{primary}",
                        onclick: move |_| {
                            let pin = new_pin();
                            if !pin.trim().is_empty() {
                                state.save_pin(Some(pin));
                                new_pin.set(String::new());
                            }
                        },
                        "Save PIN"
                    }
                    if has_pin {
                        button {
                            style: "background: none; border: 1px solid {colors.border}; color: {colors.text_primary}; border-radius: 8px; padding: 8px 14px; cursor: pointer;",
                            onclick: move |_| state.save_pin(None),
                            "Remove PIN"
                        }
                    }
                }
            }

            div {
                style: "{card}",
                h3 { style: "margin-top: 0;", "Account" }
                p { style: "color: {colors.text_secondary};", "{account}" }
                button {
                    style: "{primary} background: {colors.error};",
                    onclick: move |_| state.send(Command::SignOut),
                    "Sign out"
                }
            }
        }
    }
}

#[component]
fn CurrencyOption(currency: Currency, selected: bool) -> Element {
    let code = currency.code();
    let symbol = currency.symbol();
    rsx! {
        option { value: "{code}", selected: selected, "{code} ({symbol})" }
    }
}
