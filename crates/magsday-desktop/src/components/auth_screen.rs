//! Sign-in and sign-up screen

use dioxus::prelude::*;

use crate::state::{AppState, Command};
use crate::theme::{button_style, card_style, input_style};

#[component]
pub fn AuthScreen() -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut show_password = use_signal(|| false);
    let mut is_login = use_signal(|| true);
    let auth_error = state.dashboard.read().auth_error.clone();

    let submit = move |_: MouseEvent| {
        let email = email().trim().to_string();
        let password = password();
        let command = if is_login() {
            Command::SignIn { email, password }
        } else {
            Command::SignUp { email, password }
        };
        state.send(command);
    };

    let input_type = if show_password() { "text" } else { "password" };
    let card = card_style(colors);
    let field = input_style(colors);
    let primary = button_style(colors);

    rsx! {
        div {
            style: "display: flex; align-items: center; justify-content: center; min-height: 100vh; padding: 16px;",
            div {
                style: "{card} width: 100%; max-width: 360px;",
                div {
                    style: "text-align: center; margin-bottom: 24px;",
                    h1 { style: "margin: 0;", "Mags' Day" }
                    p { style: "color: {colors.text_secondary};", "Your personal dashboard." }
                }

                label { style: "font-size: 13px; color: {colors.text_secondary};", "Email" }
                input {
                    r#type: "email",
                    style: "{field}",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }

                div {
                    style: "margin-top: 12px;",
                    label { style: "font-size: 13px; color: {colors.text_secondary};", "Password" }
                    div {
                        style: "display: flex; gap: 8px; align-items: center;",
                        input {
                            r#type: "{input_type}",
                            style: "{field}",
                            value: "{password}",
                            oninput: move |evt| password.set(evt.value()),
                        }
                        button {
                            style: "background: none; border: none; color: {colors.text_secondary}; cursor: pointer;",
                            onclick: move |_| show_password.set(!show_password()),
                            if show_password() { "Hide" } else { "Show" }
                        }
                    }
                }

                if let Some(error) = auth_error {
                    p { style: "color: {colors.error}; font-size: 13px;", "{error}" }
                }

                button {
                    style: "{primary} width: 100%; margin-top: 16px;",
                    onclick: submit,
                    if is_login() { "Sign In" } else { "Sign Up" }
                }

                p {
                    style: "text-align: center; font-size: 13px; margin-top: 20px; color: {colors.text_secondary};",
                    if is_login() { "Don't have an account?" } else { "Already have an account?" }
                    button {
                        style: "background: none; border: none; color: {colors.accent}; font-weight: 600; cursor: pointer;",
                        onclick: move |_| is_login.set(!is_login()),
                        if is_login() { "Sign up" } else { "Sign in" }
                    }
                }
            }
        }
    }
}
