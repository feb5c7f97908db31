//! Main application component

use std::sync::Arc;

use dioxus::prelude::*;
use futures::StreamExt;

use magsday_core::assist::{GeminiClient, TextGenerator};
use magsday_core::auth::AuthState;
use magsday_core::{DashboardState, View};

use crate::components::{
    AccomplishmentsPanel, AssistModal, AuthScreen, ConfigNotice, DashboardPanel, NavBar,
    PaymentsPanel, PinModal, SchedulesPanel, SettingsPanel,
};
use crate::services::{load_backend, Backend};
use crate::state::{AppState, Command};

/// Root application component
#[component]
pub fn App() -> Element {
    let today = use_hook(|| chrono::Local::now().date_naive());
    let dashboard = use_signal(|| DashboardState::new(today));
    let mut config_error = use_signal(|| None::<String>);

    let commands = use_coroutine(move |mut commands: UnboundedReceiver<Command>| async move {
        let Backend {
            mut driver,
            session,
            assist,
        } = match load_backend() {
            Ok(backend) => backend,
            Err(error) => {
                tracing::error!("Failed to start backend: {}", error);
                config_error.set(Some(error.to_string()));
                return;
            }
        };

        let mut dashboard = dashboard;
        let mut state = dashboard.peek().clone();
        driver.prime(&mut state).await;
        dashboard.set(state);

        loop {
            tokio::select! {
                command = commands.next() => {
                    let Some(command) = command else {
                        tracing::debug!("Command channel closed");
                        break;
                    };
                    match command {
                        Command::SignIn { email, password } => {
                            let session = session.clone();
                            spawn(async move {
                                if let Err(error) = session.sign_in(&email, &password).await {
                                    dashboard.write().set_auth_error(&error);
                                }
                            });
                        }
                        Command::SignUp { email, password } => {
                            let session = session.clone();
                            spawn(async move {
                                if let Err(error) = session.sign_up(&email, &password).await {
                                    dashboard.write().set_auth_error(&error);
                                }
                            });
                        }
                        Command::SignOut => {
                            let session = session.clone();
                            spawn(async move {
                                if let Err(error) = session.sign_out().await {
                                    tracing::warn!("Sign-out failed: {}", error);
                                }
                            });
                        }
                        Command::Write { uid, request } => match driver.writer_for(&uid) {
                            Ok(writer) => writer.spawn(request),
                            Err(error) => tracing::warn!("Dropping write: {}", error),
                        },
                        Command::Assist(request) => {
                            run_assist(dashboard, Arc::clone(&assist), request);
                        }
                    }
                }
                event = driver.next_event() => {
                    driver.apply(event, &mut dashboard.write());
                }
            }
        }
    });

    use_context_provider(|| AppState {
        dashboard,
        commands,
    });

    let state = dashboard.read();
    let colors = crate::theme::palette(state.theme());
    let theme_attr = state.theme().as_str();

    let body = if let Some(message) = config_error() {
        rsx! { ConfigNotice { message: message } }
    } else {
        match &state.auth {
            AuthState::Pending => rsx! {
                div {
                    style: "padding: 48px; text-align: center; color: {colors.text_secondary};",
                    "Loading..."
                }
            },
            AuthState::SignedOut => rsx! { AuthScreen {} },
            AuthState::SignedIn(_) => {
                let panel = match state.view {
                    View::Dashboard => rsx! { DashboardPanel {} },
                    View::Schedules => rsx! { SchedulesPanel {} },
                    View::Payments => rsx! { PaymentsPanel {} },
                    View::Accomplishments => rsx! { AccomplishmentsPanel {} },
                    View::Settings => rsx! { SettingsPanel {} },
                };
                rsx! {
                    div {
                        style: "display: flex; flex-direction: column; min-height: 100vh;",
                        main {
                            style: "flex: 1; padding: 24px 16px 100px; overflow-y: auto;",
                            {panel}
                        }
                        NavBar {}
                    }
                    if state.gate.is_prompt_open() {
                        PinModal {}
                    }
                    if state.assist.modal_open {
                        AssistModal {}
                    }
                }
            }
        }
    };

    rsx! {
        div {
            class: "app-container",
            "data-theme": "{theme_attr}",
            style: "
                min-height: 100vh;
                font-family: system-ui, -apple-system, sans-serif;
                background: {colors.bg_primary};
                color: {colors.text_primary};
            ",
            {body}
        }
    }
}

/// Start an assist request unless one is already running.
fn run_assist(
    mut dashboard: Signal<DashboardState>,
    assist: Arc<GeminiClient>,
    request: magsday_core::assist::AssistRequest,
) {
    let Some(ticket) = dashboard.write().assist.begin(request) else {
        return;
    };
    let prompt = dashboard.read().assist_prompt(request);
    spawn(async move {
        let result = assist.generate(&prompt).await;
        dashboard.write().assist.finish(ticket, result);
    });
}
