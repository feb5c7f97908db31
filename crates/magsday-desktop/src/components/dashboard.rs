//! Dashboard panel: today's overview, the daily note and AI assist

use dioxus::prelude::*;

use magsday_core::assist::AssistRequest;

use super::note_card::DailyNoteCard;
use crate::state::{AppState, Command};
use crate::theme::{button_style, card_style};

#[component]
pub fn DashboardPanel() -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let card = card_style(colors);
    let primary = button_style(colors);

    let dashboard = state.dashboard.read();
    let greeting = dashboard
        .auth
        .identity()
        .map(|identity| identity.display_name().to_string())
        .unwrap_or_default();
    let date = dashboard.today.format("%A, %B %-d").to_string();
    let summary = dashboard.summary();
    let outstanding_total = dashboard.format_amount(summary.outstanding_total);
    let outstanding_count = summary.outstanding.len();
    let triumphs = summary.accomplishment_count;
    let today_items: Vec<(String, String, String)> = summary
        .today_schedules
        .iter()
        .map(|record| {
            (
                record.id.clone(),
                record.data.time.clone().unwrap_or_else(|| "All day".to_string()),
                record.data.description.clone(),
            )
        })
        .collect();
    let assist_loading = dashboard.assist.loading;
    drop(dashboard);

    rsx! {
        div {
            h1 { style: "margin: 0;", "Hello, {greeting}" }
            p { style: "margin-top: 4px; color: {colors.text_secondary};", "{date}" }

            div {
                style: "display: grid; grid-template-columns: 1fr 1fr; gap: 12px; margin: 16px 0;",
                div {
                    style: "{card}",
                    div { style: "font-size: 12px; color: {colors.text_secondary};", "Outstanding" }
                    div { style: "font-size: 20px; font-weight: 700;", "{outstanding_total}" }
                    div { style: "font-size: 12px; color: {colors.text_muted};", "{outstanding_count} unpaid" }
                }
                div {
                    style: "{card}",
                    div { style: "font-size: 12px; color: {colors.text_secondary};", "Triumphs" }
                    div { style: "font-size: 20px; font-weight: 700;", "{triumphs}" }
                    div { style: "font-size: 12px; color: {colors.text_muted};", "recorded so far" }
                }
            }

            div {
                style: "{card}",
                h3 { style: "margin-top: 0;", "Today" }
                if today_items.is_empty() {
                    p { style: "color: {colors.text_muted};", "Nothing scheduled today." }
                }
                for (id, time, description) in today_items {
                    div {
                        key: "{id}",
                        style: "display: flex; gap: 12px; padding: 6px 0; border-bottom: 1px solid {colors.border};",
                        span { style: "min-width: 64px; color: {colors.accent}; font-weight: 600;", "{time}" }
                        span { "{description}" }
                    }
                }
            }

            DailyNoteCard {}

            div {
                style: "{card}",
                h3 { style: "margin-top: 0;", "AI assist" }
                div {
                    style: "display: flex; gap: 8px; flex-wrap: wrap;",
                    button {
                        style: "{primary}",
                        disabled: assist_loading,
                        onclick: move |_| state.send(Command::Assist(AssistRequest::PlanDay)),
                        "Plan my day"
                    }
                    button {
                        style: "{primary}",
                        disabled: assist_loading,
                        onclick: move |_| state.send(Command::Assist(AssistRequest::CelebrateWins)),
                        "Celebrate my wins"
                    }
                }
            }
        }
    }
}
