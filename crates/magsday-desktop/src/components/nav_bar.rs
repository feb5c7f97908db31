//! Bottom navigation between views

use dioxus::prelude::*;

use magsday_core::View;

use crate::state::AppState;

#[component]
pub fn NavBar() -> Element {
    let state = use_context::<AppState>();
    let colors = state.palette();
    let current = state.dashboard.read().view;

    rsx! {
        nav {
            style: "position: fixed; bottom: 0; left: 0; right: 0; height: 72px; display: flex; justify-content: space-around; align-items: center; background: {colors.bg_secondary}; border-top: 1px solid {colors.border};",
            for view in View::ALL {
                NavButton { key: "{view:?}", view: view, active: view == current }
            }
        }
    }
}

#[component]
fn NavButton(view: View, active: bool) -> Element {
    let mut state = use_context::<AppState>();
    let colors = state.palette();
    let color = if active { colors.accent } else { colors.text_secondary };
    let label = view.label();

    rsx! {
        button {
            style: "background: none; border: none; color: {color}; font-size: 12px; cursor: pointer; font-weight: 600;",
            onclick: move |_| state.dashboard.write().set_view(view),
            "{label}"
        }
    }
}
