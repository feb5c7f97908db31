//! Shown instead of the app when startup configuration is unusable.

use dioxus::prelude::*;

use magsday_core::config::{ENV_APP_ID, ENV_FIREBASE_CONFIG};

#[component]
pub fn ConfigNotice(message: String) -> Element {
    rsx! {
        div {
            style: "max-width: 420px; margin: 80px auto; padding: 24px; border-radius: 16px; border: 1px solid #f87171;",
            h2 { style: "margin-top: 0;", "Mags' Day can't start" }
            p { "{message}" }
            p {
                style: "opacity: 0.7; font-size: 13px;",
                "Set {ENV_FIREBASE_CONFIG} (and optionally {ENV_APP_ID}) in the environment or a .env file, then restart."
            }
        }
    }
}
