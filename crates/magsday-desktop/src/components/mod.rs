//! UI Components
//!
//! Panels and overlays of the desktop dashboard.

mod accomplishments;
mod assist_modal;
mod auth_screen;
mod config_notice;
mod dashboard;
mod nav_bar;
mod note_card;
mod payments;
mod pin_modal;
mod schedules;
mod settings;

pub use accomplishments::AccomplishmentsPanel;
pub use assist_modal::AssistModal;
pub use auth_screen::AuthScreen;
pub use config_notice::ConfigNotice;
pub use dashboard::DashboardPanel;
pub use nav_bar::NavBar;
pub use payments::PaymentsPanel;
pub use pin_modal::PinModal;
pub use schedules::SchedulesPanel;
pub use settings::SettingsPanel;
