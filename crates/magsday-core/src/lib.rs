//! magsday-core - Core library for Mags' Day
//!
//! This crate contains the models, backend clients, session manager, live
//! synchronizer and dashboard state used by the Mags' Day desktop app.

pub mod assist;
pub mod auth;
pub mod config;
pub mod driver;
pub mod error;
pub mod gate;
pub mod models;
pub mod session;
pub mod state;
pub mod store;
pub mod sync;
pub mod util;
pub mod view;

pub use config::AppConfig;
pub use driver::{Driver, Event};
pub use error::{Error, Result};
pub use session::SessionManager;
pub use state::DashboardState;
pub use sync::{Change, Synchronizer, WriteRequest};
pub use view::View;

#[cfg(test)]
mod tests;
