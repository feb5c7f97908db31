//! Data models for Mags' Day

mod entry;
mod identity;
mod note;
mod settings;

pub use entry::{Accomplishment, Collection, Entity, Payment, Record, Schedule};
pub use identity::Identity;
pub use note::DailyNote;
pub use settings::{Currency, Theme, UserSettings};
