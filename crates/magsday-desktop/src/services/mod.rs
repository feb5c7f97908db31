//! Backend services for the desktop app.

mod backend;
mod session_store;

pub use backend::{load_backend, Backend};
pub use session_store::KeyringSessions;
