//! HTTP endpoint handlers.

pub mod status;
pub mod webhook;

pub use status::{health_check, home};
pub use webhook::{server_error, webhook};
