pub mod calendar;
pub mod cli;
pub mod models;
pub mod scheduling;
pub mod server;

pub use models::*;

/// Default server URL for the slotd API
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Environment variable overriding the server URL for CLI commands
pub const SERVER_URL_ENV: &str = "SLOTD_SERVER";
