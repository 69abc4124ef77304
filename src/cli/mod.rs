mod availability;
mod booking;

pub use availability::*;
pub use booking::*;

use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn print<T: Serialize + std::fmt::Display>(&self, value: &T) {
        match self {
            OutputFormat::Human => println!("{}", value),
            OutputFormat::Json => match serde_json::to_string_pretty(value) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to encode output: {}", e),
            },
        }
    }
}

/// Client handle for talking to a running slotd server
pub struct ApiClient {
    http: reqwest::Client,
    server_url: String,
}

impl ApiClient {
    pub fn new(server_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}
