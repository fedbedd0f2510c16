// Blocking HTTP client shared by the sheet fetch and the directory lookups.
use reqwest::blocking::Client;
use std::time::Duration;

/// Build a client whose per-request timeout is exactly `timeout`. `None`
/// disables it; reqwest's blocking client would otherwise default to 30s.
pub fn http_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}
