//! Async HTTP clients for fetching license data from upstream package registries.
//!
//! Each module exposes a single `fetch_license(client, name, version)` function
//! that returns `Ok(Some(license))` on success, `Ok(None)` when the package is
//! unknown to the registry or declares no license, and `Err` on network
//! failures or unexpected HTTP statuses. They back
//! [`RegistryDetector`](crate::detector::registry::RegistryDetector).

use anyhow::{bail, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;

pub mod crates_io;
pub mod npm;
pub mod pypi;

const USER_AGENT: &str = concat!(
    "license-warden/",
    env!("CARGO_PKG_VERSION"),
    " (license compliance tool)"
);

/// GET `url` as JSON. A 404 is `Ok(None)`; any other non-success status is an error.
async fn get_json(client: &Client, url: &str) -> Result<Option<Value>> {
    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        bail!("{} answered HTTP {}", url, status);
    }

    Ok(Some(response.json().await?))
}

/// A non-empty string field.
fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
