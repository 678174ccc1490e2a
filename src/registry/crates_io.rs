use anyhow::Result;
use reqwest::Client;
use serde_json::Value;

/// Fetch the license expression of a crate version from crates.io.
pub async fn fetch_license(client: &Client, name: &str, version: &str) -> Result<Option<String>> {
    let url = format!("https://crates.io/api/v1/crates/{}/{}", name, version);
    Ok(super::get_json(client, &url).await?.and_then(|data| extract_license(&data)))
}

fn extract_license(data: &Value) -> Option<String> {
    super::non_empty(data.get("version").and_then(|v| v.get("license")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_license() {
        let data = json!({ "version": { "num": "1.0.150", "license": "MIT OR Apache-2.0" } });
        assert_eq!(extract_license(&data), Some("MIT OR Apache-2.0".to_string()));
    }

    #[test]
    fn test_missing_license() {
        let data = json!({ "version": { "num": "0.1.0", "license": null } });
        assert_eq!(extract_license(&data), None);
    }
}
