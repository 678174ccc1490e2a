use anyhow::Result;
use reqwest::Client;
use serde_json::Value;

/// Fetch the license of a Python distribution from PyPI.
///
/// Prefers the PEP 639 `license_expression`, then the free-text `license`
/// field, then a single `License ::` trove classifier.
pub async fn fetch_license(client: &Client, name: &str, version: &str) -> Result<Option<String>> {
    let url = if version == "*" {
        format!("https://pypi.org/pypi/{}/json", name)
    } else {
        format!("https://pypi.org/pypi/{}/{}/json", name, version)
    };

    Ok(super::get_json(client, &url)
        .await?
        .and_then(|data| data.get("info").and_then(license_of)))
}

fn license_of(info: &Value) -> Option<String> {
    if let Some(expr) = super::non_empty(info.get("license_expression")) {
        return Some(expr);
    }
    // Some projects paste the whole license text here; only keep short values
    if let Some(text) = super::non_empty(info.get("license")).filter(|l| !l.contains('\n')) {
        return Some(text);
    }

    let from_classifiers: Vec<&str> = info
        .get("classifiers")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(Value::as_str)
        .filter(|c| c.starts_with("License ::"))
        .filter_map(|c| c.rsplit(" :: ").next())
        .collect();
    match from_classifiers.as_slice() {
        [single] => Some(single.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefers_license_expression() {
        let info = json!({ "license_expression": "BSD-3-Clause", "license": "BSD" });
        assert_eq!(license_of(&info), Some("BSD-3-Clause".into()));
    }

    #[test]
    fn test_free_text_license() {
        assert_eq!(license_of(&json!({ "license": "MIT" })), Some("MIT".into()));
    }

    #[test]
    fn test_full_text_falls_back_to_classifier() {
        let info = json!({
            "license": "Copyright (c) ...\nPermission is hereby granted",
            "classifiers": ["Programming Language :: Python", "License :: OSI Approved :: MIT License"]
        });
        assert_eq!(license_of(&info), Some("MIT License".into()));
    }

    #[test]
    fn test_ambiguous_classifiers() {
        let info = json!({
            "classifiers": [
                "License :: OSI Approved :: MIT License",
                "License :: OSI Approved :: Apache Software License"
            ]
        });
        assert_eq!(license_of(&info), None);
    }
}
