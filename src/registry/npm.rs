use anyhow::Result;
use reqwest::Client;
use serde_json::Value;

/// Fetch the license of an npm package version from the npm registry.
///
/// A version of `*` resolves through `dist-tags.latest`.
pub async fn fetch_license(client: &Client, name: &str, version: &str) -> Result<Option<String>> {
    // Scoped packages need URL encoding: @scope/pkg → %40scope%2Fpkg
    let encoded_name = name.replace('@', "%40").replace('/', "%2F");
    let url = if version == "*" {
        format!("https://registry.npmjs.org/{}", encoded_name)
    } else {
        format!("https://registry.npmjs.org/{}/{}", encoded_name, version)
    };

    let Some(data) = super::get_json(client, &url).await? else {
        return Ok(None);
    };

    let manifest = if version == "*" {
        data.get("dist-tags")
            .and_then(|d| d.get("latest"))
            .and_then(Value::as_str)
            .and_then(|latest| data.get("versions").and_then(|vs| vs.get(latest)))
    } else {
        Some(&data)
    };

    Ok(manifest.and_then(license_of))
}

/// Read `license`, accepting the legacy `{ "type": ... }` object and the
/// `licenses` array (joined with `OR`).
pub(crate) fn license_of(manifest: &Value) -> Option<String> {
    match manifest.get("license") {
        Some(Value::String(_)) => return super::non_empty(manifest.get("license")),
        Some(obj @ Value::Object(_)) => return super::non_empty(obj.get("type")),
        _ => {}
    }

    let types: Vec<String> = manifest
        .get("licenses")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|l| super::non_empty(l.get("type")))
        .collect();
    match types.len() {
        0 => None,
        1 => types.into_iter().next(),
        _ => Some(types.join(" OR ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_license_string() {
        assert_eq!(license_of(&json!({ "license": "ISC" })), Some("ISC".into()));
    }

    #[test]
    fn test_legacy_license_object() {
        assert_eq!(
            license_of(&json!({ "license": { "type": "MIT", "url": "http://x" } })),
            Some("MIT".into())
        );
    }

    #[test]
    fn test_legacy_licenses_array() {
        let manifest = json!({ "licenses": [ { "type": "MIT" }, { "type": "Apache-2.0" } ] });
        assert_eq!(license_of(&manifest), Some("MIT OR Apache-2.0".into()));
    }

    #[test]
    fn test_no_license() {
        assert_eq!(license_of(&json!({ "name": "x" })), None);
    }
}
