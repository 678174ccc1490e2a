use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{Ecosystem, ManifestEntry};
use crate::models::Package;

/// One entry of a `--packages` file.
///
/// ```json
/// [ { "id": "left-pad", "version": "1.0.0", "originProject": "WebApp", "license": "MIT", "ecosystem": "node" } ]
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedPackage {
    id: String,
    #[serde(default = "any_version")]
    version: String,
    origin_project: String,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    ecosystem: Option<ListedEcosystem>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ListedEcosystem {
    Rust,
    Python,
    Node,
}

impl From<ListedEcosystem> for Ecosystem {
    fn from(e: ListedEcosystem) -> Self {
        match e {
            ListedEcosystem::Rust => Ecosystem::Rust,
            ListedEcosystem::Python => Ecosystem::Python,
            ListedEcosystem::Node => Ecosystem::Node,
        }
    }
}

fn any_version() -> String {
    "*".to_string()
}

/// Read a pre-resolved package list, for build systems without a built-in reader.
pub fn read(file: &Path) -> Result<Vec<ManifestEntry>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading package list {}", file.display()))?;
    parse(&content).with_context(|| format!("parsing package list {}", file.display()))
}

fn parse(content: &str) -> Result<Vec<ManifestEntry>> {
    let listed: Vec<ListedPackage> = serde_json::from_str(content)?;
    listed
        .into_iter()
        .enumerate()
        .map(|(i, p)| -> Result<ManifestEntry> {
            let package = Package::new(p.id, p.version, p.origin_project)
                .with_context(|| format!("entry #{}", i))?;
            Ok(ManifestEntry {
                package,
                ecosystem: p.ecosystem.map(Into::into),
                declared_license: p.license,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let entries = parse(
            r#"[
  { "id": "left-pad", "version": "1.0.0", "originProject": "WebApp", "license": "MIT", "ecosystem": "node" },
  { "id": "acme-internal-lib", "originProject": "WebApp" }
]"#,
        )
        .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ecosystem, Some(Ecosystem::Node));
        assert_eq!(entries[0].declared_license.as_deref(), Some("MIT"));
        assert_eq!(entries[1].package.version(), "*");
        assert_eq!(entries[1].ecosystem, None);
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = parse(r#"[ { "id": "", "originProject": "WebApp" } ]"#).unwrap_err();
        assert!(err.to_string().contains("entry #0"));
    }
}
