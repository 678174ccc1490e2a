use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{Detection, DetectionError, LicenseDetector};
use crate::manifest::{Ecosystem, ManifestEntry};
use crate::models::Package;
use crate::registry;

/// Looks packages up in their ecosystem's public registry.
pub struct RegistryDetector {
    client: Client,
    ecosystems: HashMap<Package, Ecosystem>,
}

impl RegistryDetector {
    pub fn new(entries: &[ManifestEntry], request_timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        let ecosystems = entries
            .iter()
            .filter_map(|e| e.ecosystem.map(|eco| (e.package.clone(), eco)))
            .collect();
        Ok(Self { client, ecosystems })
    }
}

#[async_trait]
impl LicenseDetector for RegistryDetector {
    async fn detect(&self, package: &Package) -> Result<Detection, DetectionError> {
        let Some(ecosystem) = self.ecosystems.get(package) else {
            return Err(DetectionError::Unsupported(
                "no registry known for this package".to_string(),
            ));
        };

        let (name, version) = (package.id(), package.version());
        let fetched = match ecosystem {
            Ecosystem::Rust => registry::crates_io::fetch_license(&self.client, name, version).await,
            Ecosystem::Python => registry::pypi::fetch_license(&self.client, name, version).await,
            Ecosystem::Node => registry::npm::fetch_license(&self.client, name, version).await,
        };

        match fetched {
            Ok(Some(raw)) => Ok(Detection::normalized(&raw, "registry")),
            Ok(None) => Err(DetectionError::Registry(format!(
                "{} registry has no license for {}@{}",
                ecosystem, name, version
            ))),
            Err(e) => Err(DetectionError::Registry(format!("{:#}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_ecosystem_is_unsupported() {
        let entries = vec![ManifestEntry {
            package: Package::new("internal-tool", "1.0", "WebApp").unwrap(),
            ecosystem: None,
            declared_license: None,
        }];
        let detector = RegistryDetector::new(&entries, Duration::from_secs(1)).unwrap();
        let err = detector.detect(&entries[0].package).await.unwrap_err();
        assert!(matches!(err, DetectionError::Unsupported(_)));
        assert_eq!(
            err.to_string(),
            "unsupported package: no registry known for this package"
        );
    }
}
