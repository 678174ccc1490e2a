use std::collections::HashMap;

use async_trait::async_trait;

use super::{Detection, DetectionError, LicenseDetector};
use crate::manifest::ManifestEntry;
use crate::models::Package;

/// Answers with the license a manifest declared for the package.
#[derive(Debug, Default)]
pub struct DeclaredDetector {
    declared: HashMap<Package, String>,
}

impl DeclaredDetector {
    pub fn from_entries(entries: &[ManifestEntry]) -> Self {
        let declared = entries
            .iter()
            .filter_map(|e| {
                let license = e.declared_license.as_deref()?.trim();
                (!license.is_empty()).then(|| (e.package.clone(), license.to_string()))
            })
            .collect();
        Self { declared }
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}

#[async_trait]
impl LicenseDetector for DeclaredDetector {
    async fn detect(&self, package: &Package) -> Result<Detection, DetectionError> {
        self.declared
            .get(package)
            .map(|raw| Detection::normalized(raw, "declared"))
            .ok_or(DetectionError::NoLicense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Ecosystem;

    fn entry(id: &str, license: Option<&str>) -> ManifestEntry {
        ManifestEntry {
            package: Package::new(id, "1.0.0", "WebApp").unwrap(),
            ecosystem: Some(Ecosystem::Node),
            declared_license: license.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_declared_license() {
        let entries = vec![entry("left-pad", Some("The MIT License")), entry("bare", None)];
        let detector = DeclaredDetector::from_entries(&entries);
        assert_eq!(detector.len(), 1);

        let found = detector.detect(&entries[0].package).await.unwrap();
        assert_eq!(found.license, "MIT");
        assert_eq!(found.diagnostics.len(), 1);

        assert!(matches!(
            detector.detect(&entries[1].package).await,
            Err(DetectionError::NoLicense)
        ));
    }

    #[tokio::test]
    async fn test_blank_declaration_ignored() {
        let entries = vec![entry("blank", Some("   "))];
        let detector = DeclaredDetector::from_entries(&entries);
        assert!(detector.is_empty());
    }
}
