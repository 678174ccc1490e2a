use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::license::spdx;

/// Metadata for one license identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    /// Human-readable name (e.g. `"MIT License"`).
    #[serde(default)]
    pub name: String,
    /// Category used by policy rules (e.g. `"permissive"`, `"copyleft"`).
    pub category: String,
}

/// License identifier → metadata. Loaded once per run, read-only afterwards.
///
/// JSON shape: `{ "licenses": { "MIT": { "name": "MIT License", "category": "permissive" } } }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LicenseCatalog {
    #[serde(default)]
    licenses: BTreeMap<String, LicenseInfo>,
}

impl LicenseCatalog {
    /// Catalog of common SPDX identifiers, used when no catalog file is found.
    pub fn builtin() -> Self {
        let licenses = spdx::builtin_entries()
            .into_iter()
            .map(|(id, name, category)| {
                (
                    id.to_string(),
                    LicenseInfo {
                        name: name.to_string(),
                        category: category.to_string(),
                    },
                )
            })
            .collect();
        Self { licenses }
    }

    /// Parse a catalog JSON document.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    #[cfg(test)]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, LicenseInfo)>,
        S: Into<String>,
    {
        Self {
            licenses: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&LicenseInfo> {
        self.licenses.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.licenses.contains_key(id)
    }

    pub fn category(&self, id: &str) -> Option<&str> {
        self.get(id).map(|info| info.category.as_str())
    }

    pub fn len(&self) -> usize {
        self.licenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_categories() {
        let catalog = LicenseCatalog::builtin();
        assert_eq!(catalog.category("MIT"), Some(spdx::PERMISSIVE));
        assert_eq!(catalog.category("LGPL-2.1"), Some(spdx::WEAK_COPYLEFT));
        assert_eq!(catalog.category("GPL-3.0"), Some(spdx::COPYLEFT));
        assert_eq!(catalog.category("CUSTOM-LICENSE-42"), None);
    }

    #[test]
    fn test_deserialize_document() {
        let json = r#"{
  "licenses": {
    "MIT": { "name": "MIT License", "category": "permissive" },
    "Acme-EULA": { "category": "proprietary" }
  }
}"#;
        let catalog = LicenseCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.category("Acme-EULA"), Some("proprietary"));
        assert_eq!(catalog.get("Acme-EULA").unwrap().name, "");
    }
}
