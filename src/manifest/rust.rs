use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{directory_name, Ecosystem, ManifestEntry};
use crate::models::Package;

#[derive(Debug, Deserialize)]
struct CargoLock {
    #[serde(default)]
    package: Vec<CargoLockPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoLockPackage {
    name: String,
    version: String,
    /// Packages without a `source` field are local workspace members.
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CargoToml {
    package: Option<CargoTomlPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoTomlPackage {
    name: String,
}

/// Reads `Cargo.lock`. Cargo.lock carries no license data, so entries have no
/// declared license; use `--online` to look them up on crates.io.
pub struct RustReader;

impl super::ManifestReader for RustReader {
    fn read(&self, path: &Path) -> Result<Vec<ManifestEntry>> {
        let lock_path = path.join("Cargo.lock");
        if !lock_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&lock_path)
            .with_context(|| format!("reading {}", lock_path.display()))?;
        let lock: CargoLock = toml::from_str(&content)
            .with_context(|| format!("parsing {}", lock_path.display()))?;
        let origin = project_name(path, &lock);

        lock.package
            .into_iter()
            .filter(|p| p.source.is_some())
            .map(|p| -> Result<ManifestEntry> {
                Ok(ManifestEntry {
                    package: Package::new(p.name, p.version, origin.clone())?,
                    ecosystem: Some(Ecosystem::Rust),
                    declared_license: None,
                })
            })
            .collect()
    }
}

/// `[package].name` from `Cargo.toml`, else the single local lockfile member,
/// else the directory name.
fn project_name(path: &Path, lock: &CargoLock) -> String {
    let from_manifest = std::fs::read_to_string(path.join("Cargo.toml"))
        .ok()
        .and_then(|c| toml::from_str::<CargoToml>(&c).ok())
        .and_then(|m| m.package)
        .map(|p| p.name);
    if let Some(name) = from_manifest {
        return name;
    }

    let mut members = lock.package.iter().filter(|p| p.source.is_none());
    match (members.next(), members.next()) {
        (Some(only), None) => only.name.clone(),
        _ => directory_name(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestReader;

    const LOCK: &str = r#"
version = 3

[[package]]
name = "my-app"
version = "0.1.0"

[[package]]
name = "serde"
version = "1.0.150"
source = "registry+https://github.com/rust-lang/crates.io-index"
checksum = "abc123"

[[package]]
name = "tokio"
version = "1.25.0"
source = "registry+https://github.com/rust-lang/crates.io-index"
checksum = "def456"
"#;

    #[test]
    fn test_read_cargo_lock() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.lock"), LOCK).unwrap();

        let entries = RustReader.read(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].package.id(), "serde");
        assert_eq!(entries[1].package.id(), "tokio");
        // single local member names the project
        assert_eq!(entries[0].package.origin_project(), "my-app");
        assert!(entries.iter().all(|e| e.declared_license.is_none()));
    }

    #[test]
    fn test_cargo_toml_name_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.lock"), LOCK).unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"web-app\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();

        let entries = RustReader.read(dir.path()).unwrap();
        assert_eq!(entries[0].package.origin_project(), "web-app");
    }

    #[test]
    fn test_missing_lockfile() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RustReader.read(dir.path()).unwrap().is_empty());
    }
}
