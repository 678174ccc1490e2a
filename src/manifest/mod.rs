//! Manifest readers: turn a project's lockfiles and manifests into [`Package`]s.
//!
//! Every reader tags its packages with the project that declared them
//! (`originProject`) and, when the manifest carries one, the declared license
//! string consumed by [`DeclaredDetector`](crate::detector::declared::DeclaredDetector).

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::models::Package;

pub mod node;
pub mod package_list;
pub mod python;
pub mod rust;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    Rust,
    Python,
    Node,
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ecosystem::Rust => write!(f, "Rust"),
            Ecosystem::Python => write!(f, "Python"),
            Ecosystem::Node => write!(f, "Node"),
        }
    }
}

/// One discovered dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub package: Package,
    /// `None` for package lists that don't say which registry a package is from.
    pub ecosystem: Option<Ecosystem>,
    pub declared_license: Option<String>,
}

pub trait ManifestReader {
    fn read(&self, path: &Path) -> Result<Vec<ManifestEntry>>;
}

/// Auto-detect supported ecosystems by scanning for known manifest files.
pub fn detect_ecosystems(path: &Path) -> Vec<Ecosystem> {
    let mut ecosystems = Vec::new();

    if path.join("Cargo.lock").exists() {
        ecosystems.push(Ecosystem::Rust);
    }

    if path.join("requirements.txt").exists()
        || path.join("pyproject.toml").exists()
        || path.join("Pipfile.lock").exists()
    {
        ecosystems.push(Ecosystem::Python);
    }

    if path.join("package.json").exists()
        || path.join("package-lock.json").exists()
        || path.join("yarn.lock").exists()
    {
        ecosystems.push(Ecosystem::Node);
    }

    ecosystems
}

/// Read every ecosystem in `ecosystems` and deduplicate by
/// `(id, version, originProject)`, keeping the first occurrence.
pub fn discover(path: &Path, ecosystems: &[Ecosystem]) -> Result<Vec<ManifestEntry>> {
    let mut entries = Vec::new();
    for ecosystem in ecosystems {
        let found = match ecosystem {
            Ecosystem::Rust => rust::RustReader.read(path)?,
            Ecosystem::Python => python::PythonReader.read(path)?,
            Ecosystem::Node => node::NodeReader.read(path)?,
        };
        debug!(%ecosystem, count = found.len(), "read manifests");
        entries.extend(found);
    }
    Ok(dedup(entries))
}

pub fn dedup(entries: Vec<ManifestEntry>) -> Vec<ManifestEntry> {
    let mut seen: HashSet<Package> = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.package.clone()))
        .collect()
}

/// Name of the directory at `path`, used when a manifest names no project.
pub(crate) fn directory_name(path: &Path) -> String {
    path.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, version: &str, origin: &str, license: Option<&str>) -> ManifestEntry {
        ManifestEntry {
            package: Package::new(id, version, origin).unwrap(),
            ecosystem: Some(Ecosystem::Node),
            declared_license: license.map(str::to_string),
        }
    }

    #[test]
    fn test_dedup_keeps_first() {
        let entries = vec![
            entry("left-pad", "1.0.0", "WebApp", Some("MIT")),
            entry("left-pad", "1.0.0", "WebApp", None),
            entry("left-pad", "1.0.0", "Admin", None),
            entry("left-pad", "1.0.1", "WebApp", None),
        ];
        let out = dedup(entries);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].declared_license.as_deref(), Some("MIT"));
    }

    #[test]
    fn test_detect_ecosystems() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.lock"), "version = 3\n").unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        assert_eq!(
            detect_ecosystems(dir.path()),
            vec![Ecosystem::Rust, Ecosystem::Node]
        );
    }

    #[test]
    fn test_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("WebApp");
        std::fs::create_dir(&project).unwrap();
        assert_eq!(directory_name(&project), "WebApp");
    }
}
