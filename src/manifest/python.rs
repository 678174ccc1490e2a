use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use super::{directory_name, Ecosystem, ManifestEntry};
use crate::models::Package;

/// Reader for Python projects.
///
/// Searches for manifests in priority order:
/// `Pipfile.lock` (pinned) → `requirements.txt` → `pyproject.toml`.
/// Results are deduplicated by package name (case-insensitive).
pub struct PythonReader;

impl super::ManifestReader for PythonReader {
    fn read(&self, path: &Path) -> Result<Vec<ManifestEntry>> {
        let pyproject = read_pyproject(path);
        let origin = pyproject
            .as_ref()
            .and_then(|p| p.project.as_ref())
            .and_then(|p| p.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| directory_name(path));

        let mut pins: Vec<(String, String)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let pipfile_lock = path.join("Pipfile.lock");
        if pipfile_lock.exists() {
            match parse_pipfile_lock(&pipfile_lock) {
                Ok(parsed) => extend_unique(&mut pins, &mut seen, parsed),
                Err(e) => warn!(file = %pipfile_lock.display(), error = %e, "skipping unreadable lockfile"),
            }
        }

        let requirements = path.join("requirements.txt");
        if requirements.exists() {
            match parse_requirements_txt(&requirements) {
                Ok(parsed) => extend_unique(&mut pins, &mut seen, parsed),
                Err(e) => warn!(file = %requirements.display(), error = %e, "skipping unreadable requirements"),
            }
        }

        if let Some(pyproject) = &pyproject {
            match pyproject_dependencies(pyproject) {
                Ok(parsed) => extend_unique(&mut pins, &mut seen, parsed),
                Err(e) => warn!(error = %e, "skipping pyproject.toml dependencies"),
            }
        }

        pins.into_iter()
            .map(|(name, version)| -> Result<ManifestEntry> {
                Ok(ManifestEntry {
                    package: Package::new(name, version, origin.clone())?,
                    ecosystem: Some(Ecosystem::Python),
                    declared_license: None,
                })
            })
            .collect()
    }
}

fn extend_unique(
    pins: &mut Vec<(String, String)>,
    seen: &mut HashSet<String>,
    parsed: Vec<(String, String)>,
) {
    for (name, version) in parsed {
        if seen.insert(name.to_lowercase()) {
            pins.push((name, version));
        }
    }
}

/// Parse `requirements.txt` — only pinned `name==version` lines.
fn parse_requirements_txt(path: &Path) -> Result<Vec<(String, String)>> {
    let content = std::fs::read_to_string(path)?;
    let re = Regex::new(r"^([A-Za-z0-9_\-\.]+)(?:\[[^\]]*\])?\s*==\s*([^\s;]+)")?;
    let mut deps = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        if let Some(caps) = re.captures(line) {
            deps.push((caps[1].to_string(), caps[2].to_string()));
        }
    }

    Ok(deps)
}

/// Parse `Pipfile.lock` — JSON with `default` and `develop` sections.
fn parse_pipfile_lock(path: &Path) -> Result<Vec<(String, String)>> {
    let content = std::fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    let mut deps = Vec::new();

    for section in &["default", "develop"] {
        if let Some(pkgs) = json.get(section).and_then(|v| v.as_object()) {
            for (name, info) in pkgs {
                let version = info
                    .get("version")
                    .and_then(|v| v.as_str())
                    .unwrap_or("*")
                    .trim_start_matches("==")
                    .to_string();
                deps.push((name.clone(), version));
            }
        }
    }

    Ok(deps)
}

#[derive(Debug, Deserialize)]
struct Pyproject {
    project: Option<PyprojectProject>,
}

#[derive(Debug, Deserialize)]
struct PyprojectProject {
    name: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

fn read_pyproject(path: &Path) -> Option<Pyproject> {
    let file = path.join("pyproject.toml");
    let content = std::fs::read_to_string(&file).ok()?;
    match toml::from_str(&content) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(file = %file.display(), error = %e, "skipping unparsable pyproject.toml");
            None
        }
    }
}

/// `[project].dependencies`; unpinned requirements get version `*`.
fn pyproject_dependencies(pyproject: &Pyproject) -> Result<Vec<(String, String)>> {
    let re = Regex::new(r"^([A-Za-z0-9_\-\.]+)\s*(?:\[[^\]]*\])?\s*(?:==\s*([^\s;,\[]+))?")?;
    let mut deps = Vec::new();

    if let Some(project) = &pyproject.project {
        for dep_str in &project.dependencies {
            if let Some(caps) = re.captures(dep_str) {
                let version = caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| "*".to_string());
                deps.push((caps[1].to_string(), version));
            }
        }
    }

    Ok(deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestReader;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_requirements_txt() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "# comment").unwrap();
        writeln!(f, "requests[socks]==2.28.1").unwrap();
        writeln!(f, "flask>=2.0.0").unwrap();
        writeln!(f, "numpy==1.24.0 ; python_version >= '3.8'").unwrap();

        let deps = parse_requirements_txt(f.path()).unwrap();
        assert_eq!(
            deps,
            vec![
                ("requests".to_string(), "2.28.1".to_string()),
                ("numpy".to_string(), "1.24.0".to_string()),
            ]
        );
    }

    #[test]
    fn test_reader_prefers_lock_and_names_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Pipfile.lock"),
            r#"{ "default": { "requests": { "version": "==2.31.0" } }, "develop": {} }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "Requests==2.0.0\nidna==3.4\n").unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"billing\"\ndependencies = [\"click\", \"idna==3.6\"]\n",
        )
        .unwrap();

        let entries = PythonReader.read(dir.path()).unwrap();
        let pins: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.package.id(), e.package.version()))
            .collect();
        assert_eq!(
            pins,
            vec![("requests", "2.31.0"), ("idna", "3.4"), ("click", "*")]
        );
        assert!(entries.iter().all(|e| e.package.origin_project() == "billing"));
    }
}
