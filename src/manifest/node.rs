use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use super::{directory_name, Ecosystem, ManifestEntry};
use crate::models::Package;
use crate::registry::npm;

/// Reads `package-lock.json`, then `yarn.lock`, falling back to the declared
/// ranges in `package.json` only when neither lockfile yields anything.
pub struct NodeReader;

/// `(name, version, declared license)` before the origin project is attached.
type Found = (String, String, Option<String>);

impl super::ManifestReader for NodeReader {
    fn read(&self, path: &Path) -> Result<Vec<ManifestEntry>> {
        let mut found: Vec<Found> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut push_all = |parsed: Vec<Found>, found: &mut Vec<Found>| {
            for d in parsed {
                if seen.insert(format!("{}@{}", d.0, d.1)) {
                    found.push(d);
                }
            }
        };

        // package-lock.json (most precise — pinned versions with optional license field)
        let lock = path.join("package-lock.json");
        if lock.exists() {
            match parse_package_lock_json(&lock, path) {
                Ok(parsed) => push_all(parsed, &mut found),
                Err(e) => warn!(file = %lock.display(), error = %e, "skipping unreadable lockfile"),
            }
        }

        let yarn = path.join("yarn.lock");
        if yarn.exists() {
            match parse_yarn_lock(&yarn) {
                Ok(parsed) => push_all(parsed, &mut found),
                Err(e) => warn!(file = %yarn.display(), error = %e, "skipping unreadable lockfile"),
            }
        }

        // package.json (no pinned versions, fall back to declared range)
        let pkg = path.join("package.json");
        if pkg.exists() && found.is_empty() {
            match parse_package_json(&pkg) {
                Ok(parsed) => push_all(parsed, &mut found),
                Err(e) => warn!(file = %pkg.display(), error = %e, "skipping unreadable manifest"),
            }
        }

        let origin = project_name(path);
        found
            .into_iter()
            .filter(|(name, _, _)| !name.is_empty())
            .map(|(name, version, license)| -> Result<ManifestEntry> {
                Ok(ManifestEntry {
                    package: Package::new(name, version, origin.clone())?,
                    ecosystem: Some(Ecosystem::Node),
                    declared_license: license,
                })
            })
            .collect()
    }
}

/// `name` from `package.json`, else the directory name.
fn project_name(path: &Path) -> String {
    std::fs::read_to_string(path.join("package.json"))
        .ok()
        .and_then(|c| serde_json::from_str::<Value>(&c).ok())
        .and_then(|json| json.get("name").and_then(Value::as_str).map(str::to_string))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| directory_name(path))
}

/// Parse `package-lock.json` v2/v3 (the `packages` map).
/// Falls back to `node_modules/{pkg}/package.json` for the license.
fn parse_package_lock_json(lock_path: &Path, project_root: &Path) -> Result<Vec<Found>> {
    let content = std::fs::read_to_string(lock_path)?;
    let json: Value = serde_json::from_str(&content)?;
    let mut deps = Vec::new();

    if let Some(packages) = json.get("packages").and_then(|v| v.as_object()) {
        for (pkg_path, info) in packages {
            // Root entry has an empty key; workspace links carry no version
            if pkg_path.is_empty() || info.get("link").and_then(Value::as_bool) == Some(true) {
                continue;
            }

            let version = info
                .get("version")
                .and_then(|v| v.as_str())
                .unwrap_or("*")
                .to_string();

            // "node_modules/a/node_modules/@scope/b" → "@scope/b"
            let name = pkg_path
                .rsplit_once("node_modules/")
                .map(|(_, n)| n)
                .unwrap_or(pkg_path.as_str())
                .to_string();

            let license = npm::license_of(info).or_else(|| {
                let nm_pkg_json = project_root.join(pkg_path).join("package.json");
                read_license_from_package_json(&nm_pkg_json)
            });

            deps.push((name, version, license));
        }
    }

    Ok(deps)
}

fn read_license_from_package_json(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let json: Value = serde_json::from_str(&content).ok()?;
    npm::license_of(&json)
}

/// Parse `yarn.lock` — custom line-based format.
fn parse_yarn_lock(path: &Path) -> Result<Vec<Found>> {
    let content = std::fs::read_to_string(path)?;
    let mut deps = Vec::new();
    let mut lines = content.lines().peekable();

    // Header like: "foo@^1.0.0:" or "@scope/foo@^1.0.0:"
    let header_re = Regex::new(r#"^"?(@?[^@"]+)@[^:"]+"?:$"#)?;
    let version_re = Regex::new(r#"^\s+version:?\s+"?([^"\s]+)"?"#)?;

    while let Some(line) = lines.next() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if !line.starts_with(' ') && !line.starts_with('\t') {
            let trimmed = line.trim_end_matches(':').trim_matches('"');
            // Comma-separated specs share one entry: take the first name
            let first_spec = trimmed.split(", ").next().unwrap_or(trimmed);

            if let Some(caps) = header_re.captures(&format!("{}:", first_spec.trim_end_matches(':'))) {
                let pkg_name = caps[1].to_string();
                let mut version = String::new();

                while let Some(next) = lines.peek() {
                    if next.is_empty() {
                        break;
                    }
                    if let Some(vcaps) = version_re.captures(next) {
                        version = vcaps[1].to_string();
                        lines.next();
                        break;
                    }
                    lines.next();
                }

                if !version.is_empty() {
                    deps.push((pkg_name, version, None));
                }
            }
        }
    }

    Ok(deps)
}

/// Parse `package.json` — `dependencies` and `devDependencies`.
fn parse_package_json(path: &Path) -> Result<Vec<Found>> {
    let content = std::fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&content)?;
    let mut deps = Vec::new();

    for section in &["dependencies", "devDependencies"] {
        if let Some(pkgs) = json.get(section).and_then(|v| v.as_object()) {
            for (name, version_range) in pkgs {
                let version = version_range
                    .as_str()
                    .unwrap_or("*")
                    .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '*')
                    .to_string();
                deps.push((name.clone(), version, None));
            }
        }
    }

    Ok(deps)
}
