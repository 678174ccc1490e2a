use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::license::LicenseCatalog;
use crate::policy::PolicyTable;

/// Per-project and per-user configuration directory name.
const CONFIG_DIR: &str = ".license-warden";
const APP_NAME: &str = "license-warden";

const POLICY_FILE: &str = "policy.json";
const CATALOG_FILE: &str = "catalog.json";

/// Load the policy table, searching in order:
///
/// 1. `explicit` — path passed via `--policy`
/// 2. `<project_path>/.license-warden/policy.json`
/// 3. `~/.config/license-warden/policy.json`
/// 4. Built-in [`PolicyTable::builtin`]
pub fn load_policy(project_path: &Path, explicit: Option<&Path>) -> Result<PolicyTable> {
    match locate(project_path, explicit, POLICY_FILE, home_config_dir())? {
        Some(path) => {
            let content = read(&path, "policy")?;
            let table = PolicyTable::from_json(&content)
                .with_context(|| format!("invalid policy file {}", path.display()))?;
            info!(path = %path.display(), overrides = table.overrides().len(), "loaded policy");
            Ok(table)
        }
        None => {
            debug!("no policy file found; using built-in policy");
            Ok(PolicyTable::builtin())
        }
    }
}

/// Load the license catalog with the same search order as [`load_policy`],
/// falling back to [`LicenseCatalog::builtin`].
pub fn load_catalog(project_path: &Path, explicit: Option<&Path>) -> Result<LicenseCatalog> {
    match locate(project_path, explicit, CATALOG_FILE, home_config_dir())? {
        Some(path) => {
            let content = read(&path, "catalog")?;
            let catalog = LicenseCatalog::from_json(&content)
                .with_context(|| format!("invalid catalog file {}", path.display()))?;
            if catalog.is_empty() {
                warn!(path = %path.display(), "license catalog is empty; every license will be unrecognized");
            } else {
                info!(path = %path.display(), licenses = catalog.len(), "loaded license catalog");
            }
            Ok(catalog)
        }
        None => {
            debug!("no catalog file found; using built-in catalog");
            Ok(LicenseCatalog::builtin())
        }
    }
}

fn home_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(APP_NAME))
}

/// First existing candidate. An explicit path must exist.
fn locate(
    project_path: &Path,
    explicit: Option<&Path>,
    file_name: &str,
    home_dir: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let project_config = project_path.join(CONFIG_DIR).join(file_name);
    if project_config.is_file() {
        return Ok(Some(project_config));
    }

    if let Some(home) = home_dir {
        let home_config = home.join(file_name);
        if home_config.is_file() {
            return Ok(Some(home_config));
        }
    }

    Ok(None)
}

fn read(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("reading {} file {}", what, path.display()))
}
