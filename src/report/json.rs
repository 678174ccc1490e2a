use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::EvaluatedPackage;

/// Pretty-printed JSON array of evaluated packages.
pub fn to_string(packages: &[EvaluatedPackage]) -> Result<String> {
    Ok(serde_json::to_string_pretty(packages)?)
}

/// Write the report to `output`, or stdout when `None`.
pub fn render(packages: &[EvaluatedPackage], output: Option<&Path>) -> Result<()> {
    let json = to_string(packages)?;
    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("writing report to {}", path.display())),
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            writeln!(lock, "{}", json)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::LicenseCatalog;
    use crate::models::{AnalyzedPackage, LicensedPackage, Package};
    use crate::policy::{self, PolicyTable};

    fn evaluated() -> Vec<EvaluatedPackage> {
        let package = Package::new("left-pad", "1.0.0", "WebApp").unwrap();
        let licensed = LicensedPackage::new(AnalyzedPackage::new(package), Some("MIT"));
        vec![policy::evaluate(
            licensed,
            &PolicyTable::builtin(),
            &LicenseCatalog::builtin(),
        )]
    }

    #[test]
    fn test_report_is_an_array_of_records() {
        let json = to_string(&evaluated()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["id"], "left-pad");
        assert_eq!(first["originProject"], "WebApp");
        assert_eq!(first["state"], "Ok");
        assert_eq!(first["result"], "Ok");
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.json");
        render(&evaluated(), Some(&out)).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with('['));
        assert!(written.ends_with("]\n"));
    }
}
