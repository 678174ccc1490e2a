use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::detector::LicenseDetector;
use crate::license::{LicenseCatalog, LicenseExpr};
use crate::models::{AnalysisState, AnalyzedPackage, LicensedPackage, Package};

/// Output of the analysis stage: the record plus whatever license the
/// detector produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub record: AnalyzedPackage,
    pub detected_license: Option<String>,
}

/// Run the detector for `package`, bounded by `timeout`.
///
/// The detector runs in its own task, so a panic surfaces as a failed
/// analysis instead of tearing down the caller. Every failure mode yields an
/// `Error` record with exactly one message.
pub async fn analyze(
    package: Package,
    detector: Arc<dyn LicenseDetector>,
    timeout: Duration,
) -> Analysis {
    let probe = package.clone();
    let handle = tokio::spawn(async move { detector.detect(&probe).await });
    let abort = handle.abort_handle();

    let failure = match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(Ok(found))) => {
            debug!(package = %package, license = %found.license, "license detected");
            return Analysis {
                record: AnalyzedPackage::detected(package, found.diagnostics),
                detected_license: Some(found.license),
            };
        }
        Ok(Ok(Err(e))) => format!("license detection failed: {}", e),
        Ok(Err(join)) if join.is_panic() => "license detector crashed".to_string(),
        Ok(Err(_)) => "license detection was cancelled".to_string(),
        Err(_) => {
            abort.abort();
            format!("license detection timed out after {}s", timeout.as_secs_f64())
        }
    };

    warn!(package = %package, reason = %failure, "analysis failed");
    Analysis {
        record: AnalyzedPackage::failed(package, failure),
        detected_license: None,
    }
}

/// Attach the detected license (or the `unknown` sentinel).
pub fn license(analyzed: AnalyzedPackage, detected_license: Option<&str>) -> LicensedPackage {
    LicensedPackage::new(analyzed, detected_license)
}

/// Escalate to `Error` when a successfully analyzed package names a license
/// identifier the catalog doesn't know. One message per missing identifier.
pub fn verify_catalog(licensed: LicensedPackage, catalog: &LicenseCatalog) -> LicensedPackage {
    if licensed.is_error() {
        return licensed;
    }

    let missing: Vec<String> = match LicenseExpr::parse(licensed.license()) {
        Some(expr) => expr
            .ids()
            .into_iter()
            .filter(|id| !catalog.contains(id))
            .map(str::to_string)
            .collect(),
        None => vec![licensed.license().to_string()],
    };

    missing.iter().fold(licensed, |record, id| {
        debug!(package = %record.package(), license = %id, "license missing from catalog");
        record.with(
            AnalysisState::Error,
            format!("license '{}' is not in the license catalog", id),
        )
    })
}
