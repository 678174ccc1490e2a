//! Pipeline records.
//!
//! A package moves through four record types, each built by wrapping the
//! previous one by value:
//!
//! ```text
//! Package → AnalyzedPackage → LicensedPackage → EvaluatedPackage
//! ```
//!
//! Fields are private; identity (`id`, `version`, `originProject`) can only be
//! read after construction, never rewritten.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::version::VersionRange;

/// License identifier used when detection produced nothing.
pub const UNKNOWN_LICENSE: &str = "unknown";

/// A dependency as discovered in a build manifest.
///
/// Not `Deserialize`: go through [`Package::new`] so an empty id is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    id: String,
    version: String,
    origin_project: String,
}

impl Package {
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        origin_project: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ConfigError::EmptyPackageId);
        }
        Ok(Self {
            id,
            version: version.into(),
            origin_project: origin_project.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn origin_project(&self) -> &str {
        &self.origin_project
    }

    /// The package's version as a single-version range.
    pub fn version_range(&self) -> VersionRange {
        VersionRange::Exact(self.version.clone())
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} ({})", self.id, self.version, self.origin_project)
    }
}

/// Outcome of the analysis stage. Ordered so that escalation is `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnalysisState {
    Ok,
    Error,
}

impl std::fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisState::Ok => write!(f, "ok"),
            AnalysisState::Error => write!(f, "error"),
        }
    }
}

/// A package after the license detector has run.
///
/// `state == Error` always comes with at least one message: the only ways to
/// reach `Error` are [`AnalyzedPackage::failed`] and [`AnalyzedPackage::with`],
/// both of which take one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedPackage {
    #[serde(flatten)]
    package: Package,
    state: AnalysisState,
    messages: Vec<String>,
}

impl AnalyzedPackage {
    /// Fresh record in state `Ok` with no diagnostics.
    pub fn new(package: Package) -> Self {
        Self {
            package,
            state: AnalysisState::Ok,
            messages: Vec::new(),
        }
    }

    /// Successful analysis carrying the detector's informational diagnostics.
    pub fn detected(package: Package, diagnostics: Vec<String>) -> Self {
        Self {
            package,
            state: AnalysisState::Ok,
            messages: diagnostics,
        }
    }

    /// Failed analysis with exactly one explanatory message.
    pub fn failed(package: Package, message: impl Into<String>) -> Self {
        Self::new(package).with(AnalysisState::Error, message)
    }

    /// New record with the state escalated to `max(self.state, state)` and
    /// `message` appended. `self` is left untouched.
    #[must_use]
    pub fn with(&self, state: AnalysisState, message: impl Into<String>) -> Self {
        let mut messages = self.messages.clone();
        messages.push(message.into());
        Self {
            package: self.package.clone(),
            state: self.state.max(state),
            messages,
        }
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn id(&self) -> &str {
        self.package.id()
    }

    pub fn version(&self) -> &str {
        self.package.version()
    }

    pub fn origin_project(&self) -> &str {
        self.package.origin_project()
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_error(&self) -> bool {
        self.state == AnalysisState::Error
    }
}

/// An analyzed package with its license identifier attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicensedPackage {
    #[serde(flatten)]
    analyzed: AnalyzedPackage,
    license: String,
}

impl LicensedPackage {
    /// Attach `license` (or [`UNKNOWN_LICENSE`] when absent or blank).
    pub fn new(analyzed: AnalyzedPackage, license: Option<&str>) -> Self {
        let license = license
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(UNKNOWN_LICENSE)
            .to_string();
        Self { analyzed, license }
    }

    /// Same license, escalated analysis record.
    #[must_use]
    pub fn with(&self, state: AnalysisState, message: impl Into<String>) -> Self {
        Self {
            analyzed: self.analyzed.with(state, message),
            license: self.license.clone(),
        }
    }

    pub fn package(&self) -> &Package {
        self.analyzed.package()
    }

    pub fn id(&self) -> &str {
        self.analyzed.id()
    }

    pub fn version(&self) -> &str {
        self.analyzed.version()
    }

    pub fn origin_project(&self) -> &str {
        self.analyzed.origin_project()
    }

    pub fn state(&self) -> AnalysisState {
        self.analyzed.state()
    }

    pub fn messages(&self) -> &[String] {
        self.analyzed.messages()
    }

    pub fn is_error(&self) -> bool {
        self.analyzed.is_error()
    }

    pub fn license(&self) -> &str {
        &self.license
    }
}

/// Terminal compliance decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Ok,
    Violation,
    Ignored,
}

impl Verdict {
    /// Rank used to combine verdicts of compound license expressions.
    /// Lower is more permissive.
    pub fn severity(self) -> u8 {
        match self {
            Verdict::Ok => 0,
            Verdict::Ignored => 1,
            Verdict::Violation => 2,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Ok => write!(f, "ok"),
            Verdict::Violation => write!(f, "violation"),
            Verdict::Ignored => write!(f, "ignored"),
        }
    }
}

/// A licensed package with its verdict. Only the policy resolver builds these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluatedPackage {
    #[serde(flatten)]
    licensed: LicensedPackage,
    result: Verdict,
    remark: String,
}

impl EvaluatedPackage {
    pub(crate) fn new(licensed: LicensedPackage, result: Verdict, remark: String) -> Self {
        Self {
            licensed,
            result,
            remark,
        }
    }

    pub fn package(&self) -> &Package {
        self.licensed.package()
    }

    pub fn id(&self) -> &str {
        self.licensed.id()
    }

    pub fn version(&self) -> &str {
        self.licensed.version()
    }

    pub fn origin_project(&self) -> &str {
        self.licensed.origin_project()
    }

    pub fn state(&self) -> AnalysisState {
        self.licensed.state()
    }

    pub fn messages(&self) -> &[String] {
        self.licensed.messages()
    }

    pub fn is_error(&self) -> bool {
        self.licensed.is_error()
    }

    pub fn license(&self) -> &str {
        self.licensed.license()
    }

    pub fn result(&self) -> Verdict {
        self.result
    }

    pub fn remark(&self) -> &str {
        &self.remark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left_pad() -> Package {
        Package::new("left-pad", "1.0.0", "WebApp").unwrap()
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(Package::new("", "1.0", "WebApp").is_err());
        assert!(Package::new("  ", "1.0", "WebApp").is_err());
    }

    #[test]
    fn test_with_does_not_mutate_original() {
        let fresh = AnalyzedPackage::new(left_pad());
        let escalated = fresh.with(AnalysisState::Error, "boom");

        assert_eq!(fresh.state(), AnalysisState::Ok);
        assert!(fresh.messages().is_empty());
        assert_eq!(escalated.state(), AnalysisState::Error);
        assert_eq!(escalated.messages(), ["boom".to_string()]);
    }

    #[test]
    fn test_state_never_deescalates() {
        let failed = AnalyzedPackage::failed(left_pad(), "first");
        let later = failed.with(AnalysisState::Ok, "second");

        assert_eq!(later.state(), AnalysisState::Error);
        assert_eq!(later.messages(), ["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_failed_has_exactly_one_message() {
        let failed = AnalyzedPackage::failed(left_pad(), "unsupported archive format");
        assert!(failed.is_error());
        assert_eq!(failed.messages().len(), 1);
    }

    #[test]
    fn test_licensed_uses_unknown_sentinel() {
        let licensed = LicensedPackage::new(AnalyzedPackage::new(left_pad()), None);
        assert_eq!(licensed.license(), UNKNOWN_LICENSE);

        let blank = LicensedPackage::new(AnalyzedPackage::new(left_pad()), Some("  "));
        assert_eq!(blank.license(), UNKNOWN_LICENSE);
    }

    #[test]
    fn test_licensed_with_keeps_license_and_identity() {
        let licensed = LicensedPackage::new(AnalyzedPackage::new(left_pad()), Some("MIT"));
        let escalated = licensed.with(AnalysisState::Error, "not in catalog");

        assert_eq!(escalated.license(), "MIT");
        assert_eq!(escalated.package(), licensed.package());
        assert_eq!(licensed.state(), AnalysisState::Ok);
    }

    #[test]
    fn test_version_range_is_single_version() {
        assert_eq!(left_pad().version_range(), VersionRange::Exact("1.0.0".into()));
    }

    #[test]
    fn test_evaluated_json_field_order() {
        let licensed = LicensedPackage::new(
            AnalyzedPackage::detected(left_pad(), vec!["note".into()]),
            Some("MIT"),
        );
        let evaluated = EvaluatedPackage::new(licensed, Verdict::Ok, "fine".into());
        let json = serde_json::to_string(&evaluated).unwrap();

        assert_eq!(
            json,
            r#"{"id":"left-pad","version":"1.0.0","originProject":"WebApp","state":"Ok","messages":["note"],"license":"MIT","result":"Ok","remark":"fine"}"#
        );
    }
}
