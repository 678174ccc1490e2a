use std::collections::BTreeMap;

use regex::Regex;
use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::license::spdx;
use crate::models::{Package, Verdict};
use crate::version::VersionRange;

/// Whether a package is built for internal use or shipped publicly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Internal,
    Public,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Internal => write!(f, "internal"),
            Classification::Public => write!(f, "public"),
        }
    }
}

/// Which classification a package override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Any,
    Internal,
    Public,
}

impl Scope {
    fn applies_to(self, classification: Classification) -> bool {
        match self {
            Scope::Any => true,
            Scope::Internal => classification == Classification::Internal,
            Scope::Public => classification == Classification::Public,
        }
    }
}

/// A `*`-wildcard pattern matched against whole strings.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(glob: &str) -> Result<Self> {
        let body = glob
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{}$", body)).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: glob.to_string(),
                source,
            }
        })?;
        Ok(Self {
            source: glob.to_string(),
            regex,
        })
    }

    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    pub fn is_exact(&self) -> bool {
        !self.source.contains('*')
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Explicit verdict for a specific package, bypassing license rules.
#[derive(Debug, Clone)]
pub struct PackageOverride {
    pub id: Pattern,
    pub versions: VersionRange,
    pub scope: Scope,
    pub result: Verdict,
    pub remark: Option<String>,
}

impl PackageOverride {
    fn matches(&self, package: &Package, classification: Classification) -> bool {
        self.scope.applies_to(classification)
            && self.id.matches(package.id())
            && self.versions.covers(&package.version_range())
    }

    /// `(exact id, version specificity, scoped)`; larger is more specific.
    fn specificity(&self) -> (bool, u8, bool) {
        (
            self.id.is_exact(),
            self.versions.specificity(),
            self.scope != Scope::Any,
        )
    }
}

/// Where a license-level verdict came from; used in evaluation remarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    License,
    Category(String),
    Default,
}

/// License rules for one classification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PolicySet {
    /// Verdict for categories not listed in `categories`.
    #[serde(default = "default_verdict")]
    pub default: Verdict,
    /// Category name → verdict.
    #[serde(default)]
    pub categories: BTreeMap<String, Verdict>,
    /// License identifier → verdict; takes precedence over `categories`.
    #[serde(default)]
    pub licenses: BTreeMap<String, Verdict>,
}

fn default_verdict() -> Verdict {
    Verdict::Violation
}

impl PolicySet {
    /// Verdict for a catalogued license: license rule, then category rule,
    /// then the set default.
    pub fn rule_for(&self, license: &str, category: &str) -> (Verdict, RuleSource) {
        if let Some(v) = self.licenses.get(license) {
            return (*v, RuleSource::License);
        }
        if let Some(v) = self.categories.get(category) {
            return (*v, RuleSource::Category(category.to_string()));
        }
        (self.default, RuleSource::Default)
    }
}

/// On-disk policy document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyDocument {
    #[serde(default)]
    classification: ClassificationDocument,
    #[serde(default)]
    packages: Vec<OverrideDocument>,
    public: PolicySet,
    /// Falls back to `public` when omitted.
    internal: Option<PolicySet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassificationDocument {
    #[serde(default)]
    internal_projects: Vec<String>,
    #[serde(default)]
    internal_packages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OverrideDocument {
    id: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    scope: Scope,
    result: Verdict,
    #[serde(default)]
    remark: Option<String>,
}

/// Compiled policy. Loaded once per run, read-only afterwards.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    internal_projects: Vec<Pattern>,
    internal_packages: Vec<Pattern>,
    overrides: Vec<PackageOverride>,
    public: PolicySet,
    internal: PolicySet,
}

impl PolicyTable {
    /// Parse and compile a policy JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: PolicyDocument = serde_json::from_str(text)?;
        Self::compile(doc)
    }

    fn compile(doc: PolicyDocument) -> Result<Self> {
        let patterns = |globs: &[String]| -> Result<Vec<Pattern>> {
            globs.iter().map(|g| Pattern::new(g)).collect()
        };

        let mut overrides = Vec::with_capacity(doc.packages.len());
        for (index, entry) in doc.packages.into_iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(ConfigError::EmptyOverrideId { index });
            }
            overrides.push(PackageOverride {
                id: Pattern::new(entry.id.trim())?,
                versions: VersionRange::parse(entry.version.as_deref().unwrap_or("*"))?,
                scope: entry.scope,
                result: entry.result,
                remark: entry.remark.filter(|r| !r.trim().is_empty()),
            });
        }

        let internal = doc.internal.unwrap_or_else(|| doc.public.clone());
        Ok(Self {
            internal_projects: patterns(&doc.classification.internal_projects)?,
            internal_packages: patterns(&doc.classification.internal_packages)?,
            overrides,
            public: doc.public,
            internal,
        })
    }

    /// Built-in policy used when no policy file is found.
    ///
    /// Public projects accept permissive and weak-copyleft licenses and reject
    /// strong copyleft. Internal projects also accept strong copyleft. Anything
    /// in an unlisted category is a violation.
    pub fn builtin() -> Self {
        let public = PolicySet {
            default: Verdict::Violation,
            categories: BTreeMap::from([
                (spdx::PERMISSIVE.to_string(), Verdict::Ok),
                (spdx::WEAK_COPYLEFT.to_string(), Verdict::Ok),
                (spdx::COPYLEFT.to_string(), Verdict::Violation),
            ]),
            licenses: BTreeMap::new(),
        };
        let internal = PolicySet {
            default: Verdict::Violation,
            categories: BTreeMap::from([
                (spdx::PERMISSIVE.to_string(), Verdict::Ok),
                (spdx::WEAK_COPYLEFT.to_string(), Verdict::Ok),
                (spdx::COPYLEFT.to_string(), Verdict::Ok),
            ]),
            licenses: BTreeMap::new(),
        };
        Self {
            internal_projects: Vec::new(),
            internal_packages: Vec::new(),
            overrides: Vec::new(),
            public,
            internal,
        }
    }

    /// Internal when the origin project or the package id matches a
    /// configured internal pattern.
    pub fn classify(&self, package: &Package) -> Classification {
        let internal = self
            .internal_projects
            .iter()
            .any(|p| p.matches(package.origin_project()))
            || self.internal_packages.iter().any(|p| p.matches(package.id()));
        if internal {
            Classification::Internal
        } else {
            Classification::Public
        }
    }

    /// Most specific override for `package`; ties go to the earliest entry.
    pub fn find_override(
        &self,
        package: &Package,
        classification: Classification,
    ) -> Option<&PackageOverride> {
        let mut best: Option<&PackageOverride> = None;
        for candidate in self.overrides.iter().filter(|o| o.matches(package, classification)) {
            match best {
                Some(b) if b.specificity() >= candidate.specificity() => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    pub fn policy_set(&self, classification: Classification) -> &PolicySet {
        match classification {
            Classification::Internal => &self.internal,
            Classification::Public => &self.public,
        }
    }

    pub fn overrides(&self) -> &[PackageOverride] {
        &self.overrides
    }
}
