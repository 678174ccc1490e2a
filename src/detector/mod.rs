//! License detection, the one external capability the pipeline waits on.
//!
//! The pipeline only sees the [`LicenseDetector`] trait. Implementations:
//! - [`declared::DeclaredDetector`] — license strings declared in manifests
//! - [`registry::RegistryDetector`] — crates.io / npm / PyPI lookups (`--online`)
//! - [`ChainDetector`] — tries detectors in order, first success wins

use async_trait::async_trait;
use thiserror::Error;

use crate::license::spdx;
use crate::models::Package;

pub mod declared;
pub mod registry;

/// A license found for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub license: String,
    /// Informational notes, e.g. that the raw string was normalized.
    pub diagnostics: Vec<String>,
}

impl Detection {
    /// Normalize `raw` to SPDX, noting any rewrite as a diagnostic.
    pub fn normalized(raw: &str, source: &str) -> Self {
        let license = spdx::normalize(raw);
        let diagnostics = if license != raw.trim() {
            vec![format!("{} license '{}' normalized to '{}'", source, raw.trim(), license)]
        } else {
            Vec::new()
        };
        Self {
            license,
            diagnostics,
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("no license declared")]
    NoLicense,

    #[error("unsupported package: {0}")]
    Unsupported(String),

    #[error("registry lookup failed: {0}")]
    Registry(String),

    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Exhausted(Vec<DetectionError>),
}

#[async_trait]
pub trait LicenseDetector: Send + Sync {
    async fn detect(&self, package: &Package) -> Result<Detection, DetectionError>;
}

/// Runs detectors in order and returns the first success. When every
/// detector fails, the errors are reported together.
pub struct ChainDetector {
    detectors: Vec<Box<dyn LicenseDetector>>,
}

impl ChainDetector {
    pub fn new(detectors: Vec<Box<dyn LicenseDetector>>) -> Self {
        Self { detectors }
    }
}

#[async_trait]
impl LicenseDetector for ChainDetector {
    async fn detect(&self, package: &Package) -> Result<Detection, DetectionError> {
        let mut errors = Vec::new();
        for detector in &self.detectors {
            match detector.detect(package).await {
                Ok(found) => return Ok(found),
                Err(e) => errors.push(e),
            }
        }
        match errors.len() {
            0 => Err(DetectionError::NoLicense),
            1 => Err(errors.remove(0)),
            _ => Err(DetectionError::Exhausted(errors)),
        }
    }
}
