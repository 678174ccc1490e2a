use std::sync::Arc;
use std::time::Duration;

use indicatif::ProgressBar;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::stages;
use crate::detector::LicenseDetector;
use crate::license::LicenseCatalog;
use crate::models::{EvaluatedPackage, Package, Verdict};
use crate::policy::{self, PolicyTable};

/// Read-only inputs shared by every package in a run.
#[derive(Clone)]
pub struct RunContext {
    pub detector: Arc<dyn LicenseDetector>,
    pub catalog: Arc<LicenseCatalog>,
    pub policies: Arc<PolicyTable>,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Packages in flight at once; clamped to at least 1.
    pub concurrency: usize,
    /// Per-package detector timeout.
    pub timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Everything a run produced, sorted by `(originProject, id, version)`.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub packages: Vec<EvaluatedPackage>,
    /// Packages never dispatched because the run was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
}

impl RunOutcome {
    /// Process exit status for this run.
    ///
    /// `130` when cancelled, `1` when any package evaluated to `Violation`
    /// (failed analyses included) or, with `fail_on_error`, when any analysis
    /// failed; `0` otherwise. `Ignored` never fails a run.
    pub fn exit_code(&self, fail_on_error: bool) -> i32 {
        if self.cancelled {
            return 130;
        }
        let violation = self.packages.iter().any(|p| p.result() == Verdict::Violation);
        let errored = fail_on_error && self.packages.iter().any(|p| p.is_error());
        if violation || errored {
            1
        } else {
            0
        }
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.packages.iter().filter(|p| p.result() == verdict).count()
    }

    pub fn errors(&self) -> usize {
        self.packages.iter().filter(|p| p.is_error()).count()
    }
}

/// Full pipeline for one package: Analysis → Licensing → Evaluation.
pub async fn process(package: Package, ctx: &RunContext, timeout: Duration) -> EvaluatedPackage {
    let analysis = stages::analyze(package, Arc::clone(&ctx.detector), timeout).await;
    let licensed = stages::license(analysis.record, analysis.detected_license.as_deref());
    let licensed = stages::verify_catalog(licensed, &ctx.catalog);
    let evaluated = policy::evaluate(licensed, &ctx.policies, &ctx.catalog);
    debug!(
        package = %evaluated.package(),
        license = %evaluated.license(),
        result = %evaluated.result(),
        "package evaluated"
    );
    evaluated
}

/// Process `packages` concurrently.
///
/// At most `options.concurrency` packages are in flight. Once `cancel` turns
/// `true`, packages still waiting for a slot are skipped; in-flight ones run
/// to completion (bounded by the detector timeout). Whatever was evaluated is
/// returned either way.
pub async fn run(
    packages: Vec<Package>,
    ctx: RunContext,
    options: RunOptions,
    cancel: watch::Receiver<bool>,
    progress: Option<ProgressBar>,
) -> RunOutcome {
    let total = packages.len();
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut tasks: JoinSet<Option<EvaluatedPackage>> = JoinSet::new();

    for package in packages {
        let ctx = ctx.clone();
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        let timeout = options.timeout;

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            if *cancel.borrow() {
                return None;
            }
            Some(process(package, &ctx, timeout).await)
        });
    }

    let mut evaluated = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(record)) => {
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                evaluated.push(record);
            }
            Ok(None) => {}
            // process() contains detector panics itself; anything else is a bug
            Err(e) => warn!(error = %e, "package task failed"),
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    evaluated.sort_by(|a, b| {
        (a.origin_project(), a.id(), a.version()).cmp(&(b.origin_project(), b.id(), b.version()))
    });

    let cancelled = *cancel.borrow();
    let skipped = total - evaluated.len();
    if cancelled {
        warn!(evaluated = evaluated.len(), skipped, "run cancelled; reporting partial results");
    } else {
        info!(evaluated = evaluated.len(), "run complete");
    }

    RunOutcome {
        packages: evaluated,
        skipped,
        cancelled,
    }
}
