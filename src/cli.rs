use std::path::PathBuf;

use clap::Parser;

use crate::manifest::Ecosystem;

#[derive(Parser, Debug)]
#[command(
    name = "license-warden",
    about = "Detect dependency licenses and evaluate them against a compliance policy",
    version
)]
pub struct Cli {
    /// Project path to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Pre-resolved package list (JSON) instead of scanning manifests
    #[arg(long, value_name = "FILE")]
    pub packages: Option<PathBuf>,

    /// Policy file [default: ./.license-warden/policy.json, fallback ~/.config/license-warden/policy.json]
    #[arg(long, value_name = "FILE")]
    pub policy: Option<PathBuf>,

    /// License catalog file [default: ./.license-warden/catalog.json, fallback ~/.config/license-warden/catalog.json]
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Fall back to package registries when no license is declared
    #[arg(long)]
    pub online: bool,

    /// Packages analyzed concurrently
    #[arg(long, env = "LICENSE_WARDEN_CONCURRENCY", default_value_t = 8)]
    pub concurrency: usize,

    /// Per-package license detection timeout, in seconds
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Also fail the run when any package's analysis failed
    #[arg(long)]
    pub fail_on_error: bool,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Write the JSON report to FILE instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Exclude an ecosystem from scanning (repeatable)
    #[arg(long = "exclude-lang", value_name = "LANG")]
    pub exclude_lang: Vec<EcosystemArg>,

    /// Show all packages (not just violations and errors)
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,

    /// Log line format on stderr
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum EcosystemArg {
    Rust,
    Python,
    Node,
}

impl From<&EcosystemArg> for Ecosystem {
    fn from(arg: &EcosystemArg) -> Self {
        match arg {
            EcosystemArg::Rust => Ecosystem::Rust,
            EcosystemArg::Python => Ecosystem::Python,
            EcosystemArg::Node => Ecosystem::Node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["license-warden"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.timeout_secs, 30);
        assert_eq!(cli.report, ReportFormat::Terminal);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(!cli.fail_on_error);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "license-warden",
            "app",
            "--packages",
            "pkgs.json",
            "--concurrency",
            "2",
            "--report",
            "json",
            "--exclude-lang",
            "node",
            "--fail-on-error",
        ])
        .unwrap();
        assert_eq!(cli.concurrency, 2);
        assert_eq!(cli.packages, Some(PathBuf::from("pkgs.json")));
        assert_eq!(cli.report, ReportFormat::Json);
        let excluded: Vec<Ecosystem> = cli.exclude_lang.iter().map(Into::into).collect();
        assert_eq!(excluded, vec![Ecosystem::Node]);
        assert!(cli.fail_on_error);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["license-warden", "--timeout-secs", "0"]).is_err());
        let cli = Cli::try_parse_from(["license-warden", "--timeout-secs", "1"]).unwrap();
        assert_eq!(cli.timeout_secs, 1);
    }
}
