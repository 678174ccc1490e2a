use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{AnalysisState, EvaluatedPackage, Verdict};
use crate::pipeline::RunOutcome;

/// Render a colored terminal report.
pub fn render(outcome: &RunOutcome, path: &Path, verbose: bool, quiet: bool) -> Result<()> {
    let packages = &outcome.packages;
    let total = packages.len();
    let ok_count = outcome.count(Verdict::Ok);
    let violation_count = outcome.count(Verdict::Violation);
    let ignored_count = outcome.count(Verdict::Ignored);
    let error_count = outcome.errors();

    if quiet {
        println!(
            "Total: {}  Ok: {}  Violation: {}  Ignored: {}  Errors: {}",
            total,
            ok_count.to_string().green(),
            violation_count.to_string().red(),
            ignored_count.to_string().cyan(),
            error_count.to_string().yellow(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "license-warden".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Scanning: {}\n", path.display());

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Total packages     : {}", total));
    println!(
        " │  {:<48} │",
        format!(
            "{}  Ok              : {:>4}  {}",
            "✓".green(),
            ok_count,
            summarize_licenses(packages, Verdict::Ok)
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Violation       : {:>4}  {}",
            "✗".red(),
            violation_count,
            summarize_licenses(packages, Verdict::Violation)
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Ignored         : {:>4}  {}",
            "-".cyan(),
            ignored_count,
            summarize_licenses(packages, Verdict::Ignored)
        )
    );
    println!(
        " │  {:<48} │",
        format!("{}  Analysis errors : {:>4}", "⚠".yellow(), error_count)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if outcome.cancelled {
        println!(
            " {} Run cancelled: {} packages were not analyzed\n",
            "[CANCELLED]".yellow().bold(),
            outcome.skipped
        );
    }

    if violation_count > 0 {
        println!(" {} Packages requiring attention:\n", "[VIOLATION]".red().bold());
        render_table(packages.iter().filter(|p| p.result() == Verdict::Violation));
        println!();
    }

    if verbose && ok_count + ignored_count > 0 {
        println!(" {} All other packages:\n", "[OK]".green().bold());
        render_table(packages.iter().filter(|p| p.result() != Verdict::Violation));
        println!();
    }

    Ok(())
}

fn render_table<'a>(packages: impl Iterator<Item = &'a EvaluatedPackage>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Project").add_attribute(Attribute::Bold),
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("State").add_attribute(Attribute::Bold),
            Cell::new("Result").add_attribute(Attribute::Bold),
            Cell::new("Remark").add_attribute(Attribute::Bold),
        ]);

    for package in packages {
        let (result_str, result_color) = match package.result() {
            Verdict::Ok => ("✓ ok", Color::Green),
            Verdict::Violation => ("✗ violation", Color::Red),
            Verdict::Ignored => ("- ignored", Color::Cyan),
        };

        let (state_str, state_color) = match package.state() {
            AnalysisState::Ok => ("ok", Color::Green),
            AnalysisState::Error => ("error", Color::Yellow),
        };

        table.add_row(vec![
            Cell::new(package.origin_project()),
            Cell::new(package.id()),
            Cell::new(package.version()),
            Cell::new(package.license()),
            Cell::new(state_str).fg(state_color),
            Cell::new(result_str)
                .fg(result_color)
                .set_alignment(CellAlignment::Center),
            Cell::new(remark_with_notes(package)),
        ]);
    }

    println!("{}", table);
}

/// The remark, followed by detector diagnostics for cleanly analyzed
/// packages. Failed analyses already quote their messages in the remark.
fn remark_with_notes(package: &EvaluatedPackage) -> String {
    if package.is_error() || package.messages().is_empty() {
        return package.remark().to_string();
    }
    let notes: Vec<String> = package
        .messages()
        .iter()
        .map(|m| format!("note: {}", m))
        .collect();
    format!("{}\n{}", package.remark(), notes.join("\n"))
}

/// Top three licenses for a verdict, e.g. `[MIT (12), Apache-2.0 (4)]`.
fn summarize_licenses(packages: &[EvaluatedPackage], verdict: Verdict) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for package in packages.iter().filter(|p| p.result() == verdict) {
        *counts.entry(package.license()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::LicenseCatalog;
    use crate::models::{AnalyzedPackage, LicensedPackage, Package};
    use crate::policy::{self, PolicyTable};

    fn evaluate(analyzed: AnalyzedPackage, license: Option<&str>) -> EvaluatedPackage {
        policy::evaluate(
            LicensedPackage::new(analyzed, license),
            &PolicyTable::builtin(),
            &LicenseCatalog::builtin(),
        )
    }

    fn left_pad() -> Package {
        Package::new("left-pad", "1.0.0", "WebApp").unwrap()
    }

    #[test]
    fn test_remark_carries_detector_notes() {
        let analyzed = AnalyzedPackage::detected(
            left_pad(),
            vec!["declared license 'MIT License' normalized to 'MIT'".to_string()],
        );
        let out = evaluate(analyzed, Some("MIT"));
        let cell = remark_with_notes(&out);
        assert!(cell.starts_with(out.remark()));
        assert!(cell.ends_with("\nnote: declared license 'MIT License' normalized to 'MIT'"));
    }

    #[test]
    fn test_remark_for_failed_analysis_is_unchanged() {
        let out = evaluate(AnalyzedPackage::failed(left_pad(), "boom"), None);
        assert_eq!(remark_with_notes(&out), "analysis failed: boom");
    }

    #[test]
    fn test_summarize_licenses_top_three() {
        let packages: Vec<EvaluatedPackage> = ["MIT", "MIT", "Apache-2.0", "ISC", "Zlib"]
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let package = Package::new(format!("crate-{}", i), "1.0.0", "WebApp").unwrap();
                evaluate(AnalyzedPackage::new(package), Some(l))
            })
            .collect();
        assert_eq!(
            summarize_licenses(&packages, Verdict::Ok),
            "[MIT (2), Apache-2.0 (1), ISC (1)]"
        );
        assert_eq!(summarize_licenses(&packages, Verdict::Violation), "");
    }
}
