use crate::license::{LicenseCatalog, LicenseExpr};
use crate::models::{EvaluatedPackage, LicensedPackage, Verdict};
use crate::policy::table::{PolicySet, PolicyTable, RuleSource};

/// Decide the verdict for `licensed`.
///
/// Total and pure: the result depends only on the record, `policies` and
/// `catalog`. Resolution order:
/// 1. analysis error → `Violation`
/// 2. most specific package override for the package's classification
/// 3. license expression against the classification's policy set
///    (license rule → category rule → default)
/// 4. identifier missing from the catalog → `Violation`
pub fn evaluate(
    licensed: LicensedPackage,
    policies: &PolicyTable,
    catalog: &LicenseCatalog,
) -> EvaluatedPackage {
    let (result, remark) = decide(&licensed, policies, catalog);
    EvaluatedPackage::new(licensed, result, remark)
}

fn decide(
    licensed: &LicensedPackage,
    policies: &PolicyTable,
    catalog: &LicenseCatalog,
) -> (Verdict, String) {
    if licensed.is_error() {
        return (
            Verdict::Violation,
            format!("analysis failed: {}", licensed.messages().join("; ")),
        );
    }

    let package = licensed.package();
    let classification = policies.classify(package);

    if let Some(rule) = policies.find_override(package, classification) {
        let remark = rule.remark.clone().unwrap_or_else(|| {
            format!(
                "package override {}@{} ({} policy)",
                rule.id.as_str(),
                rule.versions,
                classification
            )
        });
        return (rule.result, remark);
    }

    let Some(expr) = LicenseExpr::parse(licensed.license()) else {
        return (
            Verdict::Violation,
            format!("unrecognized license '{}'", licensed.license()),
        );
    };

    let unknown: Vec<&str> = expr
        .ids()
        .into_iter()
        .filter(|id| !catalog.contains(id))
        .collect();
    if !unknown.is_empty() {
        let names = unknown
            .iter()
            .map(|id| format!("'{}'", id))
            .collect::<Vec<_>>()
            .join(", ");
        return (Verdict::Violation, format!("unrecognized license {}", names));
    }

    let set = policies.policy_set(classification);
    let mut reasons = Vec::new();
    let verdict = resolve_expr(&expr, set, catalog, &mut reasons);
    let remark = format!("{} policy: {}", classification, reasons.join("; "));
    (verdict, remark)
}

/// `OR` takes the most permissive branch, `AND` the most restrictive.
/// Every identifier in `expr` must already be in `catalog`.
fn resolve_expr(
    expr: &LicenseExpr,
    set: &PolicySet,
    catalog: &LicenseCatalog,
    reasons: &mut Vec<String>,
) -> Verdict {
    match expr {
        LicenseExpr::Id(id) => {
            let category = catalog.category(id).unwrap_or_default();
            let (verdict, source) = set.rule_for(id, category);
            let why = match source {
                RuleSource::License => "license rule".to_string(),
                RuleSource::Category(c) => format!("category '{}'", c),
                RuleSource::Default => format!("default for category '{}'", category),
            };
            reasons.push(format!("{} is {} ({})", id, verdict, why));
            verdict
        }
        LicenseExpr::Or(parts) => parts
            .iter()
            .map(|p| resolve_expr(p, set, catalog, reasons))
            .min_by_key(|v| v.severity())
            .unwrap_or(Verdict::Violation),
        LicenseExpr::And(parts) => parts
            .iter()
            .map(|p| resolve_expr(p, set, catalog, reasons))
            .max_by_key(|v| v.severity())
            .unwrap_or(Verdict::Violation),
    }
}
