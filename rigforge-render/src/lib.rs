//! Rendering helpers (markdown) for human-readable artifacts.

use rigforge_types::result::{AdjustmentKind, CompatibilityIssue, SynthesisResult};

pub fn render_build_md(result: &SynthesisResult) -> String {
    let mut out = String::new();
    out.push_str("# rigforge build\n\n");
    out.push_str(&format!("- Profile: `{}`\n", result.profile_id));
    if !result.use_cases.is_empty() {
        let cases: Vec<&str> = result.use_cases.iter().map(|u| u.as_str()).collect();
        out.push_str(&format!("- Use cases: {}\n", cases.join(", ")));
    }
    out.push_str(&format!(
        "- Policy: `{}` ({} budget)\n",
        result.policy, result.tier
    ));
    out.push_str(&format!(
        "- Total: {} of {} ({:.1}%)\n",
        money(result.costs.total),
        money(result.costs.budget),
        result.costs.compliance_percentage
    ));
    out.push_str(&format!("- Within budget: `{}`\n", result.costs.within_budget));
    out.push_str(&format!("- Compatible: `{}`\n", result.compatibility.is_valid));
    out.push_str(&format!("- Build id: `{}`\n\n", result.build_id));

    out.push_str("## Components\n\n");
    if result.configuration.is_empty() {
        out.push_str("_No components selected._\n");
    } else {
        out.push_str("| Category | Item | Price | Allocated |\n");
        out.push_str("|---|---|---:|---:|\n");
        for category in &result.order {
            let allocated = result
                .allocation
                .iter()
                .find(|e| e.category == *category)
                .map(|e| money(e.fraction * result.costs.budget))
                .unwrap_or_else(|| "-".to_string());

            let primary = category.as_str().to_string();
            let second = format!("{}_2", category.as_str());
            for (n, key) in [primary, second].iter().enumerate() {
                let Some(entry) = result.configuration.get(key) else {
                    continue;
                };
                out.push_str(&format!(
                    "| {} | {} (`{}`) | {} | {} |\n",
                    key,
                    entry.item.name,
                    entry.item.id,
                    money(entry.item.price * f64::from(entry.quantity)),
                    if n == 0 { allocated.as_str() } else { "" }
                ));
            }
        }
    }

    if !result.skipped_components.is_empty() {
        out.push_str("\n## Skipped\n\n");
        for category in &result.skipped_components {
            let required = result
                .allocation
                .iter()
                .any(|e| e.category == *category && e.required);
            if required {
                out.push_str(&format!("- `{}` (required)\n", category));
            } else {
                out.push_str(&format!("- `{}`\n", category));
            }
        }
    }

    if !result.compatibility.errors.is_empty() || !result.compatibility.warnings.is_empty() {
        out.push_str("\n## Compatibility\n\n");
        push_issues(&mut out, "error", &result.compatibility.errors);
        push_issues(&mut out, "warning", &result.compatibility.warnings);
    }

    if !result.adjustments.is_empty() {
        out.push_str("\n## Adjustments\n\n");
        for (i, adj) in result.adjustments.iter().enumerate() {
            let kind = match adj.kind {
                AdjustmentKind::AnchorSwap => "anchor swap",
                AdjustmentKind::Downgrade => "downgrade",
            };
            out.push_str(&format!(
                "{}. {} `{}`: `{}` ({}) -> `{}` ({})\n",
                i + 1,
                kind,
                adj.category,
                adj.from_id,
                money(adj.from_price),
                adj.to_id,
                money(adj.to_price)
            ));
        }
    }

    if result.repair.residual_excess {
        out.push_str(&format!(
            "\n> Still over budget after {} repair passes (limit {}).\n",
            result.repair.iterations,
            money(result.costs.budget * result.repair.max_excess)
        ));
    }

    out
}

fn push_issues(out: &mut String, label: &str, issues: &[CompatibilityIssue]) {
    for issue in issues {
        out.push_str(&format!("- **{}** `{}`: {}\n", label, issue.code, issue.message));
    }
}

fn money(v: f64) -> String {
    format!("${:.2}", v)
}
