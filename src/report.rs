//! Plan previews and run reports

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::executor::RunSummary;
use crate::models::{Operation, OperationKind, Plan};

const RULE_WIDTH: usize = 62;

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

fn count_label(counts: &HashMap<String, u32>, folder: &str) -> String {
    match counts.get(folder) {
        Some(n) => format!("{} msgs", n),
        None => "? msgs".to_string(),
    }
}

/// Text preview of a plan, grouped by operation kind
///
/// `counts` holds message counts keyed by source folder; missing entries
/// print as `?`.
pub fn render_plan(plan: &Plan, counts: &HashMap<String, u32>) -> String {
    let mut out = String::new();

    let sections = [
        (OperationKind::Rename, "RENAME (move folder to new location)", "renames"),
        (OperationKind::Merge, "MERGE (move messages, delete source)", "merges"),
        (OperationKind::Delete, "DELETE (label removed, messages stay in All Mail)", "deletes"),
    ];

    for (kind, heading, noun) in sections {
        let total = plan.count(kind);
        if total == 0 {
            continue;
        }

        let _ = writeln!(out, "{}", light_rule());
        let _ = writeln!(out, "{}:", heading);
        let _ = writeln!(out, "{}", light_rule());
        for op in plan.of_kind(kind) {
            match op {
                Operation::Rename { source, dest } => {
                    let _ = writeln!(out, "  {:<35} → {}", source, dest);
                }
                Operation::Merge { source, dest } => {
                    let _ = writeln!(
                        out,
                        "  {:<35} → {}  ({})",
                        source,
                        dest,
                        count_label(counts, source)
                    );
                }
                Operation::Delete { source } => {
                    let _ = writeln!(out, "  {:<35} ({})", source, count_label(counts, source));
                }
            }
        }
        let _ = writeln!(out, "\n  Total: {} {}\n", total, noun);
    }

    if !plan.not_found.is_empty() {
        let _ = writeln!(out, "{}", light_rule());
        let _ = writeln!(out, "NOT FOUND on server ({}):", plan.not_found.len());
        let _ = writeln!(out, "{}", light_rule());
        for name in &plan.not_found {
            let _ = writeln!(out, "  {}", name);
        }
        let _ = writeln!(out);
    }

    if !plan.untouched.is_empty() {
        let _ = writeln!(out, "{}", light_rule());
        let _ = writeln!(out, "UNTOUCHED folders ({}):", plan.untouched.len());
        let _ = writeln!(out, "{}", light_rule());
        for name in &plan.untouched {
            let _ = writeln!(out, "  {}", name);
        }
        let _ = writeln!(out);
    }

    out
}

/// One-line tally used in the confirmation banner
pub fn plan_headline(plan: &Plan) -> String {
    format!(
        "{} renames + {} merges + {} deletes",
        plan.count(OperationKind::Rename),
        plan.count(OperationKind::Merge),
        plan.count(OperationKind::Delete)
    )
}

pub fn print_plan(plan: &Plan, counts: &HashMap<String, u32>) {
    print!("{}", render_plan(plan, counts));
}

pub fn print_dry_run_footer() {
    println!("{}", heavy_rule());
    println!("  DRY RUN complete. No changes were made.");
    println!("  Run again with --execute to apply these changes.");
    println!("{}", heavy_rule());
}

pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", heavy_rule());
    println!("Execution Summary");
    println!("{}", heavy_rule());
    println!("Attempted: {}", summary.attempted);
    println!("Succeeded: {}", summary.succeeded);
    println!("Failed: {}", summary.failed);
    println!("Duration: {} seconds", summary.duration().num_seconds());
    if summary.failed > 0 {
        println!("\nFailures:");
        for outcome in summary.failures() {
            println!("  - {}", outcome.message);
        }
    }
    println!("{}", heavy_rule());
}

/// Everything needed to write a Markdown report of one invocation
pub struct ReorgReport {
    pub workflow: String,
    pub account: String,
    pub generated_at: DateTime<Utc>,
    pub dry_run: bool,
    pub plan: Plan,
    pub message_counts: HashMap<String, u32>,
    /// Present only when the plan was executed
    pub summary: Option<RunSummary>,
}

impl ReorgReport {
    /// Report for a run that happened now
    ///
    /// Without a summary nothing was applied, whether because `--execute` was
    /// not given, the plan was empty, or the confirmation was declined.
    pub fn new(
        workflow: &str,
        account: &str,
        plan: Plan,
        message_counts: HashMap<String, u32>,
        summary: Option<RunSummary>,
    ) -> Self {
        Self {
            workflow: workflow.to_string(),
            account: account.to_string(),
            generated_at: Utc::now(),
            dry_run: summary.is_none(),
            plan,
            message_counts,
            summary,
        }
    }

    /// Generate Markdown report
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        if self.dry_run {
            md.push_str("# Mailbox Reorganization Report (DRY RUN)\n\n");
            md.push_str("> **DRY RUN MODE** - No changes were made. This report shows what WOULD happen.\n\n");
        } else {
            md.push_str("# Mailbox Reorganization Report\n\n");
        }
        md.push_str(&format!(
            "Generated: {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Workflow:** {}\n", self.workflow));
        md.push_str(&format!("- **Account:** {}\n", self.account));
        md.push_str(&format!("- **Renames:** {}\n", self.plan.count(OperationKind::Rename)));
        md.push_str(&format!("- **Merges:** {}\n", self.plan.count(OperationKind::Merge)));
        md.push_str(&format!("- **Deletes:** {}\n", self.plan.count(OperationKind::Delete)));
        if self.dry_run {
            md.push_str("- **Mode:** Dry Run (preview only)\n");
        }
        md.push('\n');

        md.push_str("## Planned Operations\n\n");
        if self.plan.is_empty() {
            md.push_str("_Nothing to do. The mailbox already matches the configuration._\n\n");
        } else {
            let results: HashMap<&Operation, bool> = self
                .summary
                .iter()
                .flat_map(|s| s.outcomes.iter())
                .map(|o| (&o.operation, o.success))
                .collect();

            md.push_str("| # | Operation | Source | Destination | Messages | Result |\n");
            md.push_str("|---|-----------|--------|-------------|----------|--------|\n");
            for (i, op) in self.plan.operations.iter().enumerate() {
                let kind = match op.kind() {
                    OperationKind::Rename => "Rename",
                    OperationKind::Merge => "Merge",
                    OperationKind::Delete => "Delete",
                };
                let messages = match op.kind() {
                    OperationKind::Rename => "-".to_string(),
                    _ => self
                        .message_counts
                        .get(op.source())
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                };
                let result = match results.get(op) {
                    Some(true) => "ok",
                    Some(false) => "FAILED",
                    None => "-",
                };
                md.push_str(&format!(
                    "| {} | {} | `{}` | {} | {} | {} |\n",
                    i + 1,
                    kind,
                    escape_cell(op.source()),
                    op.dest()
                        .map(|d| format!("`{}`", escape_cell(d)))
                        .unwrap_or_else(|| "-".to_string()),
                    messages,
                    result
                ));
            }
            md.push('\n');
        }

        if !self.plan.not_found.is_empty() {
            md.push_str("## Not Found on Server\n\n");
            for name in &self.plan.not_found {
                md.push_str(&format!("- `{}`\n", name));
            }
            md.push('\n');
        }

        if !self.plan.untouched.is_empty() {
            md.push_str("## Untouched Folders\n\n");
            md.push_str("These folders are not covered by the configuration and need manual review:\n\n");
            for name in &self.plan.untouched {
                md.push_str(&format!("- `{}`\n", name));
            }
            md.push('\n');
        }

        if let Some(summary) = &self.summary {
            md.push_str("## Results\n\n");
            md.push_str(&format!("- **Attempted:** {}\n", summary.attempted));
            md.push_str(&format!("- **Succeeded:** {}\n", summary.succeeded));
            md.push_str(&format!("- **Failed:** {}\n", summary.failed));
            md.push_str(&format!(
                "- **Processing time:** {} seconds\n\n",
                summary.duration().num_seconds()
            ));

            if summary.failed > 0 {
                md.push_str("### Failures\n\n");
                for outcome in summary.failures() {
                    md.push_str(&format!("- {}\n", outcome.message));
                }
                md.push('\n');
            }
        }

        if self.dry_run {
            md.push_str("---\n\n");
            md.push_str("_To apply these changes, run the command again with the `--execute` flag._\n");
        }

        md
    }

    /// Save report to file
    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::write(path, self.to_markdown()).await
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
