//! Command-line interface

use clap::{Args, Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ReorgError, Result};
use crate::executor::{Executor, Pacing, RunSummary};
use crate::mailbox_name;
use crate::models::{MailboxSnapshot, Operation, Plan};
use crate::planner::Planner;
use crate::report::{self, ReorgReport};
use crate::session::ImapSession;

#[derive(Parser, Debug)]
#[command(name = "mail-reorg")]
#[command(version)]
#[command(about = "Reorganize Gmail labels over IMAP", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "mail-reorg.toml")]
    pub config: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fold legacy labels into the category folders
    Organize(RunArgs),

    /// Flatten nested containers, then fold legacy labels into categories
    Cleanup(RunArgs),

    /// Delete stale labels (messages stay in All Mail)
    Prune(RunArgs),

    /// List server folders and how the configuration sees them
    List {
        /// Account to log in as
        #[arg(long)]
        email: Option<String>,
    },

    /// Generate example configuration file with the built-in tables
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "mail-reorg.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Apply the plan (default is a dry run)
    #[arg(long)]
    pub execute: bool,

    /// Account to log in as
    #[arg(long)]
    pub email: Option<String>,

    /// Write a Markdown report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Which planner phases a command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Organize,
    Cleanup,
    Prune,
}

impl Workflow {
    pub fn name(&self) -> &'static str {
        match self {
            Workflow::Organize => "organize",
            Workflow::Cleanup => "cleanup",
            Workflow::Prune => "prune",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Workflow::Organize => "Consolidate folders into top-level categories",
            Workflow::Cleanup => "Fix nesting and redirect legacy labels",
            Workflow::Prune => "Delete stale labels",
        }
    }

    /// Plan this workflow against one snapshot
    pub fn plan(&self, config: &Config, snapshot: &MailboxSnapshot) -> Plan {
        let protected = config.protected();
        let mut planner = Planner::new(snapshot, &protected, &config.categories);

        match self {
            Workflow::Organize => {
                planner.consolidate();
            }
            Workflow::Cleanup => {
                planner.flatten(&config.flatten).consolidate();
            }
            Workflow::Prune => {
                planner.prune(&config.planning.stale_labels);
            }
        }

        planner.finish()
    }
}

/// Progress reporter using indicatif
pub struct ProgressReporter {
    multi: MultiProgress,
    spinner_style: ProgressStyle,
    bar_style: ProgressStyle,
}

impl ProgressReporter {
    pub fn new(multi: MultiProgress) -> Self {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed:>6}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");

        let bar_style = ProgressStyle::default_bar()
            .template("[{elapsed:>6}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");

        Self {
            multi,
            spinner_style,
            bar_style,
        }
    }

    pub fn add_spinner(&self, msg: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(self.spinner_style.clone());
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn add_progress_bar(&self, len: u64, msg: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(len));
        pb.set_style(self.bar_style.clone());
        pb.set_message(msg.to_string());
        pb
    }

    /// Finish a spinner and clear it from the multi-progress display
    pub fn finish_spinner(&self, pb: &ProgressBar, msg: &str) {
        pb.finish_and_clear();
        println!("  ✓ {}", msg);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(MultiProgress::new())
    }
}

fn print_banner(title: &str, execute: bool) {
    println!("{}", "=".repeat(62));
    println!("  Gmail Label Reorganizer");
    println!("  {}", title);
    println!("{}", "=".repeat(62));
    if execute {
        println!("  MODE: EXECUTE (changes will be applied!)");
    } else {
        println!("  MODE: DRY RUN (preview only)");
        println!("  Add --execute to apply changes");
    }
    println!();
}

/// Account from the flag, then the config file, then a prompt
fn resolve_email(flag: Option<&str>, config: &Config) -> Result<String> {
    if let Some(email) = flag.or(config.account.email.as_deref()) {
        return Ok(email.trim().to_string());
    }

    let email = inquire::Text::new("Email:").prompt()?;
    let email = email.trim().to_string();
    if email.is_empty() {
        return Err(ReorgError::ConfigError("No email address given".to_string()));
    }
    Ok(email)
}

fn prompt_password() -> Result<String> {
    let password = inquire::Password::new("App Password:")
        .without_confirmation()
        .with_help_message("A Gmail App Password, not your account password")
        .prompt()?;
    Ok(password)
}

/// Typed `yes` gate in front of any destructive run
fn confirm_execution(plan: &Plan) -> Result<bool> {
    println!("{}", "=".repeat(62));
    println!("  READY: {}", report::plan_headline(plan));
    println!("  Merges copy messages before removing the source folder.");
    println!("  Deleting a label never deletes its messages.");
    println!("{}", "=".repeat(62));

    let answer = inquire::Text::new("Type 'yes' to proceed:").prompt()?;
    Ok(is_confirmed(&answer))
}

fn is_confirmed(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

async fn connect(
    config: &Config,
    email: &str,
    reporter: &ProgressReporter,
) -> Result<Executor> {
    let password = prompt_password()?;

    let spinner = reporter.add_spinner(&format!("Connecting to {}...", config.server.host));
    let session = match ImapSession::connect(&config.server, email, &password).await {
        Ok(session) => session,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };
    reporter.finish_spinner(&spinner, &format!("Connected to {} as {}", config.server.host, email));

    Ok(Executor::new(
        Box::new(session),
        Pacing::from(&config.execution),
    ))
}

async fn take_snapshot(executor: &mut Executor, reporter: &ProgressReporter) -> Result<MailboxSnapshot> {
    let spinner = reporter.add_spinner("Listing folders...");
    let names = executor.list_mailboxes().await?;
    let snapshot = MailboxSnapshot::from_names(names);
    reporter.finish_spinner(&spinner, &format!("Found {} folders on server", snapshot.len()));
    Ok(snapshot)
}

/// Message counts for every merge and delete source, read-only
async fn count_sources(
    executor: &mut Executor,
    plan: &Plan,
    reporter: &ProgressReporter,
) -> HashMap<String, u32> {
    let sources: Vec<&str> = plan
        .operations
        .iter()
        .filter(|op| !matches!(op, Operation::Rename { .. }))
        .map(|op| op.source())
        .collect();

    let mut counts = HashMap::new();
    if sources.is_empty() {
        return counts;
    }

    let bar = reporter.add_progress_bar(sources.len() as u64, "Counting messages...");
    for source in sources {
        if let Some(n) = executor.message_count(source).await {
            counts.insert(source.to_string(), n);
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
    counts
}

/// Plan one workflow and, with `--execute` and confirmation, apply it
pub async fn run_workflow(
    workflow: Workflow,
    config: &Config,
    args: &RunArgs,
    reporter: &ProgressReporter,
) -> Result<Option<RunSummary>> {
    print_banner(workflow.title(), args.execute);

    let email = resolve_email(args.email.as_deref(), config)?;
    let mut executor = connect(config, &email, reporter).await?;

    let snapshot = take_snapshot(&mut executor, reporter).await?;
    let plan = workflow.plan(config, &snapshot);
    info!(
        "Planned {} operations ({} not found, {} untouched)",
        plan.len(),
        plan.not_found.len(),
        plan.untouched.len()
    );

    let counts = count_sources(&mut executor, &plan, reporter).await;
    println!();
    report::print_plan(&plan, &counts);

    let summary = if plan.is_empty() {
        println!("Nothing to do. The mailbox already matches the configuration.");
        None
    } else if !args.execute {
        report::print_dry_run_footer();
        None
    } else if !confirm_execution(&plan)? {
        println!("Aborted.");
        None
    } else {
        println!();
        let bar = reporter.add_progress_bar(plan.len() as u64, "Applying changes...");
        let summary = executor
            .run(&plan, |outcome| {
                bar.inc(1);
                bar.set_message(outcome.operation.source().to_string());
            })
            .await;
        bar.finish_and_clear();

        report::print_summary(&summary);
        println!("Refresh your mail client's folder list to see the changes.");
        Some(summary)
    };

    if let Err(e) = executor.logout().await {
        warn!("Logout failed: {}", e);
    }

    if let Some(path) = &args.report {
        let report = ReorgReport::new(workflow.name(), &email, plan, counts, summary.clone());
        report.save(path).await?;
        println!("Report written to {:?}", path);
    }

    Ok(summary)
}

/// How the configuration classifies one server folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FolderStatus {
    Protected,
    Categorized,
    Legacy,
    Stale,
    Uncategorized,
}

impl FolderStatus {
    fn heading(&self) -> &'static str {
        match self {
            FolderStatus::Protected => "PROTECTED (never touched)",
            FolderStatus::Categorized => "CATEGORIZED",
            FolderStatus::Legacy => "LEGACY (will be folded into a category)",
            FolderStatus::Stale => "STALE (will be pruned)",
            FolderStatus::Uncategorized => "UNCATEGORIZED (needs manual review)",
        }
    }
}

/// Group snapshot folders by status, each group sorted
pub fn classify_folders(
    config: &Config,
    snapshot: &MailboxSnapshot,
) -> BTreeMap<FolderStatus, Vec<String>> {
    let protected = config.protected();
    let roots: HashSet<&str> = config
        .categories
        .iter()
        .map(|m| mailbox_name::top_level(&m.destination))
        .collect();
    let sources: HashSet<&str> = config
        .categories
        .iter()
        .flat_map(|m| m.sources.iter().map(String::as_str))
        .collect();
    let stale: HashSet<&str> = config
        .planning
        .stale_labels
        .iter()
        .map(String::as_str)
        .collect();

    let mut groups: BTreeMap<FolderStatus, Vec<String>> = BTreeMap::new();
    for name in snapshot.iter() {
        let status = if protected.is_protected(name) {
            FolderStatus::Protected
        } else if sources.contains(name) {
            FolderStatus::Legacy
        } else if stale.contains(name) {
            FolderStatus::Stale
        } else if roots.contains(mailbox_name::top_level(name)) {
            FolderStatus::Categorized
        } else {
            FolderStatus::Uncategorized
        };
        groups.entry(status).or_default().push(name.to_string());
    }
    groups
}

/// Read-only listing of the server folders
pub async fn list_folders(
    config: &Config,
    email: Option<&str>,
    reporter: &ProgressReporter,
) -> Result<()> {
    let email = resolve_email(email, config)?;
    let mut executor = connect(config, &email, reporter).await?;
    let snapshot = take_snapshot(&mut executor, reporter).await?;

    if let Err(e) = executor.logout().await {
        warn!("Logout failed: {}", e);
    }

    println!();
    for (status, names) in classify_folders(config, &snapshot) {
        println!("{}", "-".repeat(62));
        println!("{} ({}):", status.heading(), names.len());
        println!("{}", "-".repeat(62));
        for name in names {
            println!("  {}", name);
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryMapping;

    #[test]
    fn test_parse_organize_defaults_to_dry_run() {
        let cli = Cli::try_parse_from(["mail-reorg", "organize"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("mail-reorg.toml"));
        match cli.command {
            Commands::Organize(args) => {
                assert!(!args.execute);
                assert!(args.email.is_none());
                assert!(args.report.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_cleanup_with_options() {
        let cli = Cli::try_parse_from([
            "mail-reorg",
            "-v",
            "--config",
            "custom.toml",
            "cleanup",
            "--execute",
            "--email",
            "ops@example.com",
            "--report",
            "out.md",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        match cli.command {
            Commands::Cleanup(args) => {
                assert!(args.execute);
                assert_eq!(args.email.as_deref(), Some("ops@example.com"));
                assert_eq!(args.report, Some(PathBuf::from("out.md")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_init_config() {
        let cli = Cli::try_parse_from(["mail-reorg", "init-config", "-o", "x.toml", "--force"])
            .unwrap();
        match cli.command {
            Commands::InitConfig { output, force } => {
                assert_eq!(output, PathBuf::from("x.toml"));
                assert!(force);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_confirmation_requires_yes() {
        assert!(is_confirmed("yes"));
        assert!(is_confirmed("  YES \n"));
        assert!(!is_confirmed("y"));
        assert!(!is_confirmed(""));
    }

    #[test]
    fn test_resolve_email_prefers_flag() {
        let mut config = Config::default();
        config.account.email = Some("config@example.com".to_string());

        assert_eq!(
            resolve_email(Some(" flag@example.com "), &config).unwrap(),
            "flag@example.com"
        );
        assert_eq!(resolve_email(None, &config).unwrap(), "config@example.com");
    }

    #[test]
    fn test_workflow_phases() {
        let mut config = Config::default();
        config.categories = vec![CategoryMapping::new("Finance/Bank", &["Bank"])];
        config.planning.stale_labels = vec!["General".to_string()];

        let snapshot = MailboxSnapshot::from_names([
            "Bank",
            "Finance/General",
            "Finance/General/Payroll",
            "General",
            "INBOX",
        ]);

        let organize = Workflow::Organize.plan(&config, &snapshot);
        assert_eq!(
            organize.operations,
            vec![Operation::rename("Bank", "Finance/Bank")]
        );

        let cleanup = Workflow::Cleanup.plan(&config, &snapshot);
        assert_eq!(
            cleanup.operations,
            vec![
                Operation::rename("Finance/General/Payroll", "Finance/Payroll"),
                Operation::delete("Finance/General"),
                Operation::rename("Bank", "Finance/Bank"),
            ]
        );

        let prune = Workflow::Prune.plan(&config, &snapshot);
        assert_eq!(prune.operations, vec![Operation::delete("General")]);
    }

    #[test]
    fn test_classify_folders() {
        let mut config = Config::default();
        config.categories = vec![CategoryMapping::new("Finance/Bank", &["Bank"])];
        config.planning.stale_labels = vec!["General".to_string()];

        let snapshot = MailboxSnapshot::from_names([
            "Bank",
            "Finance/Taxes",
            "General",
            "INBOX",
            "[Gmail]/Trash",
            "Vacation",
        ]);

        let groups = classify_folders(&config, &snapshot);
        assert_eq!(
            groups[&FolderStatus::Protected],
            vec!["INBOX".to_string(), "[Gmail]/Trash".to_string()]
        );
        assert_eq!(groups[&FolderStatus::Legacy], vec!["Bank".to_string()]);
        assert_eq!(groups[&FolderStatus::Stale], vec!["General".to_string()]);
        assert_eq!(
            groups[&FolderStatus::Categorized],
            vec!["Finance/Taxes".to_string()]
        );
        assert_eq!(
            groups[&FolderStatus::Uncategorized],
            vec!["Vacation".to_string()]
        );
    }
}
