//! Gmail label reorganizer
//!
//! Reshapes the label tree of one Gmail account over IMAP: nested containers
//! are flattened, legacy labels are folded into a fixed set of top-level
//! categories, and stale labels are removed.
//!
//! # Overview
//!
//! Work is split into a pure planning step and an I/O step:
//! - **Planning**: [`planner::Planner`] turns one folder listing into an
//!   ordered [`models::Plan`] of renames, merges and deletes
//! - **Execution**: [`executor::Executor`] applies a plan over a
//!   [`session::MailboxSession`], one operation at a time
//!
//! # Example Usage
//!
//! ```no_run
//! use mail_reorg::{config::Config, executor::{Executor, Pacing}};
//! use mail_reorg::models::MailboxSnapshot;
//! use mail_reorg::planner::Planner;
//! use mail_reorg::session::{ImapSession, MailboxSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("mail-reorg.toml".as_ref()).await?;
//!
//!     let mut session =
//!         ImapSession::connect(&config.server, "me@example.com", "app-password").await?;
//!     let snapshot = MailboxSnapshot::from_names(session.list_mailboxes().await?);
//!
//!     let protected = config.protected();
//!     let mut planner = Planner::new(&snapshot, &protected, &config.categories);
//!     planner.consolidate();
//!     let plan = planner.finish();
//!
//!     let mut executor = Executor::new(Box::new(session), Pacing::from(&config.execution));
//!     let summary = executor.run(&plan, |outcome| println!("{}", outcome.message)).await;
//!     println!("{} of {} succeeded", summary.succeeded, summary.attempted);
//!
//!     executor.logout().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`cli`] - Command-line interface and workflow orchestration
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result aliases
//! - [`executor`] - Applies planned operations to a live mailbox
//! - [`mailbox_name`] - Folder name encoding and path helpers
//! - [`models`] - Core data structures
//! - [`planner`] - Folder name resolver
//! - [`report`] - Plan previews and Markdown reports
//! - [`session`] - IMAP session trait and TLS implementation
//! - [`tables`] - Built-in mapping tables

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod mailbox_name;
pub mod models;
pub mod planner;
pub mod report;
pub mod session;
pub mod tables;

// Re-export commonly used types for convenience
pub use error::{ReorgError, Result};

// Core data models
pub use models::{
    CategoryMapping, FlattenRule, MailboxSnapshot, Operation, OperationKind, Plan,
    ProtectedFolders,
};

pub use planner::Planner;

pub use executor::{Executor, OperationOutcome, Pacing, RunSummary};

pub use session::{ImapSession, MailboxSession};

pub use config::{AccountConfig, Config, ExecutionConfig, PlanningConfig, ServerConfig};

// CLI types (for binary usage)
pub use cli::{Cli, Commands, ProgressReporter, RunArgs, Workflow};

pub use report::ReorgReport;
