//! Mailbox operation executor
//!
//! Applies a [`Plan`] one operation at a time over a single session. A
//! failed operation is logged and recorded; the run always continues with
//! the next one and nothing is rolled back.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ExecutionConfig;
use crate::error::{ReorgError, Result};
use crate::models::{Operation, OperationKind, Plan};
use crate::session::MailboxSession;

/// Pause inserted after each operation except the last
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    pub rename: Duration,
    pub merge: Duration,
    pub delete: Duration,
}

impl Pacing {
    /// No pauses at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn after(&self, kind: OperationKind) -> Duration {
        match kind {
            OperationKind::Rename => self.rename,
            OperationKind::Merge => self.merge,
            OperationKind::Delete => self.delete,
        }
    }
}

impl From<&ExecutionConfig> for Pacing {
    fn from(config: &ExecutionConfig) -> Self {
        Self {
            rename: Duration::from_millis(config.rename_delay_ms),
            merge: Duration::from_millis(config.merge_delay_ms),
            delete: Duration::from_millis(config.delete_delay_ms),
        }
    }
}

/// Result of applying one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub operation: Operation,
    pub success: bool,
    /// Human-readable status line
    pub message: String,
}

/// Totals for one executed plan
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<OperationOutcome>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

pub struct Executor {
    session: Box<dyn MailboxSession>,
    pacing: Pacing,
}

impl Executor {
    pub fn new(session: Box<dyn MailboxSession>, pacing: Pacing) -> Self {
        Self { session, pacing }
    }

    /// Folder names currently on the server
    pub async fn list_mailboxes(&mut self) -> Result<Vec<String>> {
        self.session.list_mailboxes().await
    }

    /// Message count of a folder, opened read-only
    ///
    /// Returns None when the folder cannot be examined.
    pub async fn message_count(&mut self, name: &str) -> Option<u32> {
        let count = match self.session.examine(name).await {
            Ok(count) => count,
            Err(e) => {
                debug!("Could not examine '{}': {}", name, e);
                return None;
            }
        };
        if let Err(e) = self.session.close().await {
            debug!("CLOSE after EXAMINE of '{}' failed: {}", name, e);
        }
        Some(count)
    }

    /// Apply a single operation
    pub async fn apply(&mut self, operation: &Operation) -> OperationOutcome {
        let result = match operation {
            Operation::Rename { source, dest } => self.rename(source, dest).await,
            Operation::Merge { source, dest } => self.merge(source, dest).await,
            Operation::Delete { source } => self.delete(source).await,
        };

        match result {
            Ok(message) => {
                info!("{}", message);
                OperationOutcome {
                    operation: operation.clone(),
                    success: true,
                    message,
                }
            }
            Err(e) => {
                let message = format!("{} failed: {}", operation, e);
                warn!("{}", message);
                OperationOutcome {
                    operation: operation.clone(),
                    success: false,
                    message,
                }
            }
        }
    }

    /// Apply every operation of `plan` in order
    ///
    /// `on_outcome` is called after each operation completes.
    pub async fn run<F>(&mut self, plan: &Plan, mut on_outcome: F) -> RunSummary
    where
        F: FnMut(&OperationOutcome),
    {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(plan.len());

        for (index, operation) in plan.operations.iter().enumerate() {
            let outcome = self.apply(operation).await;
            on_outcome(&outcome);
            outcomes.push(outcome);

            let delay = self.pacing.after(operation.kind());
            if index + 1 < plan.len() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        RunSummary {
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
            started_at,
            completed_at: Utc::now(),
        }
    }

    pub async fn logout(mut self) -> Result<()> {
        self.session.logout().await
    }

    async fn rename(&mut self, source: &str, dest: &str) -> Result<String> {
        self.session.rename(source, dest).await?;
        Ok(format!("Renamed '{}' → '{}'", source, dest))
    }

    async fn delete(&mut self, source: &str) -> Result<String> {
        self.session.delete(source).await?;
        Ok(format!("Deleted '{}'", source))
    }

    async fn merge(&mut self, source: &str, dest: &str) -> Result<String> {
        let moved = match self.drain(source, dest).await {
            Ok(moved) => moved,
            Err(e) => {
                if let Err(close_err) = self.session.close().await {
                    debug!("CLOSE after failed merge of '{}' failed: {}", source, close_err);
                }
                return Err(e);
            }
        };

        match self.session.delete(source).await {
            Ok(()) if moved == 0 => Ok(format!("Deleted empty folder '{}'", source)),
            Ok(()) => Ok(format!(
                "Merged {} messages '{}' → '{}' and removed '{}'",
                moved, source, dest, source
            )),
            Err(e) if moved == 0 => Err(e),
            Err(e) => Err(ReorgError::ImapError(format!(
                "{} messages moved to '{}' but '{}' could not be deleted: {}",
                moved, dest, source, e
            ))),
        }
    }

    /// Move every message out of `source` and leave it closed
    async fn drain(&mut self, source: &str, dest: &str) -> Result<u32> {
        let count = self.session.select(source).await?;

        if count > 0 {
            debug!("Copying {} messages '{}' → '{}'", count, source, dest);
            self.session.uid_copy_all(dest).await?;
            self.session.uid_mark_all_deleted().await?;
            self.session.expunge().await?;
        }

        self.session.close().await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::predicate::*;
    use mockall::Sequence;

    mockall::mock! {
        pub Session {}

        #[async_trait]
        impl MailboxSession for Session {
            async fn list_mailboxes(&mut self) -> Result<Vec<String>>;
            async fn examine(&mut self, name: &str) -> Result<u32>;
            async fn select(&mut self, name: &str) -> Result<u32>;
            async fn uid_copy_all(&mut self, dest: &str) -> Result<()>;
            async fn uid_mark_all_deleted(&mut self) -> Result<()>;
            async fn expunge(&mut self) -> Result<()>;
            async fn close(&mut self) -> Result<()>;
            async fn rename(&mut self, from: &str, to: &str) -> Result<()>;
            async fn delete(&mut self, name: &str) -> Result<()>;
            async fn logout(&mut self) -> Result<()>;
        }
    }

    fn imap_no(msg: &str) -> ReorgError {
        ReorgError::ImapError(format!("NO {}", msg))
    }

    #[tokio::test]
    async fn test_merge_runs_full_command_sequence() {
        let mut session = MockSession::new();
        let mut seq = Sequence::new();

        session
            .expect_select()
            .with(eq("Bills"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(12));
        session
            .expect_uid_copy_all()
            .with(eq("Finance/Billing"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        session
            .expect_uid_mark_all_deleted()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        session
            .expect_expunge()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        session
            .expect_close()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        session
            .expect_delete()
            .with(eq("Bills"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut executor = Executor::new(Box::new(session), Pacing::none());
        let outcome = executor
            .apply(&Operation::merge("Bills", "Finance/Billing"))
            .await;

        assert!(outcome.success);
        assert!(outcome.message.contains("12 messages"));
    }

    #[tokio::test]
    async fn test_empty_merge_is_plain_delete() {
        let mut session = MockSession::new();

        session.expect_select().times(1).returning(|_| Ok(0));
        session.expect_uid_copy_all().never();
        session.expect_uid_mark_all_deleted().never();
        session.expect_expunge().never();
        session.expect_close().times(1).returning(|| Ok(()));
        session
            .expect_delete()
            .with(eq("Bills"))
            .times(1)
            .returning(|_| Ok(()));

        let mut executor = Executor::new(Box::new(session), Pacing::none());
        let outcome = executor
            .apply(&Operation::merge("Bills", "Finance/Billing"))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.message, "Deleted empty folder 'Bills'");
    }

    #[tokio::test]
    async fn test_failed_copy_closes_and_keeps_source() {
        let mut session = MockSession::new();

        session.expect_select().times(1).returning(|_| Ok(3));
        session
            .expect_uid_copy_all()
            .times(1)
            .returning(|_| Err(imap_no("[TRYCREATE] No folder Finance/Billing")));
        session.expect_uid_mark_all_deleted().never();
        session.expect_expunge().never();
        session.expect_close().times(1).returning(|| Ok(()));
        session.expect_delete().never();

        let mut executor = Executor::new(Box::new(session), Pacing::none());
        let outcome = executor
            .apply(&Operation::merge("Bills", "Finance/Billing"))
            .await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("TRYCREATE"));
    }

    #[tokio::test]
    async fn test_defensive_close_error_is_ignored() {
        let mut session = MockSession::new();

        session
            .expect_select()
            .times(1)
            .returning(|_| Err(imap_no("[NONEXISTENT] Unknown Mailbox")));
        session
            .expect_close()
            .times(1)
            .returning(|| Err(ReorgError::ImapError("BAD No mailbox selected".to_string())));
        session.expect_delete().never();

        let mut executor = Executor::new(Box::new(session), Pacing::none());
        let outcome = executor
            .apply(&Operation::merge("Bills", "Finance/Billing"))
            .await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("NONEXISTENT"));
    }

    #[tokio::test]
    async fn test_delete_failure_after_copy_reports_moved_messages() {
        let mut session = MockSession::new();

        session.expect_select().times(1).returning(|_| Ok(4));
        session.expect_uid_copy_all().times(1).returning(|_| Ok(()));
        session.expect_uid_mark_all_deleted().times(1).returning(|| Ok(()));
        session.expect_expunge().times(1).returning(|| Ok(()));
        session.expect_close().times(1).returning(|| Ok(()));
        session
            .expect_delete()
            .times(1)
            .returning(|_| Err(imap_no("Server error")));

        let mut executor = Executor::new(Box::new(session), Pacing::none());
        let outcome = executor
            .apply(&Operation::merge("Bills", "Finance/Billing"))
            .await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("4 messages moved"));
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let mut session = MockSession::new();

        session
            .expect_rename()
            .with(eq("Billing"), eq("Finance/Billing"))
            .times(1)
            .returning(|_, _| Ok(()));
        session
            .expect_delete()
            .with(eq("General"))
            .times(1)
            .returning(|_| Err(imap_no("[NONEXISTENT] Unknown Mailbox")));

        let mut executor = Executor::new(Box::new(session), Pacing::none());

        let renamed = executor
            .apply(&Operation::rename("Billing", "Finance/Billing"))
            .await;
        assert!(renamed.success);

        let deleted = executor.apply(&Operation::delete("General")).await;
        assert!(!deleted.success);
        assert!(deleted.message.starts_with("DELETE 'General' failed"));
    }

    #[tokio::test]
    async fn test_run_continues_after_failure() {
        let mut session = MockSession::new();

        session
            .expect_rename()
            .with(eq("Billing"), eq("Finance/Billing"))
            .times(1)
            .returning(|_, _| Err(imap_no("[ALREADYEXISTS] Duplicate folder name")));
        session
            .expect_delete()
            .with(eq("General"))
            .times(1)
            .returning(|_| Ok(()));

        let plan = Plan {
            operations: vec![
                Operation::rename("Billing", "Finance/Billing"),
                Operation::delete("General"),
            ],
            ..Default::default()
        };

        let mut executor = Executor::new(Box::new(session), Pacing::none());
        let mut seen = Vec::new();
        let summary = executor
            .run(&plan, |outcome| seen.push(outcome.success))
            .await;

        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(seen, vec![false, true]);
        assert_eq!(summary.failures().count(), 1);
        assert!(summary.completed_at >= summary.started_at);
    }

    #[tokio::test]
    async fn test_message_count_examines_read_only() {
        let mut session = MockSession::new();

        session
            .expect_examine()
            .with(eq("Bills"))
            .times(1)
            .returning(|_| Ok(42));
        session.expect_select().never();
        session.expect_close().times(1).returning(|| Ok(()));
        session
            .expect_examine()
            .with(eq("Missing"))
            .times(1)
            .returning(|_| Err(imap_no("[NONEXISTENT] Unknown Mailbox")));

        let mut executor = Executor::new(Box::new(session), Pacing::none());
        assert_eq!(executor.message_count("Bills").await, Some(42));
        assert_eq!(executor.message_count("Missing").await, None);
    }

    #[test]
    fn test_pacing_from_config() {
        let config = ExecutionConfig::default();
        let pacing = Pacing::from(&config);
        assert_eq!(pacing.after(OperationKind::Rename), Duration::from_millis(200));
        assert_eq!(pacing.after(OperationKind::Merge), Duration::from_millis(300));
        assert_eq!(pacing.after(OperationKind::Delete), Duration::from_millis(100));
        assert!(Pacing::none().after(OperationKind::Merge).is_zero());
    }
}
