use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::mailbox_name;

/// A single planned change to the mailbox
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Move the folder (and everything beneath it) to a new path
    Rename { source: String, dest: String },
    /// Copy every message into `dest`, then delete `source`
    Merge { source: String, dest: String },
    /// Remove the folder; messages stay in All Mail
    Delete { source: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Rename,
    Merge,
    Delete,
}

impl Operation {
    pub fn rename(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Operation::Rename {
            source: source.into(),
            dest: dest.into(),
        }
    }

    pub fn merge(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Operation::Merge {
            source: source.into(),
            dest: dest.into(),
        }
    }

    pub fn delete(source: impl Into<String>) -> Self {
        Operation::Delete {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        match self {
            Operation::Rename { source, .. }
            | Operation::Merge { source, .. }
            | Operation::Delete { source } => source,
        }
    }

    pub fn dest(&self) -> Option<&str> {
        match self {
            Operation::Rename { dest, .. } | Operation::Merge { dest, .. } => Some(dest),
            Operation::Delete { .. } => None,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Rename { .. } => OperationKind::Rename,
            Operation::Merge { .. } => OperationKind::Merge,
            Operation::Delete { .. } => OperationKind::Delete,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Rename { source, dest } => write!(f, "RENAME '{}' → '{}'", source, dest),
            Operation::Merge { source, dest } => write!(f, "MERGE '{}' → '{}'", source, dest),
            Operation::Delete { source } => write!(f, "DELETE '{}'", source),
        }
    }
}

/// Folder names returned by one LIST call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxSnapshot {
    folders: BTreeSet<String>,
}

impl MailboxSnapshot {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            folders: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.folders.contains(name)
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Folder names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(String::as_str)
    }

    /// The folder set expected once `plan` has been applied
    ///
    /// Renames carry descendants along and create missing ancestors of the
    /// destination (Gmail does the same). Merges and deletes drop the source.
    pub fn project(&self, plan: &Plan) -> MailboxSnapshot {
        let mut folders = self.folders.clone();

        for op in &plan.operations {
            match op {
                Operation::Rename { source, dest } => {
                    let moved: Vec<String> = folders
                        .iter()
                        .filter(|f| *f == source || mailbox_name::is_descendant_of(f, source))
                        .cloned()
                        .collect();
                    for old in moved {
                        folders.remove(&old);
                        folders.insert(format!("{}{}", dest, &old[source.len()..]));
                    }
                    for ancestor in mailbox_name::ancestors(dest) {
                        folders.insert(ancestor.to_string());
                    }
                }
                Operation::Merge { source, .. } | Operation::Delete { source } => {
                    folders.remove(source);
                }
            }
        }

        MailboxSnapshot { folders }
    }
}

/// Ordered operations plus what the planner chose not to act on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub operations: Vec<Operation>,
    /// Configured names that do not exist on the server
    pub not_found: Vec<String>,
    /// Server folders nothing in the configuration accounts for
    pub untouched: Vec<String>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind() == kind).count()
    }

    pub fn of_kind(&self, kind: OperationKind) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(move |op| op.kind() == kind)
    }
}

/// One canonical destination and the legacy labels folded into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub destination: String,
    pub sources: Vec<String>,
    /// Source to rename when several exist; defaults to the first listed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
}

impl CategoryMapping {
    pub fn new(destination: &str, sources: &[&str]) -> Self {
        Self {
            destination: destination.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            primary: None,
        }
    }

    pub fn with_primary(mut self, primary: &str) -> Self {
        self.primary = Some(primary.to_string());
        self
    }

    /// Sources in the order they are tried: primary first, then list order
    pub fn priority_order(&self) -> Vec<&str> {
        let mut order = Vec::with_capacity(self.sources.len());
        if let Some(primary) = self.primary.as_deref() {
            if self.sources.iter().any(|s| s == primary) {
                order.push(primary);
            }
        }
        for source in &self.sources {
            if !order.contains(&source.as_str()) {
                order.push(source.as_str());
            }
        }
        order
    }
}

/// Lift every folder under `prefix/` to `target/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenRule {
    pub prefix: String,
    /// Empty string moves children to the top level
    #[serde(default)]
    pub target: String,
}

impl FlattenRule {
    pub fn new(prefix: &str, target: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            target: target.to_string(),
        }
    }

    /// New path for `name`, or None if the rule does not apply
    pub fn rewrite(&self, name: &str) -> Option<String> {
        if !mailbox_name::is_descendant_of(name, &self.prefix) {
            return None;
        }
        let rest = &name[self.prefix.len() + 1..];
        if self.target.is_empty() {
            Some(rest.to_string())
        } else {
            Some(format!("{}/{}", self.target, rest))
        }
    }
}

/// Folders that are never renamed, merged or deleted
#[derive(Debug, Clone, Default)]
pub struct ProtectedFolders {
    roots: Vec<String>,
}

impl ProtectedFolders {
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.roots
            .iter()
            .any(|root| name == root || mailbox_name::is_descendant_of(name, root))
    }
}
