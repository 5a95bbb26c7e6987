//! Folder name resolver
//!
//! Turns one [`MailboxSnapshot`] into an ordered [`Plan`] without touching
//! the network. Phases run in the order they are called and share state, so
//! a folder created by an earlier rename is treated as existing by later
//! phases and no folder is the source of two operations.
//!
//! ```
//! use mail_reorg::models::{CategoryMapping, MailboxSnapshot, Operation, ProtectedFolders};
//! use mail_reorg::planner::Planner;
//!
//! let mappings = vec![CategoryMapping::new("Finance/Billing", &["Billing", "Bills"])];
//! let snapshot = MailboxSnapshot::from_names(["Billing", "Bills", "INBOX"]);
//! let protected = ProtectedFolders::new(["INBOX"]);
//!
//! let mut planner = Planner::new(&snapshot, &protected, &mappings);
//! planner.consolidate();
//! let plan = planner.finish();
//!
//! assert_eq!(
//!     plan.operations,
//!     vec![
//!         Operation::rename("Billing", "Finance/Billing"),
//!         Operation::merge("Bills", "Finance/Billing"),
//!     ]
//! );
//! ```

use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::mailbox_name;
use crate::models::{CategoryMapping, FlattenRule, MailboxSnapshot, Operation, Plan, ProtectedFolders};

pub struct Planner<'a> {
    snapshot: &'a MailboxSnapshot,
    protected: &'a ProtectedFolders,
    mappings: &'a [CategoryMapping],
    /// Folders that exist, or will exist, at this point of the plan
    established: HashSet<String>,
    /// Folders already used as an operation source
    claimed: HashSet<String>,
    /// Sources of planned renames; their children travel with them
    moved: HashSet<String>,
    plan: Plan,
}

impl<'a> Planner<'a> {
    pub fn new(
        snapshot: &'a MailboxSnapshot,
        protected: &'a ProtectedFolders,
        mappings: &'a [CategoryMapping],
    ) -> Self {
        Self {
            snapshot,
            protected,
            mappings,
            established: snapshot.iter().map(str::to_string).collect(),
            claimed: HashSet::new(),
            moved: HashSet::new(),
            plan: Plan::default(),
        }
    }

    /// Move children of nested containers up to their rule target, then
    /// delete the emptied containers (deepest first)
    pub fn flatten(&mut self, rules: &[FlattenRule]) -> &mut Self {
        let snapshot = self.snapshot;
        let containers: HashSet<&str> = rules.iter().map(|r| r.prefix.as_str()).collect();

        for name in snapshot.iter() {
            if containers.contains(name) || !self.is_available(name) {
                continue;
            }

            // Longest matching prefix wins
            let Some(rule) = rules
                .iter()
                .filter(|r| mailbox_name::is_descendant_of(name, &r.prefix))
                .max_by_key(|r| r.prefix.len())
            else {
                continue;
            };
            let Some(dest) = rule.rewrite(name) else {
                continue;
            };

            if dest == name {
                continue;
            }
            if self.protected.is_protected(&dest) {
                warn!("Skipping '{}': target '{}' is protected", name, dest);
                continue;
            }

            self.move_into(name, &dest);
        }

        let mut present: Vec<&str> = containers
            .into_iter()
            .filter(|c| snapshot.contains(c) && self.is_available(c))
            .collect();
        present.sort_by(|a, b| {
            mailbox_name::depth(b)
                .cmp(&mailbox_name::depth(a))
                .then_with(|| a.cmp(b))
        });
        // A container still holding a child that did not move stays put
        let mut emptied: HashSet<&str> = HashSet::new();
        for container in present {
            let remaining = snapshot.iter().find(|name| {
                mailbox_name::is_descendant_of(name, container)
                    && !emptied.contains(name)
                    && !self.is_gone(name)
            });
            if let Some(child) = remaining {
                warn!("Keeping '{}': '{}' is still inside it", container, child);
                continue;
            }
            emptied.insert(container);
            self.remove(container);
        }

        self
    }

    /// Fold legacy labels into their canonical destinations
    ///
    /// For each mapping the first existing source (in priority order) is
    /// renamed onto the destination; the rest are merged into it. A
    /// destination that already exists turns the rename into a merge.
    pub fn consolidate(&mut self) -> &mut Self {
        let mappings = self.mappings;

        for mapping in mappings {
            for source in mapping.priority_order() {
                if self.claimed.contains(source) {
                    debug!("'{}' already handled by an earlier phase", source);
                    continue;
                }
                if !self.snapshot.contains(source) {
                    self.plan.not_found.push(source.to_string());
                    continue;
                }
                if !self.is_available(source) {
                    continue;
                }
                self.move_into(source, &mapping.destination);
            }
        }

        self
    }

    /// Delete listed labels that still exist
    pub fn prune(&mut self, labels: &[String]) -> &mut Self {
        let unique: BTreeSet<&str> = labels.iter().map(String::as_str).collect();

        let mut present = Vec::new();
        for label in unique {
            if !self.snapshot.contains(label) {
                self.plan.not_found.push(label.to_string());
            } else if self.is_available(label) {
                present.push(label);
            }
        }

        present.sort_by(|a, b| {
            mailbox_name::depth(b)
                .cmp(&mailbox_name::depth(a))
                .then_with(|| a.cmp(b))
        });
        for label in present {
            self.remove(label);
        }

        self
    }

    /// Close the plan and list the folders nothing accounted for
    pub fn finish(mut self) -> Plan {
        let roots: HashSet<&str> = self
            .mappings
            .iter()
            .map(|m| mailbox_name::top_level(&m.destination))
            .collect();

        self.plan.untouched = self
            .snapshot
            .iter()
            .filter(|name| !self.protected.is_protected(name))
            .filter(|name| !self.claimed.contains(*name))
            .filter(|name| {
                !mailbox_name::ancestors(name)
                    .iter()
                    .any(|a| self.claimed.contains(*a))
            })
            .filter(|name| !roots.contains(mailbox_name::top_level(name)))
            .map(str::to_string)
            .collect();

        self.plan.not_found.sort();
        self.plan.not_found.dedup();
        self.plan
    }

    /// Not protected, not consumed, and not carried away by a renamed parent
    fn is_available(&self, name: &str) -> bool {
        if self.protected.is_protected(name) {
            debug!("'{}' is protected", name);
            return false;
        }
        if self.claimed.contains(name) {
            return false;
        }
        if mailbox_name::ancestors(name)
            .iter()
            .any(|a| self.moved.contains(*a))
        {
            debug!("'{}' moves with its renamed parent", name);
            return false;
        }
        true
    }

    /// Claimed, or carried away by a renamed ancestor
    fn is_gone(&self, name: &str) -> bool {
        self.claimed.contains(name)
            || mailbox_name::ancestors(name)
                .iter()
                .any(|a| self.moved.contains(*a))
    }

    fn move_into(&mut self, source: &str, dest: &str) {
        self.claimed.insert(source.to_string());

        let op = if self.established.contains(dest) {
            self.established.remove(source);
            Operation::merge(source, dest)
        } else {
            self.carry(source, dest);
            self.moved.insert(source.to_string());
            Operation::rename(source, dest)
        };

        debug!("Planned {}", op);
        self.plan.operations.push(op);
    }

    /// Record a rename: the subtree moves under `dest` and the server
    /// creates any missing ancestors of `dest`
    fn carry(&mut self, source: &str, dest: &str) {
        let subtree: Vec<String> = self
            .established
            .iter()
            .filter(|f| f.as_str() == source || mailbox_name::is_descendant_of(f, source))
            .cloned()
            .collect();
        for old in subtree {
            self.established.remove(&old);
            self.established
                .insert(format!("{}{}", dest, &old[source.len()..]));
        }

        self.established.insert(dest.to_string());
        for ancestor in mailbox_name::ancestors(dest) {
            self.established.insert(ancestor.to_string());
        }
    }

    fn remove(&mut self, source: &str) {
        self.claimed.insert(source.to_string());
        self.established.remove(source);

        let op = Operation::delete(source);
        debug!("Planned {}", op);
        self.plan.operations.push(op);
    }
}
