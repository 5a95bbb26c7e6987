//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use mail_reorg::error::{ReorgError, Result};
use mail_reorg::mailbox_name;
use mail_reorg::session::MailboxSession;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

/// Server-side state shared between a [`FakeMailbox`] and the test
#[derive(Debug, Default)]
pub struct FakeServer {
    /// Folder name -> message ids
    pub folders: BTreeMap<String, Vec<u32>>,
    /// Messages flagged \Deleted in the selected folder
    pub flagged: HashSet<u32>,
    pub selected: Option<String>,
    /// Every command issued, in order ("RENAME a b", "SELECT a", ...)
    pub log: Vec<String>,
    /// Commands that answer NO, matched against log lines
    pub failing: HashSet<String>,
}

impl FakeServer {
    pub fn folder_names(&self) -> Vec<String> {
        self.folders.keys().cloned().collect()
    }

    pub fn message_count(&self, name: &str) -> usize {
        self.folders.get(name).map(Vec::len).unwrap_or(0)
    }

    fn record(&mut self, line: String) -> Result<()> {
        let fail = self.failing.contains(&line);
        self.log.push(line);
        if fail {
            return Err(ReorgError::ImapError("NO injected failure".to_string()));
        }
        Ok(())
    }
}

/// In-memory mailbox with Gmail-like folder semantics
#[derive(Clone)]
pub struct FakeMailbox {
    pub server: Arc<Mutex<FakeServer>>,
}

impl FakeMailbox {
    /// Create folders with the given number of messages each
    pub fn with_folders(folders: &[(&str, u32)]) -> Self {
        let mut server = FakeServer::default();
        let mut next_id = 1;
        for (name, count) in folders {
            let ids: Vec<u32> = (next_id..next_id + count).collect();
            next_id += count;
            server.folders.insert(name.to_string(), ids);
        }
        Self {
            server: Arc::new(Mutex::new(server)),
        }
    }

    pub fn fail_on(&self, command: &str) {
        self.server.lock().unwrap().failing.insert(command.to_string());
    }

    pub fn folder_names(&self) -> Vec<String> {
        self.server.lock().unwrap().folder_names()
    }

    pub fn message_count(&self, name: &str) -> usize {
        self.server.lock().unwrap().message_count(name)
    }

    pub fn log(&self) -> Vec<String> {
        self.server.lock().unwrap().log.clone()
    }
}

fn no(msg: &str) -> ReorgError {
    ReorgError::ImapError(format!("NO {}", msg))
}

#[async_trait]
impl MailboxSession for FakeMailbox {
    async fn list_mailboxes(&mut self) -> Result<Vec<String>> {
        let mut server = self.server.lock().unwrap();
        server.record("LIST".to_string())?;
        Ok(server.folder_names())
    }

    async fn examine(&mut self, name: &str) -> Result<u32> {
        let mut server = self.server.lock().unwrap();
        server.record(format!("EXAMINE {}", name))?;
        let count = server
            .folders
            .get(name)
            .map(|m| m.len() as u32)
            .ok_or_else(|| no("[NONEXISTENT] Unknown Mailbox"))?;
        server.selected = Some(name.to_string());
        Ok(count)
    }

    async fn select(&mut self, name: &str) -> Result<u32> {
        let mut server = self.server.lock().unwrap();
        server.record(format!("SELECT {}", name))?;
        let count = server
            .folders
            .get(name)
            .map(|m| m.len() as u32)
            .ok_or_else(|| no("[NONEXISTENT] Unknown Mailbox"))?;
        server.selected = Some(name.to_string());
        server.flagged.clear();
        Ok(count)
    }

    async fn uid_copy_all(&mut self, dest: &str) -> Result<()> {
        let mut server = self.server.lock().unwrap();
        server.record(format!("UID COPY {}", dest))?;
        let source = server
            .selected
            .clone()
            .ok_or_else(|| ReorgError::ImapError("BAD No mailbox selected".to_string()))?;
        if !server.folders.contains_key(dest) {
            return Err(no("[TRYCREATE] No folder"));
        }
        let messages = server.folders.get(&source).cloned().unwrap_or_default();
        if let Some(target) = server.folders.get_mut(dest) {
            for id in messages {
                if !target.contains(&id) {
                    target.push(id);
                }
            }
        }
        Ok(())
    }

    async fn uid_mark_all_deleted(&mut self) -> Result<()> {
        let mut server = self.server.lock().unwrap();
        server.record("UID STORE +FLAGS (\\Deleted)".to_string())?;
        let source = server
            .selected
            .clone()
            .ok_or_else(|| ReorgError::ImapError("BAD No mailbox selected".to_string()))?;
        let ids = server.folders.get(&source).cloned().unwrap_or_default();
        server.flagged.extend(ids);
        Ok(())
    }

    async fn expunge(&mut self) -> Result<()> {
        let mut server = self.server.lock().unwrap();
        server.record("EXPUNGE".to_string())?;
        let source = server
            .selected
            .clone()
            .ok_or_else(|| ReorgError::ImapError("BAD No mailbox selected".to_string()))?;
        let flagged = std::mem::take(&mut server.flagged);
        if let Some(messages) = server.folders.get_mut(&source) {
            messages.retain(|id| !flagged.contains(id));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut server = self.server.lock().unwrap();
        server.record("CLOSE".to_string())?;
        if server.selected.take().is_none() {
            return Err(ReorgError::ImapError("BAD No mailbox selected".to_string()));
        }
        server.flagged.clear();
        Ok(())
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let mut server = self.server.lock().unwrap();
        server.record(format!("RENAME {} {}", from, to))?;
        if !server.folders.contains_key(from) {
            return Err(no("[NONEXISTENT] Unknown Mailbox"));
        }
        if server.folders.contains_key(to) {
            return Err(no("[ALREADYEXISTS] Duplicate folder name"));
        }

        let moved: Vec<String> = server
            .folders
            .keys()
            .filter(|f| f.as_str() == from || mailbox_name::is_descendant_of(f, from))
            .cloned()
            .collect();
        for old in moved {
            let messages = server.folders.remove(&old).unwrap_or_default();
            server
                .folders
                .insert(format!("{}{}", to, &old[from.len()..]), messages);
        }
        for ancestor in mailbox_name::ancestors(to) {
            server.folders.entry(ancestor.to_string()).or_default();
        }
        Ok(())
    }

    async fn delete(&mut self, name: &str) -> Result<()> {
        let mut server = self.server.lock().unwrap();
        server.record(format!("DELETE {}", name))?;
        if server.folders.remove(name).is_none() {
            return Err(no("[NONEXISTENT] Unknown Mailbox"));
        }
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        let mut server = self.server.lock().unwrap();
        server.record("LOGOUT".to_string())
    }
}
