//! Folder name wire encoding
//!
//! Gmail exposes labels as IMAP mailboxes whose names use modified UTF-7
//! (RFC 3501 §5.1.3). Only the ampersand escape is handled here: `&` is sent
//! as `&-` and `&-` is read back as `&`. Names with non-ASCII characters are
//! passed through unchanged, which the server will misinterpret; a warning
//! is logged when that happens.

use crate::error::{ReorgError, Result};
use tracing::warn;

/// Hierarchy separator used by Gmail
pub const SEPARATOR: char = '/';

/// Encode a folder name for transmission
pub fn encode(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(ReorgError::InvalidMailboxName(
            "folder name cannot be empty".to_string(),
        ));
    }
    if name.contains('\r') || name.contains('\n') {
        return Err(ReorgError::InvalidMailboxName(format!(
            "folder name {:?} contains a line break",
            name
        )));
    }
    if !name.is_ascii() {
        warn!(
            "Folder name {:?} contains non-ASCII characters; sending it without modified UTF-7 encoding",
            name
        );
    }

    Ok(name.replace('&', "&-"))
}

/// Decode a folder name as returned by LIST
pub fn decode(raw: &str) -> String {
    raw.replace("&-", "&")
}

/// Wrap an encoded name in an IMAP quoted string
pub fn quote(encoded: &str) -> String {
    let mut quoted = String::with_capacity(encoded.len() + 2);
    quoted.push('"');
    for c in encoded.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Parent path of a folder, if it has one
pub fn parent(name: &str) -> Option<&str> {
    name.rfind(SEPARATOR).map(|idx| &name[..idx])
}

/// First path segment
pub fn top_level(name: &str) -> &str {
    name.split(SEPARATOR).next().unwrap_or(name)
}

/// Number of path segments
pub fn depth(name: &str) -> usize {
    name.split(SEPARATOR).count()
}

/// True when `name` lies strictly beneath `ancestor`
pub fn is_descendant_of(name: &str, ancestor: &str) -> bool {
    name.len() > ancestor.len()
        && name.starts_with(ancestor)
        && name[ancestor.len()..].starts_with(SEPARATOR)
}

/// All proper ancestors, nearest first ("a/b/c" -> ["a/b", "a"])
pub fn ancestors(name: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut current = name;
    while let Some(p) = parent(current) {
        result.push(p);
        current = p;
    }
    result
}

/// Check that a configured path is well formed
pub fn validate_path(name: &str) -> std::result::Result<(), String> {
    if name.trim().is_empty() {
        return Err("folder path cannot be empty".to_string());
    }
    if name.starts_with(SEPARATOR) || name.ends_with(SEPARATOR) {
        return Err(format!("folder path '{}' cannot start or end with '/'", name));
    }
    if name.split(SEPARATOR).any(|segment| segment.is_empty()) {
        return Err(format!("folder path '{}' contains an empty segment", name));
    }
    if name.contains('\r') || name.contains('\n') {
        return Err(format!("folder path {:?} contains a line break", name));
    }
    Ok(())
}
