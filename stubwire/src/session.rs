//! Per-session negotiation state.
//!
//! A session maps module names to entries holding the module's status and
//! the arguments it pinned during setup, most importantly the chosen vector.
//! Entries follow a single-writer-then-readers discipline: the prober writes
//! once during setup, later commands only read. Nothing here locks, so an
//! orchestrator must finish probing before sharing the session.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Stored-argument key under which the pinned vector name is kept.
pub const PINNED_VECTOR_KEY: &str = "vector";

/// Negotiation status of one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not negotiated yet.
    #[default]
    Idle,

    /// Negotiation in progress.
    Probing,

    /// A working vector is pinned.
    Run,

    /// No vector works on this target.
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Probing => write!(f, "probing"),
            Status::Run => write!(f, "run"),
            Status::Fail => write!(f, "fail"),
        }
    }
}

/// State of one module within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Negotiation status.
    pub status: Status,

    /// Arguments pinned by setup, e.g. the chosen vector.
    #[serde(default)]
    pub stored_args: BTreeMap<String, String>,
}

impl SessionEntry {
    /// The pinned vector name, if any.
    pub fn pinned_vector(&self) -> Option<&str> {
        self.stored_args.get(PINNED_VECTOR_KEY).map(String::as_str)
    }

    /// Pin a vector and mark the entry as running.
    pub fn pin(&mut self, vector: impl Into<String>) {
        self.stored_args
            .insert(PINNED_VECTOR_KEY.to_string(), vector.into());
        self.status = Status::Run;
    }

    /// Forget the pinned vector and return to idle.
    pub fn reset(&mut self) {
        self.stored_args.remove(PINNED_VECTOR_KEY);
        self.status = Status::Idle;
    }
}

/// State scoped to one logical interaction with one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Target URL the session belongs to.
    #[serde(default)]
    pub url: Option<String>,

    /// Entries by module name.
    #[serde(default)]
    entries: BTreeMap<String, SessionEntry>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session for a target URL.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            entries: BTreeMap::new(),
        }
    }

    /// Get a module's entry.
    pub fn entry(&self, module: &str) -> Option<&SessionEntry> {
        self.entries.get(module)
    }

    /// Get a module's entry, creating an idle one if needed.
    pub fn entry_mut(&mut self, module: &str) -> &mut SessionEntry {
        self.entries.entry(module.to_string()).or_default()
    }

    /// Status of a module; modules never seen are idle.
    pub fn status(&self, module: &str) -> Status {
        self.entries
            .get(module)
            .map(|e| e.status)
            .unwrap_or_default()
    }

    /// Set a module's status.
    pub fn set_status(&mut self, module: &str, status: Status) {
        self.entry_mut(module).status = status;
    }

    /// The vector pinned by a module, if any.
    pub fn pinned_vector(&self, module: &str) -> Option<&str> {
        self.entries.get(module).and_then(SessionEntry::pinned_vector)
    }

    /// Module names with entries.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Write the session to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a session from a JSON file.
    ///
    /// A probe interrupted before it finished is read back as idle.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let json = fs::read_to_string(path)?;
        let mut session: Session = serde_json::from_str(&json)?;
        for entry in session.entries.values_mut() {
            if entry.status == Status::Probing {
                entry.status = Status::Idle;
            }
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_module_is_idle() {
        let session = Session::new();
        assert_eq!(session.status("shell_sh"), Status::Idle);
        assert!(session.pinned_vector("shell_sh").is_none());
    }

    #[test]
    fn test_pin_and_reset() {
        let mut session = Session::new();
        session.entry_mut("shell_sh").pin("passthru");
        assert_eq!(session.status("shell_sh"), Status::Run);
        assert_eq!(session.pinned_vector("shell_sh"), Some("passthru"));

        session.entry_mut("shell_sh").reset();
        assert_eq!(session.status("shell_sh"), Status::Idle);
        assert!(session.pinned_vector("shell_sh").is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&Status::Run).unwrap();
        assert_eq!(json, "\"run\"");
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "stubwire-session-{}.json",
            std::process::id()
        ));

        let mut session = Session::for_url("http://target/x.php");
        session.set_status("shell_php", Status::Run);
        session.entry_mut("shell_sh").pin("system");
        session.set_status("file_rm", Status::Probing);
        session.save(&path).unwrap();

        let loaded = Session::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.url.as_deref(), Some("http://target/x.php"));
        assert_eq!(loaded.pinned_vector("shell_sh"), Some("system"));
        assert_eq!(loaded.status("shell_php"), Status::Run);
        assert_eq!(loaded.status("file_rm"), Status::Idle);
    }

    #[test]
    fn test_load_invalid_json() {
        let path = std::env::temp_dir().join(format!(
            "stubwire-session-bad-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{not json").unwrap();
        let err = Session::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, SessionError::Json(_)));
    }
}
