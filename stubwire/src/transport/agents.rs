//! User agent pool.

use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;

use crate::error::TransportError;

/// Agents used when no list is loaded.
const BUILTIN_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// Read-only list of user agent strings.
///
/// Shared between channels without locking; it is never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPool {
    agents: Vec<String>,
}

impl AgentPool {
    /// Create a pool from a list of agents.
    pub fn new(agents: Vec<String>) -> Self {
        Self { agents }
    }

    /// Parse a newline-separated list, dropping blank lines.
    pub fn from_lines(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Load a newline-separated list from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TransportError::AgentPool {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_lines(&text))
    }

    /// Pick a random agent.
    pub fn choose(&self) -> Option<&str> {
        self.agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }

    /// Number of agents in the pool.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentPool {
    fn default() -> Self {
        Self::new(BUILTIN_AGENTS.iter().map(|a| a.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lines_drops_blank_lines() {
        let pool = AgentPool::from_lines("agent-a\n\n  \nagent-b\n");
        assert_eq!(pool.len(), 2);
        let chosen = pool.choose().unwrap();
        assert!(chosen == "agent-a" || chosen == "agent-b");
    }

    #[test]
    fn test_default_pool_not_empty() {
        assert!(!AgentPool::default().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AgentPool::load("/nonexistent/user-agents.txt").unwrap_err();
        assert!(matches!(err, TransportError::AgentPool { .. }));
    }
}
