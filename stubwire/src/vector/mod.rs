//! Vectors and the vector registry.
//!
//! A vector is one concrete way of getting the stub to do something. Several
//! vectors usually implement the same capability; the registry keeps them in
//! preference order so a prober can find the first one that works.

mod definition;
mod registry;
mod template;

pub use definition::{CodeVector, Postprocess, ShellVector, Vector};
pub use registry::{Decision, Found, VectorRegistry};
pub use template::{FormatArgs, Template};

use std::fmt;

/// Target operating system family a vector applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Os {
    /// Works everywhere, or the target OS is unknown.
    #[default]
    Any,

    /// Unix-like targets.
    Nix,

    /// Windows targets.
    Win,
}

impl Os {
    /// Check whether a vector with this constraint applies to `target`.
    ///
    /// An unknown target (`Any`) admits every vector.
    pub fn applies_to(self, target: Os) -> bool {
        self == Os::Any || target == Os::Any || self == target
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Any => write!(f, "any"),
            Os::Nix => write!(f, "nix"),
            Os::Win => write!(f, "win"),
        }
    }
}

/// Result of executing a vector, after its postprocess step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Raw text printed by the stub.
    Text(String),

    /// Success flag, e.g. from a `print(1)`/`print(0)` payload.
    Flag(bool),

    /// Text split into lines.
    Lines(Vec<String>),
}

impl Output {
    /// Get the text, if this is a text output.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Split raw text into lines; usable as a postprocess step.
    pub fn lines(raw: String) -> Output {
        Output::Lines(raw.lines().map(str::to_string).collect())
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Text(text) => write!(f, "{}", text),
            Output::Flag(flag) => write!(f, "{}", flag),
            Output::Lines(lines) => write!(f, "{}", lines.join("\n")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_applies_to() {
        assert!(Os::Any.applies_to(Os::Win));
        assert!(Os::Nix.applies_to(Os::Any));
        assert!(Os::Nix.applies_to(Os::Nix));
        assert!(!Os::Nix.applies_to(Os::Win));
    }

    #[test]
    fn test_output_lines() {
        let output = Output::lines("a\nb\r\nc".to_string());
        assert_eq!(
            output,
            Output::Lines(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert!(output.as_text().is_none());
        assert_eq!(output.to_string(), "a\nb\nc");
    }
}
