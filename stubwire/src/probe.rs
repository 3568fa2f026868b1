//! Capability negotiation.
//!
//! The prober finds the first vector that demonstrably works on the target
//! and pins it in the session:
//!
//! ```text
//! IDLE → PROBING → RUN   (a vector echoed the token; its name is pinned)
//!                → FAIL  (candidates exhausted, or a required module is down)
//!                → IDLE  (transport or decode error; safe to retry)
//! ```

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use log::{debug, warn};
use rand::Rng;

use crate::channel::Channel;
use crate::error::Result;
use crate::session::{Session, Status};
use crate::transport::Transport;
use crate::vector::{Decision, FormatArgs, Output, VectorRegistry};

/// Range verification tokens are drawn from: always five decimal digits.
pub const TOKEN_RANGE: RangeInclusive<u32> = 11111..=99999;

/// Builds vector arguments whose correct output is exactly the token.
pub type ProbeArgs = Arc<dyn Fn(&str) -> FormatArgs + Send + Sync>;

/// Generate a random verification token.
pub fn generate_token() -> String {
    rand::thread_rng().gen_range(TOKEN_RANGE).to_string()
}

/// Negotiates a working vector for one module.
#[derive(Clone)]
pub struct Prober {
    /// Argument builder for a given token.
    args: ProbeArgs,

    /// Fixed token instead of a random one.
    token: Option<String>,

    /// Only try this vector instead of the whole registry.
    hint: Option<String>,

    /// Module that must be RUN for probing to continue.
    requires: Option<String>,
}

impl Prober {
    /// Create a prober.
    ///
    /// `args` receives the token and must return arguments for which a working
    /// vector prints exactly that token, e.g. `command = "echo <token>"`.
    pub fn new(args: impl Fn(&str) -> FormatArgs + Send + Sync + 'static) -> Self {
        Self {
            args: Arc::new(args),
            token: None,
            hint: None,
            requires: None,
        }
    }

    /// Use a fixed token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Restrict probing to a single vector. An empty name means no hint.
    pub fn with_hint(mut self, vector: impl Into<String>) -> Self {
        self.hint = Some(vector.into()).filter(|v: &String| !v.is_empty());
        self
    }

    /// Abort probing as soon as `module` is not RUN in the session.
    pub fn requires(mut self, module: impl Into<String>) -> Self {
        self.requires = Some(module.into());
        self
    }

    /// Probe the registry and record the outcome under `module`.
    ///
    /// Returns the final status: `Run` with the winner pinned, or `Fail` with
    /// stored arguments untouched. On error the entry goes back to `Idle` and
    /// the error is returned, so a network fault is never recorded as a
    /// missing capability.
    pub async fn probe<T: Transport>(
        &self,
        registry: &VectorRegistry,
        channel: &Channel<T>,
        session: &mut Session,
        module: &str,
    ) -> Result<Status> {
        session.set_status(module, Status::Probing);

        let token = self.token.clone().unwrap_or_else(generate_token);
        let args = (self.args)(&token);

        let hinted: Vec<&str> = self.hint.iter().map(String::as_str).collect();
        let candidates = self.hint.as_ref().map(|_| hinted.as_slice());

        let outcome = {
            let view: &Session = session;
            let required = self.requires.as_deref();
            registry
                .find_first_result(channel, candidates, &args, |output| {
                    if let Some(required) = required {
                        if view.status(required) != Status::Run {
                            return Decision::Abort;
                        }
                    }
                    match output.and_then(Output::as_text) {
                        Some(text) if text.trim_end() == token => Decision::Accept,
                        _ => Decision::Continue,
                    }
                })
                .await
        };

        match outcome {
            Ok(Some(found)) => {
                debug!("Module '{}' pinned vector '{}'", module, found.name);
                session.entry_mut(module).pin(found.name);
                Ok(Status::Run)
            }
            Ok(None) => {
                debug!("Module '{}' found no working vector", module);
                session.set_status(module, Status::Fail);
                Ok(Status::Fail)
            }
            Err(e) => {
                warn!("Probing for module '{}' interrupted: {}", module, e);
                session.set_status(module, Status::Idle);
                Err(e)
            }
        }
    }
}

impl fmt::Debug for Prober {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prober")
            .field("args", &"<ProbeArgs>")
            .field("token", &self.token)
            .field("hint", &self.hint)
            .field("requires", &self.requires)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_has_five_digits() {
        for _ in 0..100 {
            let token = generate_token();
            assert_eq!(token.len(), 5);
            assert!(token.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_empty_hint_is_ignored() {
        let prober = Prober::new(|t| FormatArgs::new().with("command", t)).with_hint("");
        assert!(prober.hint.is_none());

        let prober = prober.with_hint("system");
        assert_eq!(prober.hint.as_deref(), Some("system"));
    }

    #[test]
    fn test_args_builder_receives_token() {
        let prober = Prober::new(|t| FormatArgs::new().with("command", format!("echo {t}")));
        let args = (prober.args)("42424");
        assert_eq!(args.get("command"), Some("echo 42424"));
    }
}
