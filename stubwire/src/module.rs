//! Command modules: a vector registry bound to a session entry.
//!
//! A module negotiates once per session in [`CommandModule::setup`] and then
//! runs its pinned vector for every command in [`CommandModule::run`].

use log::debug;

use crate::channel::Channel;
use crate::error::{Result, SessionError};
use crate::probe::Prober;
use crate::session::{Session, Status};
use crate::transport::Transport;
use crate::vector::{FormatArgs, Output, Vector, VectorRegistry};

/// A named capability with its candidate vectors and probe strategy.
#[derive(Debug, Clone)]
pub struct CommandModule {
    name: String,
    registry: VectorRegistry,
    prober: Prober,
}

impl CommandModule {
    /// Create a module.
    pub fn new(name: impl Into<String>, registry: VectorRegistry, prober: Prober) -> Self {
        Self {
            name: name.into(),
            registry,
            prober,
        }
    }

    /// Module name, also the session entry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module's vectors.
    pub fn registry(&self) -> &VectorRegistry {
        &self.registry
    }

    /// Negotiate a vector unless the session already settled it.
    ///
    /// Only an idle entry is probed. A pinned vector is never replaced here;
    /// use [`CommandModule::reprobe`] for that.
    pub async fn setup<T: Transport>(
        &self,
        channel: &Channel<T>,
        session: &mut Session,
    ) -> Result<Status> {
        let status = session.status(&self.name);
        if status != Status::Idle {
            debug!("Module '{}' already set up ({})", self.name, status);
            return Ok(status);
        }
        self.prober
            .probe(&self.registry, channel, session, &self.name)
            .await
    }

    /// Forget the pinned vector and negotiate again.
    pub async fn reprobe<T: Transport>(
        &self,
        channel: &Channel<T>,
        session: &mut Session,
    ) -> Result<Status> {
        session.entry_mut(&self.name).reset();
        self.prober
            .probe(&self.registry, channel, session, &self.name)
            .await
    }

    /// The vector pinned for this module in the session.
    pub fn pinned(&self, session: &Session) -> Result<&Vector> {
        let status = session.status(&self.name);
        if status != Status::Run {
            return Err(SessionError::NotReady {
                module: self.name.clone(),
                status,
            }
            .into());
        }
        let name = session
            .pinned_vector(&self.name)
            .ok_or_else(|| SessionError::NoPinnedVector {
                module: self.name.clone(),
            })?;
        Ok(self.registry.get(name)?)
    }

    /// Run the pinned vector with the given arguments.
    ///
    /// Fails with [`SessionError::NotReady`] when negotiation has not
    /// succeeded, so an unavailable capability never crashes the session.
    pub async fn run<T: Transport>(
        &self,
        channel: &Channel<T>,
        session: &Session,
        args: &FormatArgs,
    ) -> Result<Option<Output>> {
        let vector = self.pinned(session)?;
        self.registry.get_result(channel, vector.name(), args).await
    }
}
