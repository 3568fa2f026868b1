//! Ordered, name-indexed collection of vectors.

use indexmap::IndexMap;
use log::{debug, trace};

use super::definition::Vector;
use super::template::FormatArgs;
use super::{Os, Output};
use crate::channel::Channel;
use crate::error::{Result, VectorError};
use crate::transport::Transport;

/// Verdict of a search condition on one candidate's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// This candidate did not satisfy the condition; try the next one.
    Continue,

    /// Stop and return this candidate.
    Accept,

    /// Stop the whole search and return nothing.
    Abort,
}

/// The accepted candidate of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    /// Name of the accepted vector.
    pub name: String,

    /// Its output, if the stub produced one.
    pub output: Option<Output>,
}

/// Registry of vectors in registration (preference) order.
#[derive(Debug, Clone, Default)]
pub struct VectorRegistry {
    vectors: IndexMap<String, Vector>,
}

impl VectorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            vectors: IndexMap::new(),
        }
    }

    /// Register a vector. Names must be unique.
    pub fn register(&mut self, vector: impl Into<Vector>) -> std::result::Result<(), VectorError> {
        let vector = vector.into();
        if self.vectors.contains_key(vector.name()) {
            return Err(VectorError::AlreadyRegistered {
                name: vector.name().to_string(),
            });
        }
        self.vectors.insert(vector.name().to_string(), vector);
        Ok(())
    }

    /// Register a vector, builder style.
    pub fn with(mut self, vector: impl Into<Vector>) -> std::result::Result<Self, VectorError> {
        self.register(vector)?;
        Ok(self)
    }

    /// All registered names, in registration order.
    pub fn get_names(&self) -> Vec<&str> {
        self.vectors.keys().map(String::as_str).collect()
    }

    /// Names of vectors applicable to a target OS, in registration order.
    pub fn names_for(&self, target: Os) -> Vec<&str> {
        self.vectors
            .values()
            .filter(|v| v.os().applies_to(target))
            .map(Vector::name)
            .collect()
    }

    /// Get a vector by name.
    pub fn get(&self, name: &str) -> std::result::Result<&Vector, VectorError> {
        self.vectors.get(name).ok_or_else(|| VectorError::Unknown {
            name: name.to_string(),
        })
    }

    /// Check if a vector is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.vectors.contains_key(name)
    }

    /// Number of registered vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Execute candidates in order until `condition` accepts or aborts.
    ///
    /// `candidates` of `None` means every vector in registration order. All
    /// names are resolved before anything is sent, so an unknown name fails
    /// without touching the transport, and an empty list returns `Ok(None)`
    /// without any request.
    ///
    /// Returns the first accepted candidate, or `None` when the candidates are
    /// exhausted or the condition aborts. Transport and decode errors stop the
    /// search and are returned as-is.
    pub async fn find_first_result<T, F>(
        &self,
        channel: &Channel<T>,
        candidates: Option<&[&str]>,
        args: &FormatArgs,
        mut condition: F,
    ) -> Result<Option<Found>>
    where
        T: Transport,
        F: FnMut(Option<&Output>) -> Decision,
    {
        let vectors: Vec<&Vector> = match candidates {
            Some(names) => names
                .iter()
                .map(|name| self.get(name))
                .collect::<std::result::Result<_, _>>()?,
            None => self.vectors.values().collect(),
        };

        for vector in vectors {
            let output = vector.execute(channel, args).await?;
            match condition(output.as_ref()) {
                Decision::Accept => {
                    debug!("Vector '{}' accepted", vector.name());
                    return Ok(Some(Found {
                        name: vector.name().to_string(),
                        output,
                    }));
                }
                Decision::Abort => {
                    debug!("Search aborted at vector '{}'", vector.name());
                    return Ok(None);
                }
                Decision::Continue => {
                    trace!("Vector '{}' rejected: {:?}", vector.name(), output);
                }
            }
        }

        Ok(None)
    }

    /// Execute exactly the named vector, without any probing.
    pub async fn get_result<T: Transport>(
        &self,
        channel: &Channel<T>,
        name: &str,
        args: &FormatArgs,
    ) -> Result<Option<Output>> {
        self.get(name)?.execute(channel, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::CodeVector;

    fn registry() -> VectorRegistry {
        VectorRegistry::new()
            .with(CodeVector::new("system", "a").unwrap())
            .unwrap()
            .with(CodeVector::new("pcntl", "b").unwrap().with_os(Os::Nix))
            .unwrap()
            .with(CodeVector::new("wscript", "c").unwrap().with_os(Os::Win))
            .unwrap()
    }

    #[test]
    fn test_names_keep_registration_order() {
        assert_eq!(registry().get_names(), vec!["system", "pcntl", "wscript"]);
    }

    #[test]
    fn test_names_for_os() {
        let registry = registry();
        assert_eq!(registry.names_for(Os::Nix), vec!["system", "pcntl"]);
        assert_eq!(registry.names_for(Os::Win), vec!["system", "wscript"]);
        assert_eq!(registry.names_for(Os::Any).len(), 3);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = registry();
        let err = registry
            .register(CodeVector::new("system", "other").unwrap())
            .unwrap_err();
        assert!(matches!(err, VectorError::AlreadyRegistered { .. }));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_get_unknown() {
        let err = registry().get("nope").unwrap_err();
        assert!(matches!(err, VectorError::Unknown { name } if name == "nope"));
    }
}
