//! Builder for creating HTTP channels.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use super::Channel;
use super::framer::Framer;
use super::keys::KeyMaterial;
use super::padding::Padding;
use crate::error::{Error, Result};
use crate::transport::{AgentPool, HttpConfig, HttpTransport};

/// Builder for constructing channels over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use stubwire::ChannelBuilder;
///
/// # fn example() -> Result<(), stubwire::Error> {
/// let channel = ChannelBuilder::new("http://target.example/uploads/x.php")
///     .password("hunter2")
///     .header("Accept-Language", "en-US")
///     .random_param_nocache(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ChannelBuilder {
    config: HttpConfig,
    password: Option<SecretString>,
    padding: Option<Padding>,
}

impl ChannelBuilder {
    /// Create a new channel builder for the specified URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            config: HttpConfig::new(url),
            password: None,
            padding: None,
        }
    }

    /// Set the password shared with the stub.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set an explicit user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    /// Set the pool random user agents are drawn from.
    pub fn agents(mut self, agents: AgentPool) -> Self {
        self.config.agents = agents;
        self
    }

    /// Add a static header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .additional_headers
            .insert(name.into(), value.into());
        self
    }

    /// Append a random query parameter to every request.
    pub fn random_param_nocache(mut self, enabled: bool) -> Self {
        self.config.random_param_nocache = enabled;
        self
    }

    /// Set the padding mode (default: fixed pair generated at build time).
    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Build the channel.
    ///
    /// No request is sent; the first exchange happens on the first probe or
    /// command.
    pub fn build(self) -> Result<Channel<HttpTransport>> {
        let password = self.password.ok_or_else(|| Error::InvalidConfig {
            message: "Password is required".to_string(),
        })?;

        let keys = KeyMaterial::derive(password.expose_secret());
        let framer = Framer::new(keys, self.padding.unwrap_or_default())?;
        let transport = HttpTransport::new(self.config)?;

        Ok(Channel::new(framer, transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_password() {
        let err = ChannelBuilder::new("http://host/a.php").build().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_build_derives_markers() {
        let channel = ChannelBuilder::new("http://host/a.php")
            .password("hunter2")
            .user_agent("test-agent")
            .build()
            .unwrap();
        assert_eq!(channel.framer().keys().header(), b"c7dbe3439de7");
        assert_eq!(channel.transport().user_agent(), Some("test-agent"));
    }

    #[test]
    fn test_build_with_per_call_padding() {
        let channel = ChannelBuilder::new("http://host/a.php")
            .password("hunter2")
            .padding(Padding::per_call())
            .build()
            .unwrap();
        assert_eq!(channel.framer().padding(), &Padding::per_call());
    }
}
