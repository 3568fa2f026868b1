//! HTTP transport configuration.

use std::time::Duration;

use indexmap::IndexMap;

use super::agents::AgentPool;

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Target URL of the stub.
    pub url: String,

    /// Explicit user agent, used when no `User-Agent` additional header is set.
    pub user_agent: Option<String>,

    /// Pool a random user agent is drawn from when none is configured.
    pub agents: AgentPool,

    /// Static headers sent with every request, in insertion order.
    pub additional_headers: IndexMap<String, String>,

    /// Append a random query parameter to every request to defeat caches.
    pub random_param_nocache: bool,

    /// Per-request timeout (default: none).
    pub timeout: Option<Duration>,
}

impl HttpConfig {
    /// Create a configuration for the given URL with defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: None,
            agents: AgentPool::default(),
            additional_headers: IndexMap::new(),
            random_param_nocache: false,
            timeout: None,
        }
    }

    /// Pick the user agent for a channel.
    ///
    /// A non-empty `User-Agent` additional header wins, then the explicit
    /// agent, then a random agent from the pool.
    pub fn select_user_agent(&self) -> Option<String> {
        let from_headers = self
            .additional_headers
            .iter()
            .find(|(name, value)| name.eq_ignore_ascii_case("user-agent") && !value.is_empty())
            .map(|(_, value)| value.clone());

        from_headers
            .or_else(|| self.user_agent.clone().filter(|ua| !ua.is_empty()))
            .or_else(|| self.agents.choose().map(str::to_string))
    }

    /// Additional headers other than `User-Agent`.
    pub fn extra_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.additional_headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("user-agent"))
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_user_agent_wins() {
        let mut config = HttpConfig::new("http://target/x.php");
        config.user_agent = Some("explicit".to_string());
        config
            .additional_headers
            .insert("user-agent".to_string(), "from-header".to_string());
        assert_eq!(config.select_user_agent().as_deref(), Some("from-header"));
    }

    #[test]
    fn test_empty_header_user_agent_is_ignored() {
        let mut config = HttpConfig::new("http://target/x.php");
        config.user_agent = Some("explicit".to_string());
        config
            .additional_headers
            .insert("User-Agent".to_string(), String::new());
        assert_eq!(config.select_user_agent().as_deref(), Some("explicit"));
    }

    #[test]
    fn test_pool_fallback() {
        let mut config = HttpConfig::new("http://target/x.php");
        config.agents = AgentPool::new(vec!["only-agent".to_string()]);
        assert_eq!(config.select_user_agent().as_deref(), Some("only-agent"));

        config.agents = AgentPool::new(vec![]);
        assert!(config.select_user_agent().is_none());
    }

    #[test]
    fn test_extra_headers_skip_user_agent() {
        let mut config = HttpConfig::new("http://target/x.php");
        config
            .additional_headers
            .insert("User-Agent".to_string(), "ua".to_string());
        config
            .additional_headers
            .insert("Cookie".to_string(), "a=b".to_string());
        let extra: Vec<_> = config.extra_headers().collect();
        assert_eq!(extra, vec![("Cookie", "a=b")]);
    }
}
