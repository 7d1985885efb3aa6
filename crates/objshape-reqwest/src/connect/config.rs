//! Configuration for the Speckle client.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default server, used when no server URL is configured.
pub const DEFAULT_SERVER_URL: &str = "https://app.speckle.systems";

/// Default timeout for HTTP requests: 60 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the Speckle client.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SpeckleClientConfig {
    /// Base URL of the Speckle server.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "speckle-server-url",
            env = "SPECKLE_SERVER_URL",
            default_value = DEFAULT_SERVER_URL
        )
    )]
    #[serde(default = "default_server_url")]
    pub server_url: Url,

    /// Personal access or automation token.
    #[cfg_attr(
        feature = "config",
        arg(long = "speckle-token", env = "SPECKLE_TOKEN", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "speckle-timeout", env = "SPECKLE_TIMEOUT", default_value_t = 60)
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[cfg_attr(
        feature = "config",
        arg(long = "speckle-user-agent", env = "SPECKLE_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_server_url() -> Url {
    // The constant is a valid absolute URL.
    Url::parse(DEFAULT_SERVER_URL).unwrap_or_else(|_| unreachable!())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl fmt::Debug for SpeckleClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeckleClientConfig")
            .field("server_url", &self.server_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for SpeckleClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl SpeckleClientConfig {
    /// Creates a configuration for the given server and token.
    pub fn new(server_url: Url, token: impl Into<String>) -> Self {
        Self {
            server_url,
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Returns the default user agent string.
    fn default_user_agent() -> String {
        format!("objshape/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Creates a new configuration with the specified server.
    pub fn with_server_url(mut self, server_url: Url) -> Self {
        self.server_url = server_url;
        self
    }

    /// Creates a new configuration with the specified token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Creates a new configuration with the specified timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Creates a new configuration with the specified user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    /// Returns the effective user agent, using default if empty.
    pub fn effective_user_agent(&self) -> String {
        match &self.user_agent {
            Some(user_agent) if !user_agent.is_empty() => user_agent.clone(),
            _ => Self::default_user_agent(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.server_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "server URL must use http or https, got {}",
                self.server_url.scheme()
            )));
        }
        if self.token.as_deref().is_some_and(str::is_empty) {
            return Err(Error::Config("token cannot be empty".into()));
        }
        Ok(())
    }

    /// Returns `path` resolved below `server_url`.
    ///
    /// A server mounted under a sub-path keeps it whether or not the
    /// configured URL ends with `/`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.server_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(base.join(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SpeckleClientConfig::default();
        assert_eq!(config.server_url.as_str(), "https://app.speckle.systems/");
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
        assert!(config.effective_user_agent().contains("objshape"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_effective_timeout_uses_default_when_zero() {
        let config = SpeckleClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = SpeckleClientConfig::default().with_token("secret-token");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_validate() {
        let config = SpeckleClientConfig::default().with_token("");
        assert!(config.validate().is_err());

        let config = SpeckleClientConfig::default()
            .with_server_url(Url::parse("ftp://example.org").unwrap());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint() {
        let config = SpeckleClientConfig::default()
            .with_server_url(Url::parse("https://speckle.example.org/").unwrap());
        assert_eq!(
            config.endpoint("graphql").unwrap().as_str(),
            "https://speckle.example.org/graphql"
        );
        assert_eq!(
            config.endpoint("objects/p/o").unwrap().as_str(),
            "https://speckle.example.org/objects/p/o"
        );
    }

    #[test]
    fn test_endpoint_keeps_sub_path() {
        let config = SpeckleClientConfig::default()
            .with_server_url(Url::parse("https://example.org/speckle").unwrap());
        assert_eq!(
            config.endpoint("graphql").unwrap().as_str(),
            "https://example.org/speckle/graphql"
        );

        let config = SpeckleClientConfig::default()
            .with_server_url(Url::parse("https://example.org/speckle/").unwrap());
        assert_eq!(
            config.endpoint("objects/p").unwrap().as_str(),
            "https://example.org/speckle/objects/p"
        );
    }
}
