use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Connection and call settings, owned by the [`crate::Client`].
///
/// Host and port changes take effect on the next connect; an open connection
/// keeps talking to the old endpoint until it is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Prepended to every remote method name.
    pub prefix: String,
    /// Read and write timeout in whole seconds. Zero blocks without limit.
    pub timeout_secs: u64,
    /// Connect before and disconnect after every call.
    pub reconnect: bool,
    /// Log raw request and reply text under the `jsonrpc_client::wire` target.
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            prefix: String::new(),
            timeout_secs: 1,
            reconnect: false,
            debug: false,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Socket timeout, `None` when `timeout_secs` is zero.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Host and port, or a configuration error if either is unset.
    pub fn endpoint(&self) -> Result<(&str, u16)> {
        match (self.host.as_deref(), self.port) {
            (Some(host), Some(port)) => Ok((host, port)),
            _ => Err(ClientError::Configuration(
                "port or host not provided".to_string(),
            )),
        }
    }

    /// Full remote name for `name`.
    pub fn method_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.host, None);
        assert_eq!(config.port, None);
        assert_eq!(config.prefix, "");
        assert_eq!(config.timeout_secs, 1);
        assert!(!config.reconnect);
        assert!(!config.debug);
        assert_eq!(config.timeout(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn builder() {
        let config = ClientConfig::new()
            .with_host("127.0.0.1")
            .with_port(3000)
            .with_prefix("test.")
            .with_timeout(5)
            .with_reconnect(true)
            .with_debug(true);

        assert_eq!(config.endpoint().unwrap(), ("127.0.0.1", 3000));
        assert_eq!(config.method_name("Test"), "test.Test");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert!(config.reconnect);
        assert!(config.debug);
    }

    #[test]
    fn zero_timeout_blocks() {
        assert_eq!(ClientConfig::new().with_timeout(0).timeout(), None);
    }

    #[test]
    fn missing_endpoint_is_a_configuration_error() {
        let err = ClientConfig::new().with_host("localhost").endpoint().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));

        let err = ClientConfig::new().with_port(1).endpoint().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"host": "10.0.0.1", "port": 4000, "reconnect": true}"#)
                .unwrap();

        assert_eq!(
            config,
            ClientConfig::new()
                .with_host("10.0.0.1")
                .with_port(4000)
                .with_reconnect(true)
        );
    }
}
