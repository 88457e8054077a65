//! Configuration structures.
//!
//! Configuration is loaded from a TOML file named on the command line. Every
//! optional component field is an `Option`: an absent field leaves the
//! component default untouched and is never turned into a zero value.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::errors::ConfigError;

/// Top-level host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway instances, built in list order.
    #[serde(default)]
    pub gateways: Vec<GatewayConfig>,

    /// Processor instances, built in list order.
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,

    /// The single router.
    pub router: RouterConfig,

    /// Source → destinations entries. Entries sharing a source are merged.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl Config {
    /// Parse a configuration from TOML text. `origin` is only used in errors.
    pub fn from_toml_str(text: &str, origin: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::parse_toml(origin, e))
    }

    /// Read and parse the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml_str(&text, path)?;
        tracing::debug!(
            path = %path.display(),
            gateways = config.gateways.len(),
            processors = config.processors.len(),
            routes = config.routes.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

/// Gateway configuration, tagged by gateway kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayConfig {
    Irc(IrcGatewayConfig),
    Telegram(TelegramGatewayConfig),
    Console(ConsoleGatewayConfig),
}

impl GatewayConfig {
    pub fn identifier(&self) -> &str {
        match self {
            GatewayConfig::Irc(c) => &c.identifier,
            GatewayConfig::Telegram(c) => &c.identifier,
            GatewayConfig::Console(c) => &c.identifier,
        }
    }

    /// Path of the module that provides this gateway.
    pub fn module(&self) -> &str {
        match self {
            GatewayConfig::Irc(c) => &c.module,
            GatewayConfig::Telegram(c) => &c.module,
            GatewayConfig::Console(c) => &c.module,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayConfig::Irc(_) => "irc",
            GatewayConfig::Telegram(_) => "telegram",
            GatewayConfig::Console(_) => "console",
        }
    }
}

/// IRC gateway fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrcGatewayConfig {
    pub identifier: String,
    pub module: String,
    pub nick: Option<String>,
    pub ident: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub server_address: Option<String>,
    pub server_port: Option<u16>,
    #[serde(alias = "server_use_ssl")]
    pub server_use_tls: Option<bool>,
    pub quit_message: Option<String>,
}

/// Telegram gateway fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramGatewayConfig {
    pub identifier: String,
    pub module: String,
    pub api_token: Option<String>,
    pub updates_limit: Option<u32>,
    pub updates_timeout: Option<u32>,
    pub updates_allowed: Option<Vec<String>>,
}

/// Console gateway fields (standard input lines become events).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleGatewayConfig {
    pub identifier: String,
    pub module: String,
}

/// Processor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    pub identifier: String,
    pub module: String,
    /// Processor-specific configuration file. Opaque to the host.
    pub config: Option<PathBuf>,
}

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    pub module: String,
}

/// One route entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub source: String,
    #[serde(default)]
    pub destinations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
[router]
module = "builtin/router"

[[gateways]]
kind = "irc"
identifier = "irc-main"
module = "plugins/irc.mod"
nick = "emersyx"
server_address = "irc.libera.chat"
server_port = 6697
server_use_tls = true

[[gateways]]
kind = "telegram"
identifier = "tg-main"
module = "plugins/telegram.mod"
api_token = "secret"
updates_allowed = ["message", "edited_message"]

[[processors]]
identifier = "logger"
module = "builtin/log-processor"
config = "logger.toml"

[[routes]]
source = "irc-main"
destinations = ["logger"]

[[routes]]
source = "tg-main"
destinations = ["logger"]
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_toml_str(SAMPLE, "sample.toml").unwrap();

        assert_eq!(config.router.module, "builtin/router");
        assert_eq!(config.gateways.len(), 2);
        assert_eq!(config.processors.len(), 1);
        assert_eq!(config.routes.len(), 2);

        assert_eq!(
            config.gateways[0],
            GatewayConfig::Irc(IrcGatewayConfig {
                identifier: "irc-main".to_string(),
                module: "plugins/irc.mod".to_string(),
                nick: Some("emersyx".to_string()),
                server_address: Some("irc.libera.chat".to_string()),
                server_port: Some(6697),
                server_use_tls: Some(true),
                ..Default::default()
            })
        );
        assert_eq!(config.gateways[1].kind(), "telegram");
        assert_eq!(config.gateways[1].identifier(), "tg-main");
        assert_eq!(
            config.processors[0].config,
            Some(PathBuf::from("logger.toml"))
        );
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let text = r#"
[router]
module = "r"

[[gateways]]
kind = "irc"
identifier = "g"
module = "m"
"#;
        let config = Config::from_toml_str(text, "inline").unwrap();
        match &config.gateways[0] {
            GatewayConfig::Irc(irc) => {
                assert!(irc.nick.is_none());
                assert!(irc.server_port.is_none());
                assert!(irc.quit_message.is_none());
            }
            other => panic!("expected irc gateway, got {:?}", other),
        }
        assert!(config.processors.is_empty());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_server_use_ssl_key_sets_tls_flag() {
        use crate::component::ComponentOption;

        let text = r#"
[router]
module = "r"

[[gateways]]
kind = "irc"
identifier = "g"
module = "m"
server_address = "irc.libera.chat"
server_port = 6697
server_use_ssl = true
"#;
        let config = Config::from_toml_str(text, "inline").unwrap();
        match &config.gateways[0] {
            GatewayConfig::Irc(irc) => assert_eq!(irc.server_use_tls, Some(true)),
            other => panic!("expected irc gateway, got {:?}", other),
        }

        let options = crate::assembly::options::gateway_options(
            &config.gateways[0],
            &crate::observability::LogSink::discard(),
        );
        assert!(options.iter().any(|o| o.name() == "server"));
    }

    #[test]
    fn test_missing_router_is_parse_error() {
        let err = Config::from_toml_str("", "empty.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains("empty.toml"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/emersyx.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emersyx.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.gateways.len(), 2);
    }
}
