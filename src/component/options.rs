//! Tagged configuration options, one enum per component kind.
//!
//! The host emits these in a fixed order (identifier first, logging last) and
//! applies them one at a time; see `assembly::options`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::{Gateway, Processor, RouterHandle};
use crate::assembly::RouteTable;
use crate::observability::LogSink;

/// Common surface of every option enum.
pub trait ComponentOption: fmt::Debug + Send {
    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;
}

/// Gateway options. IRC and Telegram fields share one enum; a gateway rejects
/// the fields of kinds it does not implement.
#[derive(Debug, Clone)]
pub enum GatewayOption {
    Identifier(String),
    // IRC
    Nick(String),
    Ident(String),
    Name(String),
    Version(String),
    Server {
        address: String,
        port: u16,
        use_tls: bool,
    },
    QuitMessage(String),
    // Telegram
    ApiToken(String),
    UpdatesLimit(u32),
    UpdatesTimeout(u32),
    UpdatesAllowed(Vec<String>),
    Logging(LogSink),
}

impl ComponentOption for GatewayOption {
    fn name(&self) -> &'static str {
        match self {
            GatewayOption::Identifier(_) => "identifier",
            GatewayOption::Nick(_) => "nick",
            GatewayOption::Ident(_) => "ident",
            GatewayOption::Name(_) => "name",
            GatewayOption::Version(_) => "version",
            GatewayOption::Server { .. } => "server",
            GatewayOption::QuitMessage(_) => "quit_message",
            GatewayOption::ApiToken(_) => "api_token",
            GatewayOption::UpdatesLimit(_) => "updates_limit",
            GatewayOption::UpdatesTimeout(_) => "updates_timeout",
            GatewayOption::UpdatesAllowed(_) => "updates_allowed",
            GatewayOption::Logging(_) => "logging",
        }
    }
}

/// Processor options.
#[derive(Debug, Clone)]
pub enum ProcessorOption {
    Identifier(String),
    /// Processor-specific configuration file.
    Config(PathBuf),
    /// Handle for enqueueing events back onto the router.
    Router(RouterHandle),
    Logging(LogSink),
}

impl ComponentOption for ProcessorOption {
    fn name(&self) -> &'static str {
        match self {
            ProcessorOption::Identifier(_) => "identifier",
            ProcessorOption::Config(_) => "config",
            ProcessorOption::Router(_) => "router",
            ProcessorOption::Logging(_) => "logging",
        }
    }
}

/// Router options. The wiring options are applied in a second pass, after
/// every gateway and processor exists.
#[derive(Debug, Clone)]
pub enum RouterOption {
    Gateways(Vec<Arc<dyn Gateway>>),
    Processors(Vec<Arc<dyn Processor>>),
    Routes(RouteTable),
    Logging(LogSink),
}

impl ComponentOption for RouterOption {
    fn name(&self) -> &'static str {
        match self {
            RouterOption::Gateways(_) => "gateways",
            RouterOption::Processors(_) => "processors",
            RouterOption::Routes(_) => "routes",
            RouterOption::Logging(_) => "logging",
        }
    }
}
