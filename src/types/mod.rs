//! Core types for the assembly host.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed module paths
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for gateways, processors, router and routes

mod config;
mod errors;
mod ids;

pub use config::{
    Config, ConsoleGatewayConfig, GatewayConfig, IrcGatewayConfig, ProcessorConfig, RouteConfig,
    RouterConfig, TelegramGatewayConfig,
};
pub use errors::{BoxError, ConfigError, Error, Result, Violation};
pub use ids::ModulePath;
