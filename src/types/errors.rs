//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. Every assembly error is fatal: nothing in
//! the host retries, the caller logs the error and exits.

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::ModuleError;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by component code (constructors, options, run loops).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error enum for the assembly host.
#[derive(Error, Debug)]
pub enum Error {
    /// A module could not be loaded, or lacks the export a factory needs.
    #[error("failed to load module \"{path}\": {source}")]
    ModuleLoad {
        path: String,
        #[source]
        source: ModuleError,
    },

    /// An option was rejected by the component it was applied to.
    #[error("failed to apply option `{option}` to component \"{component}\": {source}")]
    ComponentConfig {
        component: String,
        option: &'static str,
        #[source]
        source: BoxError,
    },

    /// The module constructor itself failed.
    #[error("failed to construct component \"{component}\": {source}")]
    ComponentConstruct {
        component: String,
        #[source]
        source: BoxError,
    },

    /// Post-construction wiring invariant violated.
    #[error("cannot start the router: {0}")]
    FatalAssembly(#[from] Violation),

    /// A component dropped its core event channel before startup completed.
    #[error("component \"{component}\" closed its core event channel before startup completed")]
    Lifecycle { component: String },

    /// The router run loop returned an error.
    #[error("router stopped with an error: {0}")]
    Router(#[source] BoxError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// Convenience constructors
impl Error {
    pub fn module_load(path: impl Into<String>, source: ModuleError) -> Self {
        Self::ModuleLoad {
            path: path.into(),
            source,
        }
    }

    pub fn component_config(
        component: impl Into<String>,
        option: &'static str,
        source: BoxError,
    ) -> Self {
        Self::ComponentConfig {
            component: component.into(),
            option,
            source,
        }
    }

    pub fn component_construct(component: impl Into<String>, source: BoxError) -> Self {
        Self::ComponentConstruct {
            component: component.into(),
            source,
        }
    }

    pub fn lifecycle(component: impl Into<String>) -> Self {
        Self::Lifecycle {
            component: component.into(),
        }
    }

    /// Short human-readable line logged after the error itself on exit.
    pub fn summary(&self) -> &'static str {
        match self {
            Error::ModuleLoad { .. } => "error occurred while loading a component module",
            Error::ComponentConfig { .. } => "error occurred while configuring a component",
            Error::ComponentConstruct { .. } => "error occurred while creating a component",
            Error::FatalAssembly(_) => "error occurred while wiring components into the router",
            Error::Lifecycle { .. } => "error occurred while notifying components of startup",
            Error::Router(_) => "error occurred while running the router",
            Error::Config(_) => "error occurred while loading the configuration",
        }
    }
}

/// Wiring invariant violated after all components were constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("cannot create a router without any gateways")]
    NoGateways,

    #[error("cannot create a router without any processors")]
    NoProcessors,

    #[error("cannot create a router without any routes")]
    NoRoutes,

    #[error("route for source \"{route}\" has no processor destinations")]
    EmptyDestinations { route: String },
}

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }
}
