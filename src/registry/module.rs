//! Loaded modules and their exports.

use std::fmt;
use std::sync::Arc;

use super::ModuleError;
use crate::component::{Gateway, Processor, Router};
use crate::types::{BoxError, Error, ModulePath, Result};

/// Builds a gateway with default settings.
pub type GatewayConstructor =
    Arc<dyn Fn() -> std::result::Result<Box<dyn Gateway>, BoxError> + Send + Sync>;

/// Builds a processor with default settings.
pub type ProcessorConstructor =
    Arc<dyn Fn() -> std::result::Result<Box<dyn Processor>, BoxError> + Send + Sync>;

/// Builds a router with default settings.
pub type RouterConstructor =
    Arc<dyn Fn() -> std::result::Result<Box<dyn Router>, BoxError> + Send + Sync>;

/// Shared, non-owning reference to a module cached by the registry.
pub type ModuleHandle = Arc<Module>;

/// Constructors a module provides, at most one per component kind.
#[derive(Clone, Default)]
pub struct ModuleExports {
    gateway: Option<GatewayConstructor>,
    processor: Option<ProcessorConstructor>,
    router: Option<RouterConstructor>,
}

impl ModuleExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gateway<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> std::result::Result<Box<dyn Gateway>, BoxError> + Send + Sync + 'static,
    {
        self.gateway = Some(Arc::new(constructor));
        self
    }

    pub fn with_processor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> std::result::Result<Box<dyn Processor>, BoxError> + Send + Sync + 'static,
    {
        self.processor = Some(Arc::new(constructor));
        self
    }

    pub fn with_router<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> std::result::Result<Box<dyn Router>, BoxError> + Send + Sync + 'static,
    {
        self.router = Some(Arc::new(constructor));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.gateway.is_none() && self.processor.is_none() && self.router.is_none()
    }
}

impl fmt::Debug for ModuleExports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleExports")
            .field("gateway", &self.gateway.is_some())
            .field("processor", &self.processor.is_some())
            .field("router", &self.router.is_some())
            .finish()
    }
}

/// A loaded module.
#[derive(Debug)]
pub struct Module {
    path: ModulePath,
    exports: ModuleExports,
}

impl Module {
    pub(crate) fn new(path: ModulePath, exports: ModuleExports) -> Self {
        Self { path, exports }
    }

    pub fn path(&self) -> &ModulePath {
        &self.path
    }

    pub fn gateway(&self) -> Result<&GatewayConstructor> {
        self.exports
            .gateway
            .as_ref()
            .ok_or_else(|| self.missing("gateway"))
    }

    pub fn processor(&self) -> Result<&ProcessorConstructor> {
        self.exports
            .processor
            .as_ref()
            .ok_or_else(|| self.missing("processor"))
    }

    pub fn router(&self) -> Result<&RouterConstructor> {
        self.exports
            .router
            .as_ref()
            .ok_or_else(|| self.missing("router"))
    }

    fn missing(&self, kind: &'static str) -> Error {
        Error::module_load(self.path.as_str(), ModuleError::MissingExport(kind))
    }
}
