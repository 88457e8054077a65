//! Module registry: loads component modules by path, at most once each.
//!
//! A module is a bundle of component constructors ("exports") identified by a
//! path taken from the configuration. Where modules come from is decided by a
//! [`ModuleSource`] backend; the default backend, [`StaticModules`], resolves
//! paths against modules compiled into the binary and registered with
//! `inventory::submit!`.
//!
//! ```ignore
//! inventory::submit! {
//!     ModuleDescriptor::new("builtin/router", router_module)
//! }
//! ```

mod module;
mod sources;

pub use module::{
    GatewayConstructor, Module, ModuleExports, ModuleHandle, ProcessorConstructor,
    RouterConstructor,
};
pub use sources::{ModuleDescriptor, ModuleSource, StaticModules};

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::types::{BoxError, Error, ModulePath, Result};

/// Why a module could not be loaded or used.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("module path cannot be empty")]
    EmptyPath,

    #[error("no module is registered under this path")]
    NotFound,

    #[error("module exports no component constructors")]
    NoExports,

    #[error("module does not export a {0} constructor")]
    MissingExport(&'static str),

    #[error("module failed to open: {0}")]
    Open(#[source] BoxError),
}

/// Process-wide cache of loaded modules, keyed by path.
///
/// Owned by the assembly context; assembly is single-threaded so the cache
/// needs no locking.
#[derive(Debug)]
pub struct ModuleRegistry {
    source: Box<dyn ModuleSource>,
    modules: HashMap<ModulePath, ModuleHandle>,
}

impl ModuleRegistry {
    /// Registry backed by the statically registered modules.
    pub fn new() -> Self {
        Self::with_source(StaticModules)
    }

    pub fn with_source(source: impl ModuleSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            modules: HashMap::new(),
        }
    }

    /// Return the module at `path`, opening it on first use.
    ///
    /// A cached module is returned as-is; the backend is not consulted again.
    pub fn load(&mut self, path: &str) -> Result<ModuleHandle> {
        let key = ModulePath::from_string(path)
            .map_err(|_| Error::module_load(path, ModuleError::EmptyPath))?;

        if let Some(module) = self.modules.get(&key) {
            return Ok(Arc::clone(module));
        }

        let exports = self
            .source
            .open(&key)
            .map_err(|e| Error::module_load(path, e))?;
        if exports.is_empty() {
            return Err(Error::module_load(path, ModuleError::NoExports));
        }

        let module = Arc::new(Module::new(key.clone(), exports));
        tracing::debug!(path = %key, exports = ?module, "Loaded module");
        self.modules.insert(key, Arc::clone(&module));
        Ok(module)
    }

    /// Whether `path` has already been loaded.
    pub fn contains(&self, path: &str) -> bool {
        ModulePath::from_string(path)
            .map(|key| self.modules.contains_key(&key))
            .unwrap_or(false)
    }

    /// Paths of all loaded modules, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.modules.keys().map(|p| p.to_string()).collect();
        paths.sort();
        paths
    }

    /// Number of loaded modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
