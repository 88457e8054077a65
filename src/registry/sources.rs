//! Module backends.

use std::fmt;

use super::{ModuleError, ModuleExports};
use crate::types::ModulePath;

/// Where modules come from.
pub trait ModuleSource: Send + Sync + fmt::Debug {
    /// Open the module at `path` and return its exports.
    fn open(&self, path: &ModulePath) -> Result<ModuleExports, ModuleError>;
}

/// A module compiled into the binary.
#[derive(Debug)]
pub struct ModuleDescriptor {
    pub path: &'static str,
    pub exports: fn() -> ModuleExports,
}

impl ModuleDescriptor {
    pub const fn new(path: &'static str, exports: fn() -> ModuleExports) -> Self {
        Self { path, exports }
    }
}

inventory::collect!(ModuleDescriptor);

/// Resolves paths against every `ModuleDescriptor` submitted to `inventory`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticModules;

impl StaticModules {
    /// Paths of all statically registered modules, sorted.
    pub fn available() -> Vec<&'static str> {
        let mut paths: Vec<&'static str> = inventory::iter::<ModuleDescriptor>
            .into_iter()
            .map(|d| d.path)
            .collect();
        paths.sort_unstable();
        paths
    }
}

impl ModuleSource for StaticModules {
    fn open(&self, path: &ModulePath) -> Result<ModuleExports, ModuleError> {
        inventory::iter::<ModuleDescriptor>
            .into_iter()
            .find(|d| d.path == path.as_str())
            .map(|d| (d.exports)())
            .ok_or(ModuleError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let available = StaticModules::available();
        assert!(available.contains(&crate::builtin::ROUTER_MODULE));
        assert!(available.contains(&crate::builtin::CONSOLE_GATEWAY_MODULE));
        assert!(available.contains(&crate::builtin::LOG_PROCESSOR_MODULE));
    }

    #[test]
    fn test_unknown_static_module() {
        let path = ModulePath::from_string("plugins/nothing.mod").unwrap();
        assert!(matches!(
            StaticModules.open(&path),
            Err(ModuleError::NotFound)
        ));
    }
}
