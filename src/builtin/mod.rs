//! Modules compiled into the host binary.
//!
//! | Path                      | Exports   |
//! |---------------------------|-----------|
//! | `builtin/console-gateway` | gateway   |
//! | `builtin/log-processor`   | processor |
//! | `builtin/router`          | router    |
//!
//! None of them perform network I/O. They are enough to run the host end to
//! end from a terminal.

mod console;
mod log_processor;
mod router;

pub use console::ConsoleGateway;
pub use log_processor::LogProcessor;
pub use router::BasicRouter;

use crate::component::{Gateway, Processor, Router};
use crate::registry::{ModuleDescriptor, ModuleExports};

pub const CONSOLE_GATEWAY_MODULE: &str = "builtin/console-gateway";
pub const LOG_PROCESSOR_MODULE: &str = "builtin/log-processor";
pub const ROUTER_MODULE: &str = "builtin/router";

fn console_gateway_module() -> ModuleExports {
    ModuleExports::new().with_gateway(|| Ok(Box::new(ConsoleGateway::new()) as Box<dyn Gateway>))
}

fn log_processor_module() -> ModuleExports {
    ModuleExports::new()
        .with_processor(|| Ok(Box::new(LogProcessor::new()) as Box<dyn Processor>))
}

fn router_module() -> ModuleExports {
    ModuleExports::new().with_router(|| Ok(Box::new(BasicRouter::new()) as Box<dyn Router>))
}

inventory::submit! {
    ModuleDescriptor::new(CONSOLE_GATEWAY_MODULE, console_gateway_module)
}

inventory::submit! {
    ModuleDescriptor::new(LOG_PROCESSOR_MODULE, log_processor_module)
}

inventory::submit! {
    ModuleDescriptor::new(ROUTER_MODULE, router_module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModuleRegistry;

    #[test]
    fn test_each_builtin_exports_its_kind() {
        let mut registry = ModuleRegistry::new();

        let console = registry.load(CONSOLE_GATEWAY_MODULE).unwrap();
        assert!(console.gateway().is_ok());
        assert!(console.processor().is_err());

        let processor = registry.load(LOG_PROCESSOR_MODULE).unwrap();
        assert!(processor.processor().is_ok());
        assert!(processor.router().is_err());

        let router = registry.load(ROUTER_MODULE).unwrap();
        assert!(router.router().is_ok());
        assert_eq!(registry.len(), 3);
    }
}
