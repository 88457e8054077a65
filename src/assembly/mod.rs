//! Assembly: builds, validates, wires and starts every component.
//!
//! ```text
//!   Config ─▶ build_router ─▶ build_gateway* ─▶ build_processor*
//!                                                    │
//!          run ◀─ broadcast ◀─ configure_router ◀─ validate ◀─ build_routes
//! ```
//!
//! Assembly runs on a single task. The first error aborts it; nothing built so
//! far is torn down.

pub mod factory;
pub mod lifecycle;
pub mod options;
pub mod routes;

pub use factory::{build_gateway, build_processor, build_router, configure_router};
pub use lifecycle::broadcast;
pub use options::apply_options;
pub use routes::{build_routes, RouteTable};

use std::sync::Arc;

use crate::component::{Gateway, Processor, Router};
use crate::observability::LogSink;
use crate::registry::ModuleRegistry;
use crate::types::{Config, Error, Result};
use crate::validation::validate;

/// State shared by every assembly step: the module cache and the log sink
/// handed to each component.
#[derive(Debug)]
pub struct AssemblyContext {
    pub registry: ModuleRegistry,
    pub log: LogSink,
}

impl AssemblyContext {
    pub fn new(registry: ModuleRegistry, log: LogSink) -> Self {
        Self { registry, log }
    }
}

/// Fully wired components, ready to start.
#[derive(Debug)]
pub struct Assembly {
    router: Box<dyn Router>,
    gateways: Vec<Arc<dyn Gateway>>,
    processors: Vec<Arc<dyn Processor>>,
    routes: RouteTable,
}

impl Assembly {
    /// Build every component named in `config` and wire them into the router.
    ///
    /// The router is built first so processors can hold its handle; gateways
    /// and processors follow in configuration order.
    pub fn assemble(ctx: &mut AssemblyContext, config: &Config) -> Result<Self> {
        let mut router = build_router(ctx, &config.router)?;
        let handle = router.handle();

        let gateways = config
            .gateways
            .iter()
            .map(|c| build_gateway(ctx, c))
            .collect::<Result<Vec<_>>>()?;

        let processors = config
            .processors
            .iter()
            .map(|c| build_processor(ctx, c, &handle))
            .collect::<Result<Vec<_>>>()?;

        let routes = build_routes(&config.routes);
        validate(&gateways, &processors, &routes)?;
        configure_router(router.as_mut(), &gateways, &processors, routes.clone())?;

        tracing::info!(
            gateways = gateways.len(),
            processors = processors.len(),
            routes = routes.len(),
            modules = ctx.registry.len(),
            "Assembled components"
        );

        Ok(Self {
            router,
            gateways,
            processors,
            routes,
        })
    }

    pub fn gateways(&self) -> &[Arc<dyn Gateway>] {
        &self.gateways
    }

    pub fn processors(&self) -> &[Arc<dyn Processor>] {
        &self.processors
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Broadcast startup to every component, then hand control to the router.
    ///
    /// Returns when the router's run loop returns.
    pub async fn start(self) -> Result<()> {
        broadcast(&self.gateways, &self.processors).await?;

        tracing::info!("Starting router");
        self.router.run().await.map_err(Error::Router)
    }
}

// =============================================================================
// Tests
// =============================================================================
