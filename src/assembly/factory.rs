//! Component factories.
//!
//! Each factory pulls the module from the registry, instantiates the kind it
//! needs and applies the options produced for it. Any failure is fatal to the
//! whole assembly.

use std::sync::Arc;

use super::options::{
    apply_options, gateway_options, processor_options, router_options, router_wiring_options,
};
use super::{AssemblyContext, RouteTable};
use crate::component::{Gateway, Processor, Router, RouterHandle, ROUTER_ID};
use crate::types::{Error, GatewayConfig, ProcessorConfig, Result, RouterConfig};

/// Build the router. Called before any other component so processors can be
/// handed its [`RouterHandle`].
pub fn build_router(
    ctx: &mut AssemblyContext,
    config: &RouterConfig,
) -> Result<Box<dyn Router>> {
    let module = ctx.registry.load(&config.module)?;
    let construct = module.router()?;

    let mut router = construct().map_err(|e| Error::component_construct(ROUTER_ID, e))?;
    apply_options(router.as_mut(), ROUTER_ID, router_options(&ctx.log))?;

    tracing::debug!(module = %module.path(), "Built router");
    Ok(router)
}

pub fn build_gateway(
    ctx: &mut AssemblyContext,
    config: &GatewayConfig,
) -> Result<Arc<dyn Gateway>> {
    let identifier = config.identifier();
    let module = ctx.registry.load(config.module())?;
    let construct = module.gateway()?;

    let mut gateway = construct().map_err(|e| Error::component_construct(identifier, e))?;
    apply_options(gateway.as_mut(), identifier, gateway_options(config, &ctx.log))?;

    tracing::debug!(
        gateway = identifier,
        kind = config.kind(),
        module = %module.path(),
        "Built gateway"
    );
    Ok(Arc::from(gateway))
}

pub fn build_processor(
    ctx: &mut AssemblyContext,
    config: &ProcessorConfig,
    router: &RouterHandle,
) -> Result<Arc<dyn Processor>> {
    let identifier = config.identifier.as_str();
    let module = ctx.registry.load(&config.module)?;
    let construct = module.processor()?;

    let mut processor = construct().map_err(|e| Error::component_construct(identifier, e))?;
    apply_options(
        processor.as_mut(),
        identifier,
        processor_options(config, router, &ctx.log),
    )?;

    tracing::debug!(processor = identifier, module = %module.path(), "Built processor");
    Ok(Arc::from(processor))
}

/// Second router pass: install the full gateway list, processor list and
/// route table.
pub fn configure_router(
    router: &mut dyn Router,
    gateways: &[Arc<dyn Gateway>],
    processors: &[Arc<dyn Processor>],
    routes: RouteTable,
) -> Result<()> {
    apply_options(
        router,
        ROUTER_ID,
        router_wiring_options(gateways, processors, routes),
    )
}

// =============================================================================
// Tests
// =============================================================================
