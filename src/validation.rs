//! Wiring validation, run once after every component has been built and
//! before the router is configured.

use std::collections::HashSet;
use std::sync::Arc;

use crate::assembly::RouteTable;
use crate::component::{Gateway, Processor};
use crate::types::{Result, Violation};

/// Reject wiring the router cannot run with.
///
/// Checks, in order: at least one gateway, at least one processor, at least
/// one route, and a non-empty destination list for every route. Destinations
/// that name no built processor are only reported, see
/// [`unknown_destinations`].
pub fn validate(
    gateways: &[Arc<dyn Gateway>],
    processors: &[Arc<dyn Processor>],
    routes: &RouteTable,
) -> Result<()> {
    if gateways.is_empty() {
        return Err(Violation::NoGateways.into());
    }
    if processors.is_empty() {
        return Err(Violation::NoProcessors.into());
    }
    if routes.is_empty() {
        return Err(Violation::NoRoutes.into());
    }
    if let Some((source, _)) = routes.iter().find(|(_, dests)| dests.is_empty()) {
        return Err(Violation::EmptyDestinations {
            route: source.to_string(),
        }
        .into());
    }

    for (source, destination) in unknown_destinations(processors, routes) {
        tracing::warn!(
            source,
            destination,
            "Route destination does not name any configured processor"
        );
    }
    Ok(())
}

/// `(source, destination)` pairs whose destination is not a built processor.
pub fn unknown_destinations<'a>(
    processors: &[Arc<dyn Processor>],
    routes: &'a RouteTable,
) -> Vec<(&'a str, &'a str)> {
    let known: HashSet<&str> = processors.iter().map(|p| p.identifier()).collect();
    routes
        .iter()
        .flat_map(|(source, dests)| dests.iter().map(move |d| (source, d.as_str())))
        .filter(|(_, dest)| !known.contains(dest))
        .collect()
}
