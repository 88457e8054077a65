//! Route table construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::RouteConfig;

/// Source identifier → ordered destination identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: BTreeMap<String, Vec<String>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `destinations` to the entry for `source`, creating it if needed.
    /// Order and duplicates are preserved.
    pub fn merge(&mut self, source: &str, destinations: &[String]) {
        self.routes
            .entry(source.to_string())
            .or_default()
            .extend_from_slice(destinations);
    }

    pub fn destinations(&self, source: &str) -> Option<&[String]> {
        self.routes.get(source).map(Vec::as_slice)
    }

    /// Iterate over `(source, destinations)` in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.routes
            .iter()
            .map(|(source, dests)| (source.as_str(), dests.as_slice()))
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Number of distinct sources.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Fold route entries into a table, merging entries that share a source.
///
/// Never fails: an empty input gives an empty table, and emptiness is left for
/// validation to reject.
pub fn build_routes(configs: &[RouteConfig]) -> RouteTable {
    let mut table = RouteTable::new();
    for config in configs {
        table.merge(&config.source, &config.destinations);
    }
    table
}
