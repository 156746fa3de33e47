use crate::errors::{CliError, Result};
use hypershape_core::{Mapping, MappingRegistry};
use std::fmt::Write;
use std::path::Path;
use tracing::instrument;

#[instrument(skip_all, fields(mappings = %path.display()))]
pub fn execute(path: &Path, resource: Option<&str>) -> Result<String> {
    let registry = MappingRegistry::load(path)?;
    match resource {
        Some(resource) => describe(&registry, resource),
        None => Ok(list(&registry)),
    }
}

/// One `alias<TAB>class` line per mapped type
pub fn list(registry: &MappingRegistry) -> String {
    let mut out = String::new();
    for mapping in registry.iter() {
        let _ = writeln!(out, "{}\t{}", mapping.alias(), mapping.type_id());
    }
    out
}

/// The mapping serving `resource`, as JSON
pub fn describe(registry: &MappingRegistry, resource: &str) -> Result<String> {
    let mapping = registry
        .find_by_resource(resource)
        .ok_or_else(|| CliError::unknown_resource(resource))?;
    tracing::debug!(resource, class = %mapping.type_id(), "Resource resolved");
    encode(mapping)
}

fn encode(mapping: &Mapping) -> Result<String> {
    serde_json::to_string_pretty(mapping)
        .map_err(|e| hypershape_core::Error::serialization(e.to_string()).into())
}
