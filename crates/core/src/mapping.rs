//! Per-type mapping rules and the read-only lookup the pipeline consults
//!
//! A mapping file is a YAML or JSON list of entries:
//!
//! ```yaml
//! - class: App\Model\Post
//!   alias: message
//!   hide_properties: [internalId]
//!   aliased_properties:
//!     title: headline
//! ```

use crate::error::{Error, Result};
use crate::ir::TypeId;
use crate::naming::snake_to_camel;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Rules for one mapped type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(rename = "class")]
    type_id: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
    #[serde(default, rename = "hide_properties")]
    hidden_fields: BTreeSet<String>,
    #[serde(default, rename = "aliased_properties")]
    rename_table: IndexMap<String, String>,
}

impl Mapping {
    /// A mapping with no rules for `type_id`
    #[must_use]
    pub fn new(type_id: impl Into<TypeId>) -> Self {
        Self {
            type_id: type_id.into(),
            alias: None,
            hidden_fields: BTreeSet::new(),
            rename_table: IndexMap::new(),
        }
    }

    /// Set the public name of the type
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Hide a field on instances of this type
    #[must_use]
    pub fn hide(mut self, field: impl Into<String>) -> Self {
        self.hidden_fields.insert(field.into());
        self
    }

    /// Rename a field on instances of this type
    #[must_use]
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename_table.insert(from.into(), to.into());
        self
    }

    /// The mapped type
    #[must_use]
    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    /// The public name of the type, defaulting to its snake_case short name
    #[must_use]
    pub fn alias(&self) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| self.type_id.container_key())
    }

    /// Fields hidden on this type, by their original names
    #[must_use]
    pub fn hidden_fields(&self) -> &BTreeSet<String> {
        &self.hidden_fields
    }

    /// Field renames on this type
    #[must_use]
    pub fn rename_table(&self) -> &IndexMap<String, String> {
        &self.rename_table
    }

    /// Hidden fields as they are named once the rename table has been applied
    #[must_use]
    pub fn hidden_after_rename(&self) -> HashSet<String> {
        self.hidden_fields
            .iter()
            .map(|field| {
                self.rename_table
                    .get(field)
                    .cloned()
                    .unwrap_or_else(|| field.clone())
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.type_id.as_str().is_empty() {
            return Err(Error::configuration("mapping class cannot be empty"));
        }

        let mut targets = HashSet::new();
        for (from, to) in &self.rename_table {
            if to.is_empty() {
                return Err(Error::configuration(format!(
                    "{}: field '{from}' cannot be renamed to an empty name",
                    self.type_id
                )));
            }
            if !targets.insert(to) {
                return Err(Error::configuration(format!(
                    "{}: more than one field is renamed to '{to}'",
                    self.type_id
                )));
            }
        }
        Ok(())
    }
}

/// Read-only rule lookup keyed by type identifier
///
/// Implementations are populated once and never mutated while a pipeline
/// runs, so concurrent runs may share one lookup without locking.
pub trait MappingLookup: Send + Sync {
    /// The rules for `type_id`, if it is mapped
    fn lookup(&self, type_id: &TypeId) -> Option<&Mapping>;
}

impl<T: MappingLookup + ?Sized> MappingLookup for &T {
    fn lookup(&self, type_id: &TypeId) -> Option<&Mapping> {
        (**self).lookup(type_id)
    }
}

impl<T: MappingLookup + ?Sized> MappingLookup for Arc<T> {
    fn lookup(&self, type_id: &TypeId) -> Option<&Mapping> {
        (**self).lookup(type_id)
    }
}

/// Immutable set of mappings indexed by type
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    entries: IndexMap<TypeId, Mapping>,
}

impl MappingRegistry {
    /// Build a registry from mapping entries
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for duplicate classes, empty class
    /// names, or rename tables that would produce clashing names.
    pub fn new(mappings: impl IntoIterator<Item = Mapping>) -> Result<Self> {
        let mut entries = IndexMap::new();
        for mapping in mappings {
            mapping.validate()?;
            if entries.contains_key(mapping.type_id()) {
                return Err(Error::configuration(format!(
                    "duplicate mapping for class '{}'",
                    mapping.type_id()
                )));
            }
            entries.insert(mapping.type_id().clone(), mapping);
        }
        tracing::debug!(count = entries.len(), "Mapping registry built");
        Ok(Self { entries })
    }

    /// Parse a YAML mapping list
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for invalid YAML, otherwise the errors
    /// of [`MappingRegistry::new`].
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let mappings: Vec<Mapping> = serde_yaml::from_str(input)
            .map_err(|e| Error::serialization(format!("invalid mapping YAML: {e}")))?;
        Self::new(mappings)
    }

    /// Parse a JSON mapping list
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for invalid JSON, otherwise the errors
    /// of [`MappingRegistry::new`].
    pub fn from_json_str(input: &str) -> Result<Self> {
        let mappings: Vec<Mapping> = serde_json::from_str(input)
            .map_err(|e| Error::serialization(format!("invalid mapping JSON: {e}")))?;
        Self::new(mappings)
    }

    /// Load a mapping file, choosing the format by extension
    ///
    /// `.json` files are read as JSON, everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the parse
    /// errors of the chosen format.
    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        tracing::debug!(path = %path.display(), json = is_json, "Loading mappings");
        if is_json {
            Self::from_json_str(&input)
        } else {
            Self::from_yaml_str(&input)
        }
    }

    /// Find the mapping serving a REST resource name
    ///
    /// Matches the alias first, then the short class name of the CamelCased
    /// resource (`blog_post` finds `App\Model\BlogPost`).
    #[must_use]
    pub fn find_by_resource(&self, resource: &str) -> Option<&Mapping> {
        let class_name = snake_to_camel(resource);
        self.entries
            .values()
            .find(|m| m.alias() == resource)
            .or_else(|| {
                self.entries
                    .values()
                    .find(|m| m.type_id().short_name() == class_name)
            })
    }

    /// Mappings in the order they were registered
    pub fn iter(&self) -> impl Iterator<Item = &Mapping> {
        self.entries.values()
    }

    /// Number of mapped types
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is mapped
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MappingLookup for MappingRegistry {
    fn lookup(&self, type_id: &TypeId) -> Option<&Mapping> {
        self.entries.get(type_id)
    }
}
