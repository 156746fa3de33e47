//! Structural transformation engine for hypermedia API documents
//!
//! This crate turns the type-tagged tree produced by an object serializer
//! into the shape a hypermedia document expects. Internal markers are pruned,
//! scalar wrappers are unwrapped, trivial wrappers are flattened, per-type
//! rename and hide rules are applied, field names are snake_cased and each
//! typed object is promoted into a container named after its type.
//!
//! The transformation is one-way: [`Transformer::reverse`] always fails.

pub mod codec;
pub mod document;
pub mod error;
pub mod graph;
pub mod ir;
pub mod mapping;
pub mod naming;
pub mod passes;
pub mod pipeline;
pub mod validation;

// Re-export main types
pub use document::{Document, Links};
pub use error::{Error, Result};
pub use graph::{Graph, NodeId};
pub use ir::{Composite, Fields, Node, Scalar, TypeId};
pub use mapping::{Mapping, MappingLookup, MappingRegistry};
pub use pipeline::{ContainerKey, Transformer, TransformerBuilder, transform};
pub use validation::Limits;
