//! Reverse-engineer a relational database schema into Sequelize model sources.
#![warn(missing_docs)]

/// Per-dialect source compilation: entity IR construction and text rendering.
pub mod generator;
/// Schema metadata model and identifier utilities.
pub mod model;
/// File output for generated model sources.
pub mod output;
/// Relationship inference from foreign-key metadata.
pub mod relate;
/// Raw column type strings to canonical type descriptors and validations.
pub mod typemap;
