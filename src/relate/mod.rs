/// Builds [`crate::model::schema::Relationship`] records from foreign keys.
pub mod relation_builder;

pub use relation_builder::{infer_relations, JunctionWarning};
