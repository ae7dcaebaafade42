/// Raw column type string to canonical [`mapper::TypeDescriptor`].
pub mod mapper;
/// Validation-constraint descriptors derived from raw column types.
pub mod validation;

pub use mapper::{map_column_type, IntKind, TypeDescriptor};
pub use validation::{validation_rules, Validation};
