/// Identifier casing, qualified-name handling, and inflection.
pub mod names;
/// Introspected schema metadata and inferred relationship records.
pub mod schema;
