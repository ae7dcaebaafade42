/// Entity resolution: options, engines, and the table-to-IR compiler.
pub mod entity;
/// Aggregate index artifact and cross-entity association text.
pub mod index_file;
/// Intermediate representation consumed by the renderers.
pub mod ir;
/// Per-dialect renderers over the IR.
pub mod render;
/// Typed-dialect attribute and mixin rendering.
pub mod typescript;

pub use entity::{build_entity, generate_text, Dialect, Engine, GenerateError, GeneratorOptions};
pub use index_file::{render_associations, render_index_file};
pub use render::render_entity;
