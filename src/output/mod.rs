/// Persists rendered model sources and the aggregate index file.
pub mod writer;

pub use writer::{write_output, WriteError};
