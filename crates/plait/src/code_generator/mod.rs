//! Code generation for the single-file bundle
//!
//! The bundle is plain Python: a prelude installs an import hook backed by an
//! in-memory table, every embedded module is registered into that table as a
//! compressed payload, and the entry script runs inside the prelude's scope.

pub mod assembler;
pub mod encoder;

pub use assembler::{AssembleOptions, DEFAULT_SHEBANG, assemble};
pub use encoder::{decode, encode};
