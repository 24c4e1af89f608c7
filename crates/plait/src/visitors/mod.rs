//! AST visitor implementations for plait
//!
//! This module contains visitor patterns for traversing Python AST nodes,
//! used to discover every import statement in a module.

mod import_discovery;

pub use import_discovery::{ImportDiscoveryVisitor, extract_imports};
