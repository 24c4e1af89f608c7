//! Bundle a Python entry script and its first-party imports into one
//! self-contained script.

pub mod code_generator;
pub mod config;
pub mod dirs;
pub mod error;
pub mod graph_builder;
pub mod module_registry;
pub mod orchestrator;
pub mod python_probe;
pub mod resolver;
pub mod stdlib_detection;
pub mod types;
pub mod visitors;

pub use orchestrator::{BundleOrchestrator, bundle_script};
