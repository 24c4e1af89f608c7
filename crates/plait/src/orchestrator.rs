use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    code_generator::{AssembleOptions, assemble},
    config::Config,
    error::BundleError,
    graph_builder::DependencyGraphBuilder,
    python_probe::{SysPathProbe, probe_for},
    resolver::{ModuleResolver, build_search_roots, read_source},
};

/// Runs one bundling request end to end: probe the interpreter, build the
/// search roots, collect the module closure and assemble the script.
#[derive(Debug)]
pub struct BundleOrchestrator {
    config: Config,
    probe: Box<dyn SysPathProbe>,
}

impl BundleOrchestrator {
    /// The probe is chosen from `config.python`.
    pub fn new(config: Config) -> Self {
        let probe = probe_for(config.python.as_deref());
        Self { config, probe }
    }

    /// Replace the interpreter probe.
    pub fn with_probe(mut self, probe: Box<dyn SysPathProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Bundle `entry_path` into a single script and return its text.
    pub fn bundle(&self, entry_path: &Path) -> Result<String> {
        if !entry_path.is_file() {
            return Err(BundleError::EntryNotFound(entry_path.to_path_buf()).into());
        }
        info!("Bundling {}", entry_path.display());
        let entry_source = read_source(entry_path)?;

        let interpreter_paths = self.probe.probe()?;
        debug!("Probe returned {} paths", interpreter_paths.len());
        let search_roots = build_search_roots(entry_path, &self.config.src, interpreter_paths);
        let resolver = ModuleResolver::new(search_roots);

        let registry = DependencyGraphBuilder::new(&resolver, self.config.resolution)
            .build_closure(entry_path, &entry_source, &self.config.extra_modules)
            .with_context(|| format!("Failed to collect modules for {}", entry_path.display()))?;
        let modules = registry.into_modules();

        let options = AssembleOptions {
            copy_shebang: self.config.copy_shebang,
            default_shebang: self.config.default_shebang.clone(),
        };
        let bundle = assemble(&entry_source, &modules, &options)?;

        info!(
            "Embedded {} modules into {} bytes",
            modules.len(),
            bundle.len()
        );
        Ok(bundle)
    }
}

/// Bundle `entry_path` with `config`, probing `config.python` if set.
pub fn bundle_script(entry_path: &Path, config: &Config) -> Result<String> {
    BundleOrchestrator::new(config.clone()).bundle(entry_path)
}
