//! Discovery of the module closure of an entry script.
//!
//! Traversal is depth first: a newly found module is inserted and its own
//! imports are processed before the next sibling import. An explicit stack
//! of pending matches replaces recursion, so import depth never grows the
//! call stack. The registry order is the discovery order.

use std::{collections::VecDeque, path::Path};

use anyhow::Result;
use log::{debug, trace};

use crate::{
    config::ResolutionMode,
    error::BundleError,
    module_registry::ModuleRegistry,
    resolver::{ModuleResolver, ResolvedModule},
    stdlib_detection::is_stdlib_module,
    types::{ImportReference, ModuleRecord},
    visitors::extract_imports,
};

/// Importer label used for modules forced in by name.
const EXTRA_MODULES_LABEL: &str = "<extra modules>";

#[derive(Debug)]
pub struct DependencyGraphBuilder<'a> {
    resolver: &'a ModuleResolver,
    resolution: ResolutionMode,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(resolver: &'a ModuleResolver, resolution: ResolutionMode) -> Self {
        Self {
            resolver,
            resolution,
        }
    }

    /// Collect every module reachable from the entry script, followed by
    /// every module reachable from `extra_modules`.
    ///
    /// The entry script itself is not part of the result.
    pub fn build_closure(
        &self,
        entry_path: &Path,
        entry_source: &str,
        extra_modules: &[String],
    ) -> Result<ModuleRegistry> {
        let mut registry = ModuleRegistry::new();

        let entry_label = entry_path.display().to_string();
        let entry_imports = extract_imports(entry_source, entry_path)?;
        let found = self.resolve_imports(None, &entry_label, &entry_imports, true)?;
        self.walk(&mut registry, found)?;

        // Forced modules are explicit requests, so the stdlib table does not
        // apply to them.
        for name in extra_modules {
            let reference = ImportReference::from_dotted(name);
            let found = self.resolve_imports(
                None,
                EXTRA_MODULES_LABEL,
                std::slice::from_ref(&reference),
                false,
            )?;
            self.walk(&mut registry, found)?;
        }

        debug!("Module closure has {} modules", registry.len());
        Ok(registry)
    }

    /// Insert `found` and everything reachable from it, depth first.
    ///
    /// Each stack entry holds the matches of one module that are still to
    /// be visited, in import order.
    fn walk(&self, registry: &mut ModuleRegistry, found: Vec<ResolvedModule>) -> Result<()> {
        let mut stack: Vec<VecDeque<ResolvedModule>> = vec![found.into()];

        while let Some(pending) = stack.last_mut() {
            let Some(next) = pending.pop_front() else {
                stack.pop();
                continue;
            };
            if registry.contains(&next.canonical_path) {
                continue;
            }

            let Some(index) = registry.insert(next.read()?) else {
                continue;
            };
            let Some(module) = registry.get_index(index) else {
                continue;
            };
            debug!("Discovered module #{index}: {}", module.canonical_path);

            let imports = extract_imports(&module.source, &module.absolute_path)?;
            let found =
                self.resolve_imports(Some(module), &module.canonical_path, &imports, true)?;
            stack.push(found.into());
        }

        Ok(())
    }

    fn resolve_imports(
        &self,
        importer: Option<&ModuleRecord>,
        importer_label: &str,
        references: &[ImportReference],
        apply_stdlib_filter: bool,
    ) -> Result<Vec<ResolvedModule>> {
        let mut found = Vec::new();

        for reference in references {
            if apply_stdlib_filter && is_stdlib_module(&reference.path) {
                trace!("Skipping standard library import '{}'", reference.path);
                continue;
            }

            let matches = self.resolver.resolve(importer, reference);
            if matches.is_empty() {
                match self.resolution {
                    ResolutionMode::Lenient => {
                        debug!("Leaving out unresolved import '{reference}' in {importer_label}");
                    }
                    ResolutionMode::Strict => {
                        return Err(BundleError::UnresolvedImport {
                            import: reference.to_string(),
                            importer: importer_label.to_owned(),
                        }
                        .into());
                    }
                }
            }
            found.extend(matches);
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn create_test_file(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    fn closure(
        root: &Path,
        entry: &str,
        extra_modules: &[&str],
        resolution: ResolutionMode,
    ) -> Result<Vec<String>> {
        let entry_path = root.join(entry);
        let entry_source = fs::read_to_string(&entry_path)?;
        let resolver = ModuleResolver::new(vec![root.to_path_buf()]);
        let extra: Vec<String> = extra_modules.iter().map(|s| (*s).to_owned()).collect();
        let registry = DependencyGraphBuilder::new(&resolver, resolution).build_closure(
            &entry_path,
            &entry_source,
            &extra,
        )?;
        Ok(registry.canonical_paths().map(str::to_owned).collect())
    }

    #[test]
    fn test_transitive_imports_in_discovery_order() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_test_file(&root.join("main.py"), "import alpha\nimport beta\n")?;
        create_test_file(&root.join("alpha.py"), "import gamma\n")?;
        create_test_file(&root.join("beta.py"), "import gamma\nimport json\n")?;
        create_test_file(&root.join("gamma.py"), "")?;

        assert_eq!(
            closure(root, "main.py", &[], ResolutionMode::Lenient)?,
            vec!["alpha", "gamma", "beta"]
        );
        Ok(())
    }

    #[test]
    fn test_nested_imports_come_before_next_sibling() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_test_file(&root.join("main.py"), "import a\nimport d\n")?;
        create_test_file(&root.join("a.py"), "import b\nimport d\n")?;
        create_test_file(&root.join("b.py"), "import c\n")?;
        create_test_file(&root.join("c.py"), "")?;
        create_test_file(&root.join("d.py"), "import c\n")?;

        assert_eq!(
            closure(root, "main.py", &[], ResolutionMode::Lenient)?,
            vec!["a", "b", "c", "d"]
        );
        Ok(())
    }

    #[test]
    fn test_cycle_terminates() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_test_file(&root.join("main.py"), "import a\n")?;
        create_test_file(&root.join("a.py"), "import b\n")?;
        create_test_file(&root.join("b.py"), "import a\n")?;

        assert_eq!(
            closure(root, "main.py", &[], ResolutionMode::Lenient)?,
            vec!["a", "b"]
        );
        Ok(())
    }

    #[test]
    fn test_stdlib_name_shadowed_locally_is_not_embedded() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_test_file(&root.join("main.py"), "import json\nimport local\n")?;
        create_test_file(&root.join("json.py"), "# shadows the stdlib\n")?;
        create_test_file(&root.join("local.py"), "")?;

        assert_eq!(
            closure(root, "main.py", &[], ResolutionMode::Lenient)?,
            vec!["local"]
        );
        Ok(())
    }

    #[test]
    fn test_extra_modules_are_forced_in() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_test_file(
            &root.join("main.py"),
            "import importlib\nplugin = importlib.import_module('plugins.' + 'audio')\n",
        )?;
        create_test_file(&root.join("plugins/__init__.py"), "")?;
        create_test_file(&root.join("plugins/audio.py"), "from . import codecs\n")?;
        create_test_file(&root.join("plugins/codecs.py"), "")?;

        assert_eq!(
            closure(root, "main.py", &[], ResolutionMode::Lenient)?,
            Vec::<String>::new()
        );
        assert_eq!(
            closure(root, "main.py", &["plugins.audio"], ResolutionMode::Lenient)?,
            vec!["plugins/audio", "plugins/__init__", "plugins/codecs"]
        );
        Ok(())
    }

    #[test]
    fn test_unresolved_import_policy() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_test_file(&root.join("main.py"), "import present\n")?;
        create_test_file(&root.join("present.py"), "import missing_dependency\n")?;

        assert_eq!(
            closure(root, "main.py", &[], ResolutionMode::Lenient)?,
            vec!["present"]
        );

        let err = closure(root, "main.py", &[], ResolutionMode::Strict)
            .expect_err("strict mode rejects unresolved imports");
        match err.downcast_ref::<BundleError>() {
            Some(BundleError::UnresolvedImport { import, importer }) => {
                assert_eq!(import, "missing_dependency");
                assert_eq!(importer, "present");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_stdlib_submodules_are_not_unresolved_in_strict_mode() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_test_file(
            &root.join("main.py"),
            "from email.mime.text import MIMEText
import importlib.metadata
from json.decoder import JSONDecodeError
",
        )?;

        assert_eq!(
            closure(root, "main.py", &[], ResolutionMode::Strict)?,
            Vec::<String>::new()
        );
        Ok(())
    }

    #[test]
    fn test_parse_error_in_dependency_aborts() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        create_test_file(&root.join("main.py"), "import broken\n")?;
        create_test_file(&root.join("broken.py"), "def f(:\n    pass\n")?;

        let err = closure(root, "main.py", &[], ResolutionMode::Lenient)
            .expect_err("parse errors are fatal");
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::Parse { .. })
        ));
        Ok(())
    }
}
