//! Import discovery visitor that finds all imports in a Python module,
//! including those nested within functions, classes, conditionals and
//! `try` blocks.

use std::path::Path;

use anyhow::Result;
use log::{trace, warn};
use ruff_python_ast::{
    Expr, Stmt, StmtImport, StmtImportFrom,
    visitor::{Visitor, walk_stmt},
};

use crate::{
    error::BundleError,
    types::{ImportReference, import_path},
};

/// Visitor that collects one [`ImportReference`] per `import` alias or
/// `from ... import` statement, in document order.
#[derive(Debug, Default)]
pub struct ImportDiscoveryVisitor {
    imports: Vec<ImportReference>,
}

impl ImportDiscoveryVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all discovered imports
    pub fn into_imports(self) -> Vec<ImportReference> {
        self.imports
    }

    fn record_import(&mut self, import: &StmtImport) {
        for alias in &import.names {
            let path = import_path(0, Some(alias.name.as_str()));
            trace!("Discovered import {path}");
            self.imports.push(ImportReference::new(path, Vec::new()));
        }
    }

    fn record_import_from(&mut self, import_from: &StmtImportFrom) {
        let module = import_from.module.as_ref().map(|m| m.as_str());
        let path = import_path(import_from.level as usize, module);

        let mut items = Vec::with_capacity(import_from.names.len());
        for alias in &import_from.names {
            let name = alias.name.as_str();
            if name == "*" {
                trace!("Star import from {path} contributes no item probes");
                continue;
            }
            items.push(name.to_owned());
        }

        if path.is_empty() {
            warn!("Skipping from-import with neither module nor level");
            return;
        }

        trace!("Discovered from-import {path} {items:?}");
        self.imports.push(ImportReference::new(path, items));
    }
}

impl<'a> Visitor<'a> for ImportDiscoveryVisitor {
    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Import(import) => self.record_import(import),
            Stmt::ImportFrom(import_from) => self.record_import_from(import_from),
            _ => walk_stmt(self, stmt),
        }
    }

    // Expressions cannot contain statements, so there is nothing to find there.
    fn visit_expr(&mut self, _expr: &'a Expr) {}
}

/// Parse `source` and return its import references in document order.
///
/// `path` is only used to locate parse errors.
pub fn extract_imports(source: &str, path: &Path) -> Result<Vec<ImportReference>> {
    let parsed = ruff_python_parser::parse_module(source).map_err(|err| {
        BundleError::parse_at(
            path.to_path_buf(),
            source,
            err.location.start().to_usize(),
            err.error.to_string(),
        )
    })?;

    let mut visitor = ImportDiscoveryVisitor::new();
    visitor.visit_body(&parsed.syntax().body);
    Ok(visitor.into_imports())
}
