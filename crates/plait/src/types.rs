//! Shared type definitions for the plait crate
//!
//! Import references flow from the extractor into the resolver, and module
//! records flow from the resolver into the registry and the assembler.

use std::path::PathBuf;

use cow_utils::CowUtils;

/// A statically extracted import statement.
///
/// `path` is slash-delimited with dots removed (`pkg.sub` becomes `pkg/sub`).
/// Relative imports keep their anchor: one leading dot is `.`, every extra
/// level adds a `..` segment, so `from ..x import y` becomes `../x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    pub path: String,
    /// Names after `from ... import`; empty for a plain `import`.
    pub items: Vec<String>,
}

impl ImportReference {
    pub fn new(path: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            path: path.into(),
            items,
        }
    }

    /// Build a reference from a dotted module name as written in source or
    /// on the command line (`pkg.sub`, `.sibling`, `..`).
    pub fn from_dotted(name: &str) -> Self {
        let level = name.chars().take_while(|c| *c == '.').count();
        let module = &name[level..];
        Self::new(import_path(level, (!module.is_empty()).then_some(module)), Vec::new())
    }

    pub fn is_relative(&self) -> bool {
        self.path.starts_with('.')
    }
}

impl std::fmt::Display for ImportReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.items.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{} ({})", self.path, self.items.join(", "))
        }
    }
}

/// Convert an import level and optional dotted module into a slash path.
pub fn import_path(level: usize, module: Option<&str>) -> String {
    let module = module.map(|m| m.cow_replace('.', "/"));
    let anchor = match level {
        0 => None,
        1 => Some(".".to_owned()),
        n => Some(vec![".."; n - 1].join("/")),
    };
    match (anchor, module) {
        (None, Some(module)) => module.into_owned(),
        (Some(anchor), Some(module)) => format!("{anchor}/{module}"),
        (Some(anchor), None) => anchor,
        (None, None) => String::new(),
    }
}

/// A module selected for embedding.
///
/// Records are created once, when the resolver first finds the file, and are
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Normalized logical path without extension, e.g. `pkg/__init__`.
    pub canonical_path: String,
    /// Where the source was read from.
    pub absolute_path: PathBuf,
    pub source: String,
}

impl ModuleRecord {
    /// Logical directory of this module, used as the base for its relative
    /// imports. Empty for top-level modules.
    pub fn logical_dir(&self) -> &str {
        self.canonical_path
            .rsplit_once('/')
            .map_or("", |(dir, _)| dir)
    }
}

/// Collapse `.` and `..` segments and repeated slashes in a logical path.
///
/// `..` segments that would climb above the root are kept, so
/// `../x` stays `../x` while `pkg/../x` becomes `x`.
pub fn normalize_logical_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        ".".to_owned()
    } else {
        segments.join("/")
    }
}
