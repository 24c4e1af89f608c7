use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use indexmap::IndexSet;
use log::{debug, trace, warn};

use crate::{
    error::BundleError,
    types::{ImportReference, ModuleRecord, normalize_logical_path},
};

/// Extension of Python source files.
pub const SOURCE_EXTENSION: &str = "py";

/// Stem of a package initializer file.
pub const PACKAGE_INIT: &str = "__init__";

/// The filesystem layout a candidate probes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// `<path>.py`
    ModuleFile,
    /// `<prefix>/__init__.py` for one prefix of the import path
    PackageInit,
    /// `<path>/<item>.py`, for `from pkg import submodule`
    ItemModule,
    /// `<path>/<item>/__init__.py`, for `from pkg import subpackage`
    ItemPackage,
}

/// One possible location of an imported module, relative to a resolution base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    /// Slash-delimited path without extension, not yet normalized.
    pub logical_path: String,
}

impl Candidate {
    fn new(kind: CandidateKind, logical_path: String) -> Self {
        Self { kind, logical_path }
    }

    /// File name relative to the resolution base.
    pub fn file_name(&self) -> String {
        format!("{}.{SOURCE_EXTENSION}", self.logical_path)
    }
}

/// Enumerate every candidate for `reference`, in probing order: the direct
/// module file, one package initializer per path prefix, then a submodule
/// and a subpackage probe for each imported item.
pub fn enumerate_candidates(reference: &ImportReference) -> Vec<Candidate> {
    let path = reference.path.as_str();
    let segments: Vec<&str> = path.split('/').collect();
    let mut candidates = Vec::with_capacity(segments.len() + 1 + 2 * reference.items.len());

    // `.` and `..` name a package directory, never a module file
    if !matches!(segments.last(), Some(&("." | ".."))) {
        candidates.push(Candidate::new(CandidateKind::ModuleFile, path.to_owned()));
    }

    for depth in 1..=segments.len() {
        let prefix = segments[..depth].join("/");
        candidates.push(Candidate::new(
            CandidateKind::PackageInit,
            format!("{prefix}/{PACKAGE_INIT}"),
        ));
    }

    for item in &reference.items {
        candidates.push(Candidate::new(
            CandidateKind::ItemModule,
            format!("{path}/{item}"),
        ));
        candidates.push(Candidate::new(
            CandidateKind::ItemPackage,
            format!("{path}/{item}/{PACKAGE_INIT}"),
        ));
    }

    candidates
}

/// Build the ordered search roots: the entry script's directory, then the
/// caller-supplied paths, then the interpreter-reported paths.
///
/// Duplicates are dropped, keeping the first occurrence.
pub fn build_search_roots(
    entry_path: &Path,
    extra_paths: &[PathBuf],
    interpreter_paths: Vec<PathBuf>,
) -> Vec<PathBuf> {
    let mut unique_dirs = IndexSet::new();

    let entry_dir = match entry_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    unique_dirs.insert(canonical_or_original(entry_dir));

    for dir in extra_paths.iter().cloned().chain(interpreter_paths) {
        unique_dirs.insert(canonical_or_original(dir));
    }

    unique_dirs.into_iter().collect()
}

fn canonical_or_original(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

/// Read a module's source as UTF-8.
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| {
        BundleError::Read {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
        .into()
    })
}

/// A module file matched by the resolver, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub canonical_path: String,
    pub absolute_path: PathBuf,
}

impl ResolvedModule {
    /// Read the source and turn the match into a record.
    pub fn read(self) -> Result<ModuleRecord> {
        let source = read_source(&self.absolute_path)?;
        Ok(ModuleRecord {
            canonical_path: self.canonical_path,
            absolute_path: self.absolute_path,
            source,
        })
    }
}

/// Resolves import references to module files, first relative to the
/// importing module and then against the search roots.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    search_roots: Vec<PathBuf>,
}

impl ModuleResolver {
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        debug!("Search roots: {search_roots:?}");
        Self { search_roots }
    }

    /// Resolve `reference` imported by `importer` (`None` for the entry
    /// script and for forced modules).
    ///
    /// Every matching candidate is returned, in candidate order. Sources
    /// are only read by [`ResolvedModule::read`], so callers can skip
    /// modules they already hold. A reference that matches nothing yields
    /// an empty list; deciding whether that is an error is the caller's
    /// business.
    pub fn resolve(
        &self,
        importer: Option<&ModuleRecord>,
        reference: &ImportReference,
    ) -> Vec<ResolvedModule> {
        let candidates = enumerate_candidates(reference);

        if let Some(importer) = importer
            && let Some(base_dir) = importer.absolute_path.parent()
        {
            let matches = self.resolve_in_directory(base_dir, importer.logical_dir(), &candidates);
            if !matches.is_empty() {
                debug!(
                    "Resolved '{reference}' relative to {}",
                    importer.canonical_path
                );
                return matches;
            }
        }

        for root in &self.search_roots {
            let matches = self.resolve_in_directory(root, "", &candidates);
            if !matches.is_empty() {
                debug!("Resolved '{reference}' in search root {}", root.display());
                return matches;
            }
        }

        Vec::new()
    }

    /// Probe every candidate under `base_dir`. `logical_base` is the logical
    /// directory that `base_dir` corresponds to.
    fn resolve_in_directory(
        &self,
        base_dir: &Path,
        logical_base: &str,
        candidates: &[Candidate],
    ) -> Vec<ResolvedModule> {
        let mut matches: Vec<ResolvedModule> = Vec::new();

        for candidate in candidates {
            let location = base_dir.join(candidate.file_name());
            trace!("Probing {:?} at {}", candidate.kind, location.display());
            if !location.is_file() {
                continue;
            }

            let canonical_path = if logical_base.is_empty() {
                normalize_logical_path(&candidate.logical_path)
            } else {
                normalize_logical_path(&format!("{logical_base}/{}", candidate.logical_path))
            };
            if canonical_path.starts_with("..") {
                warn!(
                    "Module {} resolves outside every search root as '{canonical_path}'",
                    location.display()
                );
            }
            if matches.iter().any(|m| m.canonical_path == canonical_path) {
                continue;
            }

            matches.push(ResolvedModule {
                canonical_path,
                absolute_path: location,
            });
        }

        matches
    }
}
