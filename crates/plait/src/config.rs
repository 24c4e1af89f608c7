use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::{
    code_generator::DEFAULT_SHEBANG,
    dirs::{CONFIG_FILE_NAME, user_config_file},
};

/// What to do with an import that matches no file in any search root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Leave the module out of the bundle.
    #[default]
    Lenient,
    /// Abort bundling with an unresolved-import error.
    Strict,
}

/// Bundling options, assembled from defaults, configuration files and
/// command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Extra search roots, consulted after the entry script's directory.
    pub src: Vec<PathBuf>,
    /// Dotted module names to embed even if no static import reaches them.
    pub extra_modules: Vec<String>,
    /// Interpreter whose default `sys.path` is appended to the search roots.
    pub python: Option<PathBuf>,
    pub copy_shebang: bool,
    pub default_shebang: String,
    pub resolution: ResolutionMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src: Vec::new(),
            extra_modules: Vec::new(),
            python: None,
            copy_shebang: false,
            default_shebang: DEFAULT_SHEBANG.to_owned(),
            resolution: ResolutionMode::default(),
        }
    }
}

/// One configuration file. Unset keys leave the current value alone.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    src: Vec<PathBuf>,
    extra_modules: Vec<String>,
    python: Option<PathBuf>,
    copy_shebang: Option<bool>,
    default_shebang: Option<String>,
    resolution: Option<ResolutionMode>,
}

impl Config {
    /// Load the user configuration, then `explicit` if given, otherwise
    /// `plait.toml` in the current directory when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let project_file = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = PathBuf::from(CONFIG_FILE_NAME);
                candidate.is_file().then_some(candidate)
            }
        };
        let user_file = user_config_file().filter(|path| path.is_file());
        Self::load_from(user_file.as_deref(), project_file.as_deref())
    }

    /// Layer `user_file` and then `project_file` over the defaults.
    pub fn load_from(user_file: Option<&Path>, project_file: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        for path in [user_file, project_file].into_iter().flatten() {
            config.merge_file(path)?;
        }
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        debug!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        self.merge(file, base_dir);
        Ok(())
    }

    /// Lists are extended, scalars are replaced when the file sets them.
    /// Relative paths are taken relative to the file's directory.
    fn merge(&mut self, file: ConfigFile, base_dir: &Path) {
        self.src
            .extend(file.src.into_iter().map(|dir| base_dir.join(dir)));
        self.extra_modules.extend(file.extra_modules);
        if let Some(python) = file.python {
            // Bare names such as `python3` are looked up on PATH, not on disk
            self.python = Some(if python.components().count() > 1 {
                base_dir.join(python)
            } else {
                python
            });
        }
        if let Some(copy_shebang) = file.copy_shebang {
            self.copy_shebang = copy_shebang;
        }
        if let Some(default_shebang) = file.default_shebang {
            self.default_shebang = default_shebang;
        }
        if let Some(resolution) = file.resolution {
            self.resolution = resolution;
        }
    }
}
