use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{LevelFilter, info};
use plait::{
    BundleOrchestrator,
    config::{Config, ResolutionMode},
};

#[derive(Parser, Debug)]
#[command(
    name = "plait",
    version,
    about = "Bundle a Python script and its local imports into a single executable script"
)]
struct Cli {
    /// Entry script to bundle
    entry: PathBuf,

    /// Output file; the bundle goes to stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Embed a module even if no static import reaches it (dotted name)
    #[arg(long = "add-python-module", value_name = "NAME")]
    add_python_modules: Vec<String>,

    /// Extra directory to search for modules
    #[arg(long = "add-python-path", value_name = "DIR")]
    add_python_paths: Vec<PathBuf>,

    /// Interpreter whose default sys.path is searched after the extra paths
    #[arg(long, value_name = "PATH")]
    python_binary: Option<PathBuf>,

    /// Reuse the entry script's shebang line
    #[arg(long)]
    copy_shebang: bool,

    /// Fail on imports that cannot be resolved instead of leaving them out
    #[arg(long)]
    strict: bool,

    /// Configuration file to use instead of ./plait.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Command-line flags take precedence over every configuration file.
    fn apply_to(&self, config: &mut Config) {
        config.src.extend(self.add_python_paths.iter().cloned());
        config
            .extra_modules
            .extend(self.add_python_modules.iter().cloned());
        if let Some(python) = &self.python_binary {
            config.python = Some(python.clone());
        }
        if self.copy_shebang {
            config.copy_shebang = true;
        }
        if self.strict {
            config.resolution = ResolutionMode::Strict;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Nothing more to do if stderr is gone
            let _ = writeln!(io::stderr(), "error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    let bundle = BundleOrchestrator::new(config).bundle(&cli.entry)?;

    match &cli.output {
        Some(path) => write_output(path, &bundle),
        None => io::stdout()
            .lock()
            .write_all(bundle.as_bytes())
            .context("Failed to write bundle to stdout"),
    }
}

fn write_output(path: &Path, bundle: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    fs::write(path, bundle)
        .with_context(|| format!("Failed to write bundle to {}", path.display()))?;
    make_executable(path)?;
    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
