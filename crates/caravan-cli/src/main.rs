#![forbid(unsafe_code)]

use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use caravan_config::{Manifest, MANIFEST_FILE};
use caravan_engine::{
    ConflictStrategy, DependencyResolver, LogCrateLogger, ResolutionParameters, ResolveResult,
};
use caravan_repo::RepositorySet;
use clap::{Args, Parser, Subcommand};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "caravan", about = "Resolve Maven and Ivy dependency graphs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the project's dependencies and report problems
    Resolve(ResolveArgs),
    /// Print the resolved dependency tree
    Tree(ResolveArgs),
    /// Print the resolved classpath
    Classpath(ResolveArgs),
}

impl Command {
    fn args(&self) -> &ResolveArgs {
        match self {
            Self::Resolve(args) | Self::Tree(args) | Self::Classpath(args) => args,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
struct ResolveArgs {
    /// Configuration to resolve (defaults to the manifest's, usually "runtime")
    #[arg(long, short = 'c')]
    configuration: Option<String>,
    /// Conflict strategy: nearest, latest, or forced
    #[arg(long)]
    strategy: Option<String>,
    /// Fail on any unresolved module or missing artifact
    #[arg(long)]
    fail_fast: bool,
    /// Download artifacts again even when cached
    #[arg(long)]
    refresh: bool,
    /// Trace traversal and conflict decisions
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.command.args().verbose);

    let result = match &cli.command {
        Command::Resolve(args) => cmd_resolve(args),
        Command::Tree(args) => cmd_tree(args),
        Command::Classpath(args) => cmd_classpath(args),
    };

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Find the manifest in the current directory.
fn manifest_path() -> Result<PathBuf, Box<dyn Error>> {
    let path = std::env::current_dir()?.join(MANIFEST_FILE);
    if !path.exists() {
        return Err(format!("no {MANIFEST_FILE} found in current directory").into());
    }
    Ok(path)
}

/// Manifest parameters with command-line flags applied on top.
fn parameters(
    manifest: ResolutionParameters,
    args: &ResolveArgs,
) -> Result<ResolutionParameters, Box<dyn Error>> {
    let mut params = manifest
        .with_fail_fast(manifest.fail_fast || args.fail_fast)
        .with_refresh(manifest.refresh || args.refresh)
        .with_verbose(args.verbose);
    if let Some(strategy) = &args.strategy {
        params = params.with_strategy(strategy.parse::<ConflictStrategy>()?);
    }
    Ok(params)
}

/// Resolve the current project; returns the configuration and the result.
fn resolve(args: &ResolveArgs) -> Result<(String, ResolveResult), Box<dyn Error>> {
    let manifest = Manifest::from_path(&manifest_path()?)?;
    let set = manifest.dependency_set()?;
    let params = parameters(manifest.parameters()?, args)?;
    let configuration = args
        .configuration
        .clone()
        .unwrap_or_else(|| manifest.configuration().to_owned());

    let cache_root = caravan_util::fs::caravan_home()?.join("repository");
    log::debug!("artifact cache at {}", cache_root.display());
    let repositories = RepositorySet::from_endpoints(&manifest.endpoints()?, &cache_root)?;

    let resolver = DependencyResolver::new(Arc::new(repositories), Arc::new(LogCrateLogger));
    let result = resolver.resolve(&set, &configuration, &params)?;
    Ok((configuration, result))
}

fn cmd_resolve(args: &ResolveArgs) -> CliResult {
    let (configuration, result) = resolve(args)?;
    let modules = result.dependency_tree().coordinates().len();
    eprintln!(
        "    Resolved {modules} module(s), {} file(s) for `{configuration}`",
        result.files().len()
    );
    for warning in result.warnings() {
        eprintln!("  warning: {warning}");
    }
    if !result.problems().is_empty() {
        for problem in result.problems() {
            eprintln!("  problem: {problem}");
        }
        return Err(format!("{} problem(s) found", result.problems().len()).into());
    }
    Ok(())
}

fn cmd_tree(args: &ResolveArgs) -> CliResult {
    let (_, result) = resolve(args)?;
    print!("{}", result.dependency_tree().render());
    Ok(())
}

fn cmd_classpath(args: &ResolveArgs) -> CliResult {
    let (_, result) = resolve(args)?;
    let joined = std::env::join_paths(result.files())?;
    println!("{}", joined.to_string_lossy());
    Ok(())
}
