//! Scope Defaults CLI
//!
//! Entry point for the `scope-defaults` command-line tool.

use clap::{Parser, Subcommand};
use scope_defaults::traversal::scope_path;
use scope_defaults::{load_registry, DefaultsReport, KindRegistry, RegistrySource, ScopeTree};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SCOPE_DEFAULTS_LOG";

#[derive(Parser)]
#[command(name = "scope-defaults")]
#[command(about = "Resolve set_defaults declarations across scopes", version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every declared scope and print the result
    Resolve {
        /// Root directory of the declaration tree
        #[arg(long, short = 'r', default_value = ".")]
        root: PathBuf,

        /// Path to registry definition file (default: built-in kinds)
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Only print the defaults in effect for this directory (relative
        /// to the root, or absolute below it)
        #[arg(long)]
        scope: Option<String>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },

    /// List registered kinds and their fields
    Kinds {
        /// Path to registry definition file (default: built-in kinds)
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Validate every declaration without printing the result
    Check {
        /// Root directory of the declaration tree
        #[arg(long, short = 'r', default_value = ".")]
        root: PathBuf,

        /// Path to registry definition file (default: built-in kinds)
        #[arg(long)]
        registry: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve {
            root,
            registry,
            scope,
            human,
        } => {
            run_resolve(&root, registry.as_deref(), scope.as_deref(), human);
        }
        Commands::Kinds { registry, json } => {
            run_kinds(registry.as_deref(), json);
        }
        Commands::Check { root, registry } => {
            run_check(&root, registry.as_deref());
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn registry_or_exit(path: Option<&Path>) -> (KindRegistry, RegistrySource) {
    match load_registry(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading registry: {}", e);
            process::exit(1);
        }
    }
}

fn run_resolve(root: &Path, registry_path: Option<&Path>, scope: Option<&str>, human: bool) {
    let (registry, source) = registry_or_exit(registry_path);

    let resolved = match ScopeTree::discover(root).and_then(|tree| tree.resolve(&registry)) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Some(scope) = scope {
        let scope = match scope_path(root, Path::new(scope)) {
            Ok(scope) => scope,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };
        let table = resolved.defaults_for(&scope);
        match serde_json::to_string_pretty(table) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let report = match DefaultsReport::build(source, &resolved) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if human {
        print!("{}", report.to_human());
    } else {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }
}

fn run_kinds(registry_path: Option<&Path>, json_output: bool) {
    let (registry, _) = registry_or_exit(registry_path);

    if json_output {
        let output: Vec<serde_json::Value> = registry
            .kinds()
            .map(|kind| {
                serde_json::json!({
                    "alias": kind.alias(),
                    "deprecated_alias": kind.deprecated_alias(),
                    "fields": kind.valid_field_aliases(),
                })
            })
            .collect();

        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        for kind in registry.kinds() {
            let fields: Vec<&str> = kind.valid_field_aliases().into_iter().collect();
            println!("{}: {}", kind.alias(), fields.join(", "));
        }
    }
}

fn run_check(root: &Path, registry_path: Option<&Path>) {
    let (registry, _) = registry_or_exit(registry_path);

    match ScopeTree::discover(root).and_then(|tree| tree.resolve(&registry)) {
        Ok(resolved) => {
            println!("Declarations valid: {} scope(s)", resolved.len());
        }
        Err(e) => {
            eprintln!("Declaration error: {}", e);
            process::exit(1);
        }
    }
}
