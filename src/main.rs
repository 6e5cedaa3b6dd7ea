//! netpol-matrix: interactive reachability matrix for Kubernetes network
//! policies.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use netpol_matrix::{
    cli::{self, OutputFormat, EXIT_ERROR},
    config::{self, AppConfig, ConfigOverrides, Validatable, APP_DIR_NAME},
    model::ResourceType,
};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "netpol-matrix")]
#[command(version)]
#[command(about = "Interactive reachability matrix for Kubernetes network policies", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success (check: communication allowed)
    1  Communication blocked (check only)
    3  Error occurred

EXAMPLES:
    # Open the matrix against a local backend
    netpol-matrix --server http://127.0.0.1:5000

    # Pods instead of deployments, without live updates
    netpol-matrix --type pod --no-push

    # Can web reach the database?
    netpol-matrix check default/web default/db

    # Same check as JSON, for scripts
    netpol-matrix check default/web default/db --format json

    # Inspect a policy
    netpol-matrix describe policy allow-web")]
struct Cli {
    /// Config file (default: discovered .netpol-matrix.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(short, long, global = true, env = "NETPOL_MATRIX_SERVER")]
    server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Do not listen for server-sent updates
    #[arg(long, global = true)]
    no_push: bool,

    /// Resource type to analyze
    #[arg(long = "type", short = 't', global = true, value_enum)]
    resource_type: Option<ResourceType>,

    /// Show system resources (kube-*, calico-*, ...)
    #[arg(long, global = true)]
    show_system: bool,

    /// Colour theme
    #[arg(long, global = true, value_parser = ["dark", "light", "high-contrast"])]
    theme: Option<String>,

    /// Log file for the TUI
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server_url: self.server.clone(),
            timeout_secs: self.timeout,
            no_push: self.no_push,
            resource_type: self.resource_type,
            show_system_resources: self.show_system,
            theme: self.theme.clone(),
            log_file: self.log_file.clone(),
        }
    }

    /// Merged and validated configuration.
    fn load_config(&self) -> Result<AppConfig> {
        let (config, loaded_from) =
            AppConfig::from_file_with_overrides(self.config.as_deref(), &self.overrides())?;
        let errors = config.validate();
        if !errors.is_empty() {
            let listing: Vec<String> = errors.iter().map(|e| format!("  {e}")).collect();
            let origin = loaded_from.map_or_else(
                || "command-line flags".to_string(),
                |p| p.display().to_string(),
            );
            anyhow::bail!("invalid configuration ({origin}):\n{}", listing.join("\n"));
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive matrix (default)
    Matrix,

    /// Analyze one source/target pair and exit
    Check {
        /// Source workload id (namespace/name)
        source: String,
        /// Target workload id (namespace/name)
        target: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the cluster's namespaces
    Namespaces {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show a policy or workload
    Describe {
        #[command(subcommand)]
        target: DescribeTarget,
    },

    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum DescribeTarget {
    /// A network policy by name
    Policy {
        name: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// A deployment or pod
    Resource {
        #[arg(value_enum)]
        group: ResourceType,
        /// Workload id (namespace/name)
        id: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the JSON Schema of the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print an example config with default values
    Example,
    /// Print current effective configuration (defaults + file + flags)
    Show,
    /// Print config file search paths and the discovered config file
    Path,
    /// Generate a commented .netpol-matrix.yaml in the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn run(args: Cli) -> Result<i32> {
    let default_command = Commands::Matrix;
    let command = args.command.as_ref().unwrap_or(&default_command);

    // Commands that need neither the backend nor a valid config.
    match command {
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "netpol-matrix", &mut io::stdout());
            return Ok(cli::EXIT_OK);
        }
        Commands::Config { action } => return run_config(&args, action),
        _ => {}
    }

    let config = args.load_config()?;
    let tui_mode = matches!(command, Commands::Matrix);
    init_tracing(&args, &config, tui_mode);

    match command {
        Commands::Matrix => cli::run_matrix(&config, args.theme.is_some()),
        Commands::Check {
            source,
            target,
            format,
        } => cli::run_check(
            &config,
            source,
            target,
            config.matrix.default_resource_type,
            *format,
        ),
        Commands::Namespaces { format } => cli::run_namespaces(&config, *format),
        Commands::Describe { target } => match target {
            DescribeTarget::Policy { name, format } => {
                cli::run_describe_policy(&config, name, *format)
            }
            DescribeTarget::Resource { group, id, format } => {
                cli::run_describe_resource(&config, *group, id, *format)
            }
        },
        Commands::Completions { .. } | Commands::Config { .. } => Ok(cli::EXIT_OK),
    }
}

/// Filter precedence: `RUST_LOG`, then `--verbose`, then `logging.level`.
fn filter_directive(verbose: bool, config: &AppConfig) -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "debug".to_string()
        } else {
            config
                .logging
                .level
                .clone()
                .unwrap_or_else(|| "info".to_string())
        }
    })
}

/// The TUI owns the terminal, so it logs to a file; everything else logs
/// to stderr.
fn init_tracing(args: &Cli, config: &AppConfig, tui_mode: bool) {
    let filter = EnvFilter::new(filter_directive(args.verbose, config));

    let file_layer = if tui_mode {
        match open_log_file(config) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
            Err(e) => {
                eprintln!("Warning: logging disabled: {e:#}");
                None
            }
        }
    } else {
        None
    };
    let stderr_layer = (!tui_mode).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

fn open_log_file(config: &AppConfig) -> Result<std::fs::File> {
    let path = config
        .logging
        .resolved_file()
        .context("no cache directory for the log file; pass --log-file")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open {}", path.display()))
}

fn run_config(args: &Cli, action: &ConfigAction) -> Result<i32> {
    match action {
        ConfigAction::Schema { output } => {
            let schema = config::generate_json_schema().context("failed to generate schema")?;
            match output {
                Some(path) => {
                    std::fs::write(path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
        }
        ConfigAction::Example => print!("{}", config::generate_example_config()),
        ConfigAction::Show => {
            let (config, loaded_from) =
                AppConfig::from_file_with_overrides(args.config.as_deref(), &args.overrides())?;
            if let Some(path) = &loaded_from {
                eprintln!("# Loaded from: {}", path.display());
            } else {
                eprintln!("# No config file found; showing defaults");
            }
            for error in config.validate() {
                eprintln!("# Invalid: {error}");
            }
            let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
        }
        ConfigAction::Path => {
            let search_paths: [Option<String>; 3] = [
                std::env::current_dir()
                    .ok()
                    .map(|p| p.display().to_string()),
                dirs::config_dir().map(|p| p.join(APP_DIR_NAME).display().to_string()),
                dirs::home_dir().map(|p| p.display().to_string()),
            ];
            eprintln!("Config file search paths (in order):");
            for path in search_paths.into_iter().flatten() {
                eprintln!("  {path}");
            }
            eprintln!();
            eprintln!("Recognized file names:");
            for name in config::CONFIG_FILE_NAMES {
                eprintln!("  {name}");
            }
            eprintln!();
            match config::discover_config_file(args.config.as_deref()) {
                Some(path) => eprintln!("Active config file: {}", path.display()),
                None => eprintln!("No config file found."),
            }
        }
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".netpol-matrix.yaml");
            if target.exists() {
                anyhow::bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            std::fs::write(&target, config::generate_full_example_config())
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
        }
    }
    Ok(cli::EXIT_OK)
}
