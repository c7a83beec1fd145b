//! Manage the exclusion preferences of a static-analysis client from the
//! command line: rules switched off, files and directories left out of
//! analysis, and extra properties passed to the analyzer. Values are kept in
//! the same flat string encodings the client reads, so a preference file
//! edited here can be handed straight to it.
use anyhow::Result;
use clap::{Parser, Subcommand};
use lint_exclusions::core::config::ConfigManager;
use lint_exclusions::utils;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lint-exclusions")]
#[command(about = "Manage rule and file exclusions for static analysis")]
struct Cli {
    /// Global preference file (defaults to $LINT_EXCLUSIONS_PREFS or the user config dir)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Project preference file whose extra properties are applied after the global ones
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the preference file if it does not exist
    Init,
    /// Exclude a rule from analysis
    ExcludeRule {
        /// Rule as repository:key, e.g. squid:S1135
        rule: String,
        /// Name shown when listing exclusions
        #[arg(long)]
        name: Option<String>,
    },
    /// Analyze a previously excluded rule again
    IncludeRule {
        /// Rule as repository:key
        rule: String,
    },
    /// List excluded rules
    ListRules,
    /// Remove every rule exclusion
    ClearRules,
    /// Exclude a file, or a directory with --directory
    ExcludeFile {
        pattern: String,
        #[arg(long)]
        directory: bool,
    },
    /// List file exclusions
    ListFiles,
    /// Set an extra analyzer property
    SetProperty {
        /// Property as name=value
        pair: String,
    },
    /// Remove an extra analyzer property
    RemoveProperty { name: String },
    /// List the extra properties an analysis receives
    ListProperties,
    /// Show or set the marker severity (info, warning, error)
    Severity { level: Option<String> },
    /// Tell whether a path is excluded and whether it is a test file
    Check { path: String },
    /// Report preference values that cannot be stored faithfully
    Validate,
    /// Export all preferences
    Export {
        output: PathBuf,
        #[arg(long, default_value = "toml")]
        format: String,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_manager = ConfigManager::new(cli.prefs, cli.project)?;

    match cli.command {
        Commands::Init => utils::initialize_preferences(&config_manager),
        Commands::ExcludeRule { rule, name } => utils::exclude_rule(&config_manager, &rule, name),
        Commands::IncludeRule { rule } => utils::include_rule(&config_manager, &rule),
        Commands::ListRules => utils::list_rules(&config_manager),
        Commands::ClearRules => utils::clear_rules(&config_manager),
        Commands::ExcludeFile { pattern, directory } => {
            utils::exclude_file(&config_manager, pattern, directory)
        }
        Commands::ListFiles => utils::list_files(&config_manager),
        Commands::SetProperty { pair } => utils::set_property(&config_manager, &pair),
        Commands::RemoveProperty { name } => utils::remove_property(&config_manager, &name),
        Commands::ListProperties => utils::list_properties(&config_manager),
        Commands::Severity { level } => utils::severity(&config_manager, level.as_deref()),
        Commands::Check { path } => utils::check_path(&config_manager, &path),
        Commands::Validate => utils::validate_preferences(&config_manager),
        Commands::Export { output, format } => {
            utils::export_preferences(&config_manager, &output, &format)
        }
    }
}
