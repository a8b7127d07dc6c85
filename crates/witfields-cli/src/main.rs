#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "witf: inspect work-item field metadata and try field edits",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Engine config file (TOML). Defaults to `.witfields/config.toml`.
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Metadata",
        about = "List field definitions",
        long_about = "List the field definitions of a metadata snapshot.",
        after_help = "EXAMPLES:\n    # Work-item fields in snapshot order\n    witf fields -m snapshot.json\n\n    # Every field, sorted by display name\n    witf fields -m snapshot.json --all --sort\n\n    # Emit machine-readable output\n    witf fields -m snapshot.json --format json"
    )]
    Fields(cmd::fields::FieldsArgs),

    #[command(
        next_help_heading = "Metadata",
        about = "Show the allowed values of a field",
        long_about = "Resolve the allowed values of one field from the snapshot's suggestion rules.",
        after_help = "EXAMPLES:\n    # By reference name\n    witf allowed -m snapshot.json System.State\n\n    # By id\n    witf allowed -m snapshot.json 2\n\n    # Emit machine-readable output\n    witf allowed -m snapshot.json Priority --format json"
    )]
    Allowed(cmd::allowed::AllowedArgs),

    #[command(
        next_help_heading = "Work Items",
        about = "Apply field edits to a work item",
        long_about = "Load a work item (or start a new one), apply user edits and show the resulting field states.",
        after_help = "EXAMPLES:\n    # Edit a saved item\n    witf edit -m snapshot.json --item item.json --set System.Title=\"New title\"\n\n    # Move a new item to another area by path\n    witf edit -m snapshot.json --project 1 --set \"Area Path=ProjectX\\TeamA\"\n\n    # Clear a field\n    witf edit -m snapshot.json --item item.json --set Priority="
    )]
    Edit(cmd::edit::EditArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("WITFIELDS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "witfields_core=debug,witf=debug,info"
        } else {
            "witfields_core=info,warn"
        })
    });

    let format = env::var("WITFIELDS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Fields(args) => cmd::fields::run_fields(args, output, config),
        Commands::Allowed(args) => cmd::allowed::run_allowed(args, output, config),
        Commands::Edit(args) => cmd::edit::run_edit(args, output, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn format_flag_after_subcommand() {
        let cli = Cli::parse_from(["witf", "fields", "-m", "s.json", "--format", "json"]);
        assert_eq!(cli.format, Some(OutputMode::Json));
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn hidden_json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["witf", "--json", "fields", "-m", "s.json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn config_flag_parsed() {
        let cli = Cli::parse_from(["witf", "--config", "engine.toml", "fields", "-m", "s.json"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("engine.toml")));
    }

    #[test]
    fn allowed_subcommand_parses() {
        let cli = Cli::parse_from(["witf", "allowed", "-m", "s.json", "System.State"]);
        assert!(matches!(cli.command, Commands::Allowed(_)));
    }

    #[test]
    fn edit_subcommand_parses() {
        let cli = Cli::parse_from([
            "witf",
            "edit",
            "-m",
            "s.json",
            "--item",
            "item.json",
            "--set",
            "System.Title=Hi",
        ]);
        assert!(matches!(cli.command, Commands::Edit(_)));
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["witf"]).is_err());
    }
}
