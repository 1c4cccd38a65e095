use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, export};
use std::path::PathBuf;
use traktboxd_config::{Config, PathManager};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "traktboxd")]
#[command(about = "traktboxd - Export your Trakt watch history as a Letterboxd import file")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Also write logs to a daily-rotated file (defaults to the log directory when no path is given)
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a user's watch history to a Letterboxd CSV
    #[command(long_about = "Fetch a Trakt user's watched movies, ratings and viewing history and write a Letterboxd-compatible CSV. Movies watched more than once get one row per viewing, with every viewing except the latest marked as a rewatch. Large exports are split into chunks and bundled into a zip archive.")]
    Export {
        /// Trakt username (the profile must be public)
        username: String,

        /// Only include viewings on or after this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        start_date: Option<NaiveDate>,

        /// Only include viewings on or before this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        end_date: Option<NaiveDate>,

        /// Directory to write the export into (overrides config)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Maximum rows per CSV file before splitting into a zip (overrides config)
        #[arg(long, value_name = "ROWS")]
        chunk_limit: Option<usize>,
    },
    /// Show the rows an export would contain without writing files
    Preview {
        /// Trakt username (the profile must be public)
        username: String,

        /// Only include viewings on or after this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        start_date: Option<NaiveDate>,

        /// Only include viewings on or before this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        end_date: Option<NaiveDate>,

        /// Show at most this many rows
        #[arg(long, value_name = "ROWS")]
        limit: Option<usize>,
    },
    /// Configure the Trakt API key and export settings
    #[command(long_about = "Manage traktboxd configuration. Running without a subcommand shows the current configuration.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Remove previously generated export files
    Clear {
        /// Delete generated CSV files and archives from the export directory
        #[arg(long, action = ArgAction::SetTrue)]
        exports: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the client id)
    Show {
        /// Show the client id unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure the Trakt API client id
    #[command(long_about = "Configure the Trakt API client id used as the trakt-api-key header. Create an API application at https://trakt.tv/oauth/applications to get one.")]
    Trakt {
        /// Trakt Client ID (if not provided, will prompt)
        #[arg(long)]
        client_id: Option<String>,

        /// Trakt API base URL
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Configure export defaults
    Export {
        /// Default export directory
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Maximum rows per CSV file
        #[arg(long, value_name = "ROWS")]
        chunk_limit: Option<usize>,

        /// Maximum concurrent history requests
        #[arg(long, value_name = "N")]
        history_concurrency: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let path_manager = PathManager::default();
    let config = Config::load_or_default(&path_manager.config_file()).map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to load config from {}: {}",
            path_manager.config_file().display(),
            e
        )
    })?;

    let log_file = match cli.log_file.clone() {
        Some(path) => Some(path.unwrap_or_else(|| path_manager.log_file())),
        None => config.logging.file.clone(),
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, &config.logging.level, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Export {
            username,
            start_date,
            end_date,
            output_dir,
            chunk_limit,
        } => {
            let args = export::ExportArgs {
                username,
                start_date,
                end_date,
                output_dir,
                chunk_limit,
            };
            export::run_export(args, &config, &path_manager, &output).await
        }
        Commands::Preview {
            username,
            start_date,
            end_date,
            limit,
        } => export::run_preview(username, start_date, end_date, limit, &config, &output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &path_manager, &output).await
        }
        Commands::Clear { exports } => clear::run_clear(exports, &config, &path_manager, &output).await,
    }
}
