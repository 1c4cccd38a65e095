use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use dialoguer::Input;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::PathBuf;
use traktboxd_config::{Config, PathManager};

pub async fn run_config(cmd: ConfigCommands, path_manager: &PathManager, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, path_manager, output),
        ConfigCommands::Trakt { client_id, api_url } => {
            configure_trakt(client_id, api_url, path_manager, output)
        }
        ConfigCommands::Export {
            output_dir,
            chunk_limit,
            history_concurrency,
        } => configure_export(output_dir, chunk_limit, history_concurrency, path_manager, output),
    }
}

/// The file as written, without environment overrides, so saving never
/// persists a value that only came from `TRAKT_CLIENT_ID`.
fn load_file_config(config_file: &PathBuf) -> Result<Config> {
    if !config_file.exists() {
        return Ok(Config::default());
    }
    Config::load_from_file(config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

fn save_config(config: &Config, config_file: &PathBuf) -> Result<()> {
    config
        .save_to_file(config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))
}

fn show_config(full: bool, path_manager: &PathManager, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("It will be created when you run 'traktboxd config trakt'.");
        return Ok(());
    }

    let mut config = load_file_config(&config_file)?;
    let env_override = std::env::var("TRAKT_CLIENT_ID").is_ok();
    config.apply_env_overrides();

    let client_id = if full {
        config.trakt.client_id.clone()
    } else {
        mask_string(&config.trakt.client_id)
    };
    let output_dir = config
        .export
        .output_dir
        .clone()
        .unwrap_or_else(|| path_manager.exports_dir());

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "Configuration".bright_cyan().bold());
            println!("{} {}\n", "File:".bright_black(), config_file.display());

            let mut trakt_table = Table::new();
            trakt_table.set_header(vec![Cell::new("Trakt")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold)]);
            trakt_table.add_row(vec![
                Cell::new("Client ID"),
                Cell::new(if env_override {
                    format!("{} (from TRAKT_CLIENT_ID)", client_id)
                } else {
                    client_id
                }),
            ]);
            trakt_table.add_row(vec![Cell::new("API URL"), Cell::new(&config.trakt.api_url)]);
            trakt_table.load_preset(comfy_table::presets::UTF8_FULL);
            trakt_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}\n", trakt_table);

            let mut export_table = Table::new();
            export_table.set_header(vec![Cell::new("Export")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold)]);
            export_table.add_row(vec![
                Cell::new("Output Directory"),
                Cell::new(output_dir.display().to_string()),
            ]);
            export_table.add_row(vec![
                Cell::new("Chunk Limit"),
                Cell::new(format!("{} rows", config.export.chunk_limit)),
            ]);
            export_table.add_row(vec![
                Cell::new("History Concurrency"),
                Cell::new(config.export.history_concurrency.to_string()),
            ]);
            export_table.load_preset(comfy_table::presets::UTF8_FULL);
            export_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}\n", export_table);

            let mut logging_table = Table::new();
            logging_table.set_header(vec![Cell::new("Logging")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold)]);
            logging_table.add_row(vec![Cell::new("Level"), Cell::new(&config.logging.level)]);
            logging_table.add_row(vec![
                Cell::new("File"),
                Cell::new(
                    config
                        .logging
                        .file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<stderr only>".to_string()),
                ),
            ]);
            logging_table.load_preset(comfy_table::presets::UTF8_FULL);
            logging_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", logging_table);

            if let Err(e) = config.validate() {
                println!();
                output.warn(format!("Configuration is incomplete: {}", e));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file,
                "trakt": {
                    "client_id": client_id,
                    "client_id_from_env": env_override,
                    "api_url": config.trakt.api_url,
                },
                "export": {
                    "output_dir": output_dir,
                    "chunk_limit": config.export.chunk_limit,
                    "history_concurrency": config.export.history_concurrency,
                },
                "logging": {
                    "level": config.logging.level,
                    "file": config.logging.file,
                },
                "valid": config.validate().is_ok(),
            }));
        }
    }

    Ok(())
}

fn configure_trakt(
    client_id: Option<String>,
    api_url: Option<String>,
    path_manager: &PathManager,
    output: &Output,
) -> Result<()> {
    let config_file = path_manager.config_file();
    let mut config = load_file_config(&config_file)?;

    let client_id = match client_id {
        Some(id) => id,
        None => {
            if !super::export_ui::is_interactive() {
                return Err(eyre!("--client-id is required when not running in a terminal"));
            }
            output.info("Create an API application at https://trakt.tv/oauth/applications to get a client id.");
            let mut prompt = Input::<String>::new().with_prompt("Trakt Client ID");
            if config.is_trakt_configured() {
                prompt = prompt.default(config.trakt.client_id.clone());
            }
            prompt
                .interact_text()
                .map_err(|e| eyre!("Failed to read client id: {}", e))?
        }
    };

    let client_id = client_id.trim().to_string();
    if client_id.is_empty() {
        return Err(eyre!("Client id cannot be empty"));
    }
    config.trakt.client_id = client_id;

    if let Some(url) = api_url {
        config.trakt.api_url = url.trim().trim_end_matches('/').to_string();
    }

    config.validate().map_err(|e| eyre!("{}", e))?;
    save_config(&config, &config_file)?;

    output.success(format!("Trakt configuration saved to {}", config_file.display()));
    Ok(())
}

fn configure_export(
    output_dir: Option<PathBuf>,
    chunk_limit: Option<usize>,
    history_concurrency: Option<usize>,
    path_manager: &PathManager,
    output: &Output,
) -> Result<()> {
    if output_dir.is_none() && chunk_limit.is_none() && history_concurrency.is_none() {
        output.warn("No export option specified. Use --output-dir, --chunk-limit or --history-concurrency");
        return Ok(());
    }

    let config_file = path_manager.config_file();
    let mut config = load_file_config(&config_file)?;

    if let Some(dir) = output_dir {
        config.export.output_dir = Some(dir);
    }
    if let Some(limit) = chunk_limit {
        if limit == 0 {
            return Err(eyre!("--chunk-limit must be greater than zero"));
        }
        config.export.chunk_limit = limit;
    }
    if let Some(concurrency) = history_concurrency {
        if concurrency == 0 {
            return Err(eyre!("--history-concurrency must be greater than zero"));
        }
        config.export.history_concurrency = concurrency;
    }

    save_config(&config, &config_file)?;
    output.success(format!("Export configuration saved to {}", config_file.display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_CLIENT_ID" {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
