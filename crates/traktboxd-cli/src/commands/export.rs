use super::export_ui::ExportUI;
use crate::output::{Output, OutputFormat};
use chrono::NaiveDate;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::PathBuf;
use traktboxd_config::{Config, PathManager};
use traktboxd_core::{collect_movie_records, generate_export, CsvExporter, ExportError, CSV_HEADER};
use traktboxd_models::{DateRange, MovieRecord};
use traktboxd_sources::{SourceError, TraktClient};

pub struct ExportArgs {
    pub username: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub output_dir: Option<PathBuf>,
    pub chunk_limit: Option<usize>,
}

pub async fn run_export(
    args: ExportArgs,
    config: &Config,
    path_manager: &PathManager,
    output: &Output,
) -> Result<()> {
    let range = date_range(args.start_date, args.end_date)?;
    let client = trakt_client(config)?;

    let mut export_config = config.export.clone();
    if let Some(dir) = args.output_dir {
        export_config.output_dir = Some(dir);
    }
    if let Some(limit) = args.chunk_limit {
        if limit == 0 {
            return Err(eyre!("--chunk-limit must be greater than zero"));
        }
        export_config.chunk_limit = limit;
    }
    let exporter = CsvExporter::from_config(&export_config, path_manager.exports_dir());

    let ui = ExportUI::new(output.is_quiet());
    ui.set_message(format!("Fetching Trakt history for {}...", args.username));

    let result = generate_export(
        &client,
        &exporter,
        &args.username,
        &range,
        config.export.history_concurrency,
    )
    .await;
    ui.finish();

    let file = result.map_err(|e| {
        tracing::error!(user = %args.username, error = %e, "Export failed");
        eyre!("{}", describe_export_error(&e))
    })?;

    match output.format() {
        OutputFormat::Human => {
            output.success(format!(
                "Exported {} {} for {}",
                file.rows,
                if file.rows == 1 { "row" } else { "rows" },
                args.username.bright_cyan()
            ));
            if file.zipped {
                output.info(format!(
                    "More than {} rows; split into chunks and bundled into an archive",
                    exporter.chunk_limit()
                ));
            }
            output.info(format!("File: {}", file.path.display()));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "type": "export",
                "user": args.username,
                "path": file.path,
                "zipped": file.zipped,
                "rows": file.rows,
            }));
        }
    }

    Ok(())
}

pub async fn run_preview(
    username: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    limit: Option<usize>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let range = date_range(start_date, end_date)?;
    let client = trakt_client(config)?;

    let ui = ExportUI::new(output.is_quiet());
    ui.set_message(format!("Fetching Trakt history for {}...", username));
    let result =
        collect_movie_records(&client, &username, &range, config.export.history_concurrency).await;
    ui.finish();

    let records = result.map_err(|e| eyre!("{}", describe_source_error(&e)))?;
    let shown = &records[..limit.unwrap_or(records.len()).min(records.len())];

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if records.is_empty() {
                output.warn(format!("No viewings found for {}", username));
                return Ok(());
            }
            println!("{}", records_table(shown));
            if shown.len() < records.len() {
                output.info(format!("Showing {} of {} rows", shown.len(), records.len()));
            } else {
                output.info(format!("{} rows", records.len()));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "type": "preview",
                "user": username,
                "total": records.len(),
                "records": shown,
            }));
        }
    }

    Ok(())
}

/// Start after end would silently produce an empty history for every
/// rewatched movie, so it is rejected here.
fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<DateRange> {
    let range = DateRange::new(start, end);
    if let (true, Some(start), Some(end)) = (range.is_inverted(), start, end) {
        return Err(eyre!(
            "--start-date ({}) must not be after --end-date ({})",
            start,
            end
        ));
    }
    Ok(range)
}

fn trakt_client(config: &Config) -> Result<TraktClient> {
    config.validate().map_err(|e| eyre!("{}", e))?;
    Ok(TraktClient::new(
        config.trakt.client_id.clone(),
        config.trakt.api_url.clone(),
    ))
}

fn records_table(records: &[MovieRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(
        CSV_HEADER
            .iter()
            .map(|h| Cell::new(h).add_attribute(comfy_table::Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    for record in records {
        table.add_row(vec![
            Cell::new(record.imdb_id.as_deref().unwrap_or("")),
            Cell::new(record.tmdb_id.map(|id| id.to_string()).unwrap_or_default()),
            Cell::new(&record.title),
            Cell::new(record.year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(record.watched_date_string()),
            Cell::new(record.rating10.map(|r| r.to_string()).unwrap_or_default()),
            Cell::new(if record.rewatch { "✓" } else { "" }),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn describe_export_error(err: &ExportError) -> String {
    match err {
        ExportError::Source(e) => describe_source_error(e),
        other => format!("Export failed: {}", other),
    }
}

fn describe_source_error(err: &SourceError) -> String {
    match err.status().and_then(upstream_hint) {
        Some(hint) => format!("{} ({})", hint, err),
        None => format!("Trakt request failed: {}", err),
    }
}

/// User-facing explanation for the statuses Trakt commonly returns.
fn upstream_hint(status: u16) -> Option<&'static str> {
    match status {
        404 => Some("Please check username and try again. The profile must exist and be public."),
        400 | 401 | 403 => Some("Trakt rejected the request. Check the configured client id."),
        500 => Some("Trakt server error, please try again later."),
        503 | 504 | 520 | 521 | 522 => Some("Trakt is unavailable right now, please try again later."),
        _ => None,
    }
}
