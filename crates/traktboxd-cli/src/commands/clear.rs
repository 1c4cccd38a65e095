use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;
use std::path::{Path, PathBuf};
use traktboxd_config::{Config, PathManager};

pub async fn run_clear(exports: bool, config: &Config, path_manager: &PathManager, output: &Output) -> Result<()> {
    if !exports {
        output.warn("No clear option specified. Use --exports");
        output.info("\nExample: traktboxd clear --exports");
        return Ok(());
    }

    let exports_dir = config
        .export
        .output_dir
        .clone()
        .unwrap_or_else(|| path_manager.exports_dir());
    clear_exports(&exports_dir, output)
}

fn clear_exports(exports_dir: &Path, output: &Output) -> Result<()> {
    if !exports_dir.exists() {
        output.info("No exports found to clear");
        return Ok(());
    }

    let removed = remove_generated_files(exports_dir)?;
    if removed.is_empty() {
        output.info(format!("No exports found in {}", exports_dir.display()));
    } else {
        tracing::info!(count = removed.len(), dir = %exports_dir.display(), "Removed export files");
        output.success(format!(
            "Removed {} export file(s) from {}",
            removed.len(),
            exports_dir.display()
        ));
    }
    Ok(())
}

/// Only files this tool produced are touched; a user-chosen output
/// directory may hold anything else.
fn remove_generated_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| eyre!("Failed to read export directory {}: {}", dir.display(), e))?;

    let mut removed = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| eyre!("Failed to read export directory {}: {}", dir.display(), e))?
            .path();
        if !path.is_file() || !is_generated_export(&path) {
            continue;
        }
        fs::remove_file(&path).map_err(|e| eyre!("Failed to remove {}: {}", path.display(), e))?;
        removed.push(path);
    }
    Ok(removed)
}

fn is_generated_export(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };
    name.starts_with("trakt_") && (name.ends_with(".csv") || name.ends_with(".zip"))
}
