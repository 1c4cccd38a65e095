use crate::error::ExportError;
use futures::future::try_join_all;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use traktboxd_config::{ExportConfig, DEFAULT_CHUNK_LIMIT};
use traktboxd_models::MovieRecord;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Column names Letterboxd's importer recognises, in output order
pub const CSV_HEADER: [&str; 7] = [
    "imdbID",
    "tmdbID",
    "Title",
    "Year",
    "WatchedDate",
    "Rating10",
    "Rewatch",
];

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    pub path: PathBuf,
    /// `true` when the rows were split into chunks and bundled in a zip
    pub zipped: bool,
    pub rows: usize,
}

#[derive(Serialize)]
struct LetterboxdRow<'a> {
    imdb_id: Option<&'a str>,
    tmdb_id: Option<u32>,
    title: &'a str,
    year: Option<u32>,
    watched_date: String,
    rating10: Option<u8>,
    rewatch: bool,
}

impl<'a> From<&'a MovieRecord> for LetterboxdRow<'a> {
    fn from(record: &'a MovieRecord) -> Self {
        Self {
            imdb_id: record.imdb_id.as_deref(),
            tmdb_id: record.tmdb_id,
            title: &record.title,
            year: record.year,
            watched_date: record.watched_date_string(),
            rating10: record.rating10,
            rewatch: record.rewatch,
        }
    }
}

/// Render records as CSV: the fixed header followed by one row per record.
/// Missing values become empty fields.
pub fn serialize_records(records: &[MovieRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(LetterboxdRow::from(record))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

/// Writes records under `output_dir`, splitting anything above the chunk
/// limit into numbered files bundled in a single archive.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
    chunk_limit: usize,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            chunk_limit: DEFAULT_CHUNK_LIMIT,
        }
    }

    /// Exporter for the `[export]` settings. `default_dir` is used when no
    /// output directory is configured.
    pub fn from_config(config: &ExportConfig, default_dir: impl Into<PathBuf>) -> Self {
        let output_dir = config
            .output_dir
            .clone()
            .unwrap_or_else(|| default_dir.into());
        Self::new(output_dir).with_chunk_limit(config.chunk_limit)
    }

    pub fn with_chunk_limit(mut self, chunk_limit: usize) -> Self {
        self.chunk_limit = chunk_limit.max(1);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn chunk_limit(&self) -> usize {
        self.chunk_limit
    }

    fn csv_path(&self, base_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.csv", base_name))
    }

    fn chunk_path(&self, base_name: &str, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_{}.csv", base_name, index))
    }

    fn archive_path(&self, base_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.zip", base_name))
    }

    /// Write `<base>.csv`, or `<base>_1.csv`, `<base>_2.csv`, ... bundled as
    /// `<base>.zip` when there are more records than the chunk limit.
    ///
    /// Chunk files are removed once the archive exists. Nothing is returned
    /// until every write has finished; on failure, files written so far are
    /// removed.
    pub async fn export(
        &self,
        records: &[MovieRecord],
        base_name: &str,
    ) -> Result<ExportFile, ExportError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ExportError::filesystem(&self.output_dir, e))?;

        if records.len() <= self.chunk_limit {
            let path = write_file(self.csv_path(base_name), serialize_records(records)?).await?;
            info!("Exported {} records to {}", records.len(), path.display());
            return Ok(ExportFile {
                path,
                zipped: false,
                rows: records.len(),
            });
        }

        let chunks = records
            .chunks(self.chunk_limit)
            .enumerate()
            .map(|(i, chunk)| Ok((self.chunk_path(base_name, i + 1), serialize_records(chunk)?)))
            .collect::<Result<Vec<_>, ExportError>>()?;
        let chunk_paths: Vec<PathBuf> = chunks.iter().map(|(path, _)| path.clone()).collect();

        debug!(
            "Writing {} chunks of up to {} records for {}",
            chunks.len(),
            self.chunk_limit,
            base_name
        );

        let writes = chunks
            .into_iter()
            .map(|(path, bytes)| write_file(path, bytes));
        if let Err(e) = try_join_all(writes).await {
            remove_files(&chunk_paths).await;
            return Err(e);
        }

        let archive_path = self.archive_path(base_name);
        let archived = {
            let archive_path = archive_path.clone();
            let chunk_paths = chunk_paths.clone();
            tokio::task::spawn_blocking(move || write_archive(&archive_path, &chunk_paths)).await
        };
        let archived = archived.map_err(ExportError::from).and_then(|result| result);

        remove_files(&chunk_paths).await;
        if let Err(e) = archived {
            remove_files(std::slice::from_ref(&archive_path)).await;
            return Err(e);
        }

        info!(
            "Exported {} records in {} chunks to {}",
            records.len(),
            chunk_paths.len(),
            archive_path.display()
        );
        Ok(ExportFile {
            path: archive_path,
            zipped: true,
            rows: records.len(),
        })
    }
}

async fn write_file(path: PathBuf, bytes: Vec<u8>) -> Result<PathBuf, ExportError> {
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| ExportError::filesystem(&path, e))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

async fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}

/// Bundle `files` into a zip at `archive_path`, each stored under its file name.
fn write_archive(archive_path: &Path, files: &[PathBuf]) -> Result<(), ExportError> {
    let archive_error = |source| ExportError::Archive {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(archive_path)
        .map_err(|e| ExportError::filesystem(archive_path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let contents = std::fs::read(path).map_err(|e| ExportError::filesystem(path, e))?;

        zip.start_file(name, options).map_err(archive_error)?;
        zip.write_all(&contents)
            .map_err(|e| ExportError::filesystem(archive_path, e))?;
    }

    zip.finish().map_err(archive_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Read;
    use tempfile::TempDir;

    fn record(i: usize) -> MovieRecord {
        let mut record = MovieRecord::new(format!("Movie {}", i), Some(2000));
        record.imdb_id = Some(format!("tt{:07}", i));
        record.watched_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        record
    }

    fn records(n: usize) -> Vec<MovieRecord> {
        (1..=n).map(record).collect()
    }

    fn csv_rows(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_serialize_header_and_fields() {
        let mut rated = MovieRecord::new("Heat", Some(1995));
        rated.imdb_id = Some("tt0113277".to_string());
        rated.tmdb_id = Some(949);
        rated.watched_date = NaiveDate::from_ymd_opt(2019, 6, 1);
        rated.rating10 = Some(8);
        rated.rewatch = true;
        let bare = MovieRecord::new("Untitled, Part 2", None);

        let rows = csv_rows(&serialize_records(&[rated, bare]).unwrap());
        assert_eq!(rows[0], "imdbID,tmdbID,Title,Year,WatchedDate,Rating10,Rewatch");
        assert_eq!(rows[1], "tt0113277,949,Heat,1995,2019-06-01,8,true");
        // Missing values are empty fields, never "null"
        assert_eq!(rows[2], ",,\"Untitled, Part 2\",,,,false");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_serialize_empty_still_has_header() {
        let rows = csv_rows(&serialize_records(&[]).unwrap());
        assert_eq!(rows, vec![CSV_HEADER.join(",")]);
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let input = records(25);
        assert_eq!(
            serialize_records(&input).unwrap(),
            serialize_records(&input).unwrap()
        );
    }

    #[tokio::test]
    async fn test_export_at_limit_writes_single_file() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let input = records(DEFAULT_CHUNK_LIMIT);

        let file = exporter.export(&input, "trakt_alice").await.unwrap();

        assert!(!file.zipped);
        assert_eq!(file.rows, 1900);
        assert_eq!(file.path, dir.path().join("trakt_alice.csv"));
        assert_eq!(dir_entries(dir.path()), vec!["trakt_alice.csv"]);

        let written = std::fs::read(&file.path).unwrap();
        assert_eq!(written, serialize_records(&input).unwrap());
        assert_eq!(csv_rows(&written).len(), 1901);
    }

    #[tokio::test]
    async fn test_export_over_limit_builds_archive() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let input = records(DEFAULT_CHUNK_LIMIT + 1);

        let file = exporter.export(&input, "trakt_alice").await.unwrap();

        assert!(file.zipped);
        assert_eq!(file.rows, 1901);
        assert_eq!(file.path, dir.path().join("trakt_alice.zip"));
        // Chunks are intermediate, only the archive remains
        assert_eq!(dir_entries(dir.path()), vec!["trakt_alice.zip"]);

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&file.path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["trakt_alice_1.csv", "trakt_alice_2.csv"]);

        let mut first = String::new();
        archive
            .by_name("trakt_alice_1.csv")
            .unwrap()
            .read_to_string(&mut first)
            .unwrap();
        assert_eq!(first.as_bytes(), serialize_records(&input[..1900]).unwrap());

        let mut second = String::new();
        archive
            .by_name("trakt_alice_2.csv")
            .unwrap()
            .read_to_string(&mut second)
            .unwrap();
        let rows = csv_rows(second.as_bytes());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], CSV_HEADER.join(","));
        assert!(rows[1].starts_with("tt0001901,"));
    }

    #[tokio::test]
    async fn test_export_chunks_keep_input_order() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path()).with_chunk_limit(2);
        let input = records(5);

        let file = exporter.export(&input, "small").await.unwrap();
        assert!(file.zipped);

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&file.path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);

        let mut expected_chunks = input.chunks(2);
        for index in 1..=3 {
            let mut contents = String::new();
            archive
                .by_name(&format!("small_{}.csv", index))
                .unwrap()
                .read_to_string(&mut contents)
                .unwrap();
            let chunk = expected_chunks.next().unwrap();
            assert_eq!(contents.as_bytes(), serialize_records(chunk).unwrap());
        }
    }

    #[tokio::test]
    async fn test_export_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("exports").join("2024");
        let exporter = CsvExporter::new(&nested);

        let file = exporter.export(&records(1), "nested").await.unwrap();
        assert!(file.path.starts_with(&nested));
        assert!(file.path.exists());
    }

    #[tokio::test]
    async fn test_export_into_file_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let err = CsvExporter::new(&blocker)
            .export(&records(1), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Filesystem { .. }));
        assert_eq!(err.upstream_status(), None);
    }

    #[test]
    fn test_zero_chunk_limit_is_clamped() {
        let exporter = CsvExporter::new("/tmp").with_chunk_limit(0);
        assert_eq!(exporter.chunk_limit(), 1);
    }

    #[test]
    fn test_from_config_uses_export_settings() {
        let mut config = traktboxd_config::default_export_config();
        let exporter = CsvExporter::from_config(&config, "/data/exports");
        assert_eq!(exporter.output_dir(), Path::new("/data/exports"));
        assert_eq!(exporter.chunk_limit(), DEFAULT_CHUNK_LIMIT);

        config.output_dir = Some(PathBuf::from("/srv/letterboxd"));
        config.chunk_limit = 500;
        let exporter = CsvExporter::from_config(&config, "/data/exports");
        assert_eq!(exporter.output_dir(), Path::new("/srv/letterboxd"));
        assert_eq!(exporter.chunk_limit(), 500);
    }
}
