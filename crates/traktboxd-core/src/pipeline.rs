use crate::error::ExportError;
use crate::export::{CsvExporter, ExportFile};
use crate::reconcile::collect_movie_records;
use chrono::{DateTime, Utc};
use tracing::info;
use traktboxd_models::DateRange;
use traktboxd_sources::WatchSource;

/// File name stem for one export: `trakt_<user>_<yyyyMMddHHmmssSSS>`.
/// Anything outside `[A-Za-z0-9_-]` in the user id becomes `_`.
pub fn export_base_name(user: &str, at: DateTime<Utc>) -> String {
    let user: String = user
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("trakt_{}_{}", user, at.format("%Y%m%d%H%M%S%3f"))
}

/// Fetch, reconcile and write one user's history.
///
/// Fails with the first upstream or filesystem error; no file path is
/// handed back unless every stage succeeded.
pub async fn generate_export<S>(
    source: &S,
    exporter: &CsvExporter,
    user: &str,
    range: &DateRange,
    history_concurrency: usize,
) -> Result<ExportFile, ExportError>
where
    S: WatchSource + ?Sized,
{
    info!(
        "Starting export: user={}, source={}, start={:?}, end={:?}",
        user,
        source.source_name(),
        range.start,
        range.end
    );

    let records = collect_movie_records(source, user, range, history_concurrency).await?;
    let base_name = export_base_name(user, Utc::now());
    exporter.export(&records, &base_name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{rating, viewing, watched, FakeSource};
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_export_base_name() {
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 13, 5, 9).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(export_base_name("alice", at), "trakt_alice_20240229130509042");
        assert_eq!(
            export_base_name("../john doe", at),
            "trakt____john_doe_20240229130509042"
        );
    }

    #[tokio::test]
    async fn test_generate_export_writes_csv() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path());
        let mut source = FakeSource::default();
        source.watched = vec![
            watched(1, "Movie A", 1, (2020, 1, 5)),
            watched(2, "Movie B", 2, (2021, 3, 10)),
        ];
        source.ratings = vec![rating(2, 8)];
        source
            .history
            .insert(2, vec![viewing(10, 2019, 6, 1), viewing(11, 2021, 3, 10)]);

        let file = generate_export(&source, &exporter, "alice", &DateRange::unbounded(), 4)
            .await
            .unwrap();

        assert!(!file.zipped);
        assert_eq!(file.rows, 3);
        let name = file.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("trakt_alice_"));
        assert!(name.ends_with(".csv"));

        let contents = std::fs::read_to_string(&file.path).unwrap();
        let rows: Vec<&str> = contents.lines().collect();
        assert_eq!(
            rows,
            vec![
                "imdbID,tmdbID,Title,Year,WatchedDate,Rating10,Rewatch",
                "tt0000001,1001,Movie A,2000,2020-01-05,,false",
                "tt0000002,1002,Movie B,2000,2019-06-01,8,true",
                "tt0000002,1002,Movie B,2000,2021-03-10,8,false",
            ]
        );
    }

    #[tokio::test]
    async fn test_generate_export_ratings_404_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path().join("out"));
        let mut source = FakeSource::default();
        source.watched = vec![watched(1, "Movie A", 1, (2020, 1, 5))];
        source.ratings_failure = Some(404);

        let err = generate_export(&source, &exporter, "ghost", &DateRange::unbounded(), 4)
            .await
            .unwrap_err();

        assert_eq!(err.upstream_status(), Some(404));
        assert!(matches!(err, ExportError::Source(_)));
        assert!(!dir.path().join("out").exists());
    }
}
