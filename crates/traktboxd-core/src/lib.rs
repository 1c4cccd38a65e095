pub mod error;
pub mod export;
pub mod pipeline;
pub mod reconcile;

pub use error::ExportError;
pub use export::{serialize_records, CsvExporter, ExportFile, CSV_HEADER};
pub use pipeline::{export_base_name, generate_export};
pub use reconcile::{collect_movie_records, expand_viewings};

#[cfg(test)]
mod test_support;
