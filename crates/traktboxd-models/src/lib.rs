pub mod date_range;
pub mod movie_ids;
pub mod movie_record;
pub mod rating;
pub mod watch_history;
pub mod watched;

pub use date_range::DateRange;
pub use movie_ids::MovieIds;
pub use movie_record::MovieRecord;
pub use rating::MovieRating;
pub use watch_history::{HistoryAction, HistoryEntry};
pub use watched::WatchedMovie;
