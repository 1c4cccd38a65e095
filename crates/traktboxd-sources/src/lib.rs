pub mod error;
pub mod traits;
pub mod trakt;

pub use error::SourceError;
pub use traits::WatchSource;
pub use trakt::TraktClient;
