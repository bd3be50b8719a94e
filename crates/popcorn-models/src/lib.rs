pub mod error;
pub mod movie;
pub mod rating;
pub mod summary;
pub mod watched;

pub use error::ModelError;
pub use movie::{parse_runtime_minutes, MovieDetail, MovieSummary};
pub use rating::UserRating;
pub use summary::WatchedSummary;
pub use watched::WatchedEntry;
