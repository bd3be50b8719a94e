pub mod error;
pub mod omdb;
pub mod traits;

pub use error::SourceError;
pub use omdb::OmdbClient;
pub use traits::MovieSearchClient;
