use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("runtime {0:?} does not start with a number of minutes")]
    InvalidRuntime(String),

    #[error("rating {0} is outside 1-10")]
    RatingOutOfRange(u8),
}
