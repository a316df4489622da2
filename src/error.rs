use crate::value::ValuerError;

/// Error types for sqlx-params
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The query contains more `?` placeholders than arguments were supplied
    #[error("number of placeholders exceeds the number of arguments")]
    NotEnoughArguments,

    /// Arguments were left over after every `?` placeholder was consumed
    #[error("number of placeholders is less than the number of arguments")]
    TooManyArguments,

    /// A list argument with zero elements was passed to an `IN` expansion
    #[error("empty list passed to an IN expansion")]
    EmptyList,

    /// A self-describing value failed to produce its underlying value
    #[error(transparent)]
    Valuer(#[from] ValuerError),

    /// The value kind has no parameter representation for the driver
    #[error("cannot bind a {0} value as a query parameter")]
    Unbindable(&'static str),

    /// Error from SQLx database operations
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for sqlx-params operations
pub type Result<T> = std::result::Result<T, Error>;
