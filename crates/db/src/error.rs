/// Errors produced by a [`Store`](crate::Store) implementation.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A database error from sqlx.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// The backing store cannot serve requests right now.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type DbResult<T> = Result<T, DbError>;
