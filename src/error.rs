use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache database error: {0}")]
    Redb(#[from] redb::Error),

    #[error("cache database open error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("cache storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("cache transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("cache table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("cache commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),
}
