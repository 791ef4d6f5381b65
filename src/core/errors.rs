use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnkipeekError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("Unreadable archive: {0}")]
    ArchiveCorrupt(Box<zip::result::ZipError>),

    #[error("Not a SQLite database image: {0}")]
    InvalidDatabaseImage(String),

    #[error("SQL error: {0}")]
    Sql(Box<rusqlite::Error>),

    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    #[error("Note references model id {0} absent from the collection schema")]
    UnknownModelReference(i64),

    #[error("Archive member not found: {0}")]
    MissingMember(String),

    #[error("HTTP error: {0}")]
    Http(Box<reqwest::Error>),

    #[error("AnkipeekError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for AnkipeekError {
    fn from(error: std::io::Error) -> Self {
        AnkipeekError::Io(Box::new(error))
    }
}

impl From<zip::result::ZipError> for AnkipeekError {
    fn from(error: zip::result::ZipError) -> Self {
        AnkipeekError::ArchiveCorrupt(Box::new(error))
    }
}

impl From<rusqlite::Error> for AnkipeekError {
    fn from(error: rusqlite::Error) -> Self {
        AnkipeekError::Sql(Box::new(error))
    }
}

impl From<serde_json::Error> for AnkipeekError {
    fn from(error: serde_json::Error) -> Self {
        AnkipeekError::SchemaParse(error.to_string())
    }
}

impl From<reqwest::Error> for AnkipeekError {
    fn from(error: reqwest::Error) -> Self {
        AnkipeekError::Http(Box::new(error))
    }
}
