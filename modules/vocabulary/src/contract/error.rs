use search_db::SearchError;
use thiserror::Error;

/// Errors that are safe to show to callers of the repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    /// The filter, sort or page of the request cannot be served.
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl VocabularyError {
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<SearchError> for VocabularyError {
    fn from(e: SearchError) -> Self {
        if e.is_client_error() {
            Self::invalid_query(e.to_string())
        } else {
            tracing::error!(error = %e, "search failed");
            Self::database(e.to_string())
        }
    }
}

impl From<sea_orm::DbErr> for VocabularyError {
    fn from(e: sea_orm::DbErr) -> Self {
        SearchError::from(e).into()
    }
}
