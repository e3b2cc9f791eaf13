use thiserror::Error;

use crate::field::FieldKind;

/// Errors raised while turning a search request into SQL or running it.
///
/// Everything except [`SearchError::Db`] is a client input problem and is raised before
/// any statement reaches the store.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("unsupported field: {field}")]
    UnsupportedField { field: String },

    #[error("unsupported operator: {operator}")]
    UnsupportedOperator { operator: String },

    #[error("type mismatch on '{field}': expected {expected:?}, got {got}")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        got: &'static str,
    },

    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

pub type SearchResult<T> = Result<T, SearchError>;

impl SearchError {
    pub fn unsupported_field(field: impl Into<String>) -> Self {
        Self::UnsupportedField {
            field: field.into(),
        }
    }

    /// True for errors caused by the request rather than the store.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SearchError::Db(_))
    }
}

impl From<search_core::Error> for SearchError {
    fn from(e: search_core::Error) -> Self {
        match e {
            search_core::Error::UnsupportedOperator(operator) => {
                SearchError::UnsupportedOperator { operator }
            }
            other => SearchError::InvalidRequest(other.to_string()),
        }
    }
}
