use async_trait::async_trait;
use search_core::{PageResult, SearchParams};

use crate::contract::{Language, Translation, User, Word, VocabularyError};

/// Read side of the vocabulary store. Every operation filters, sorts and pages in a single
/// statement; unknown fields and malformed values come back as
/// [`VocabularyError::InvalidQuery`].
#[async_trait]
pub trait VocabularyRepository: Send + Sync {
    /// Words of the user whose identity id matches `owner` (case-insensitive), or of all
    /// users when `owner` is `None`.
    async fn find_words(
        &self,
        params: &SearchParams,
        owner: Option<&str>,
    ) -> Result<PageResult<Word>, VocabularyError>;

    async fn find_translations(
        &self,
        params: &SearchParams,
    ) -> Result<PageResult<Translation>, VocabularyError>;

    async fn find_languages(
        &self,
        params: &SearchParams,
    ) -> Result<PageResult<Language>, VocabularyError>;

    async fn find_users(&self, params: &SearchParams)
        -> Result<PageResult<User>, VocabularyError>;
}
