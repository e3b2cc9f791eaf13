//! SeaORM-backed implementation of [`VocabularyRepository`].
//!
//! Generic over `C: ConnectionTrait`, so it runs on a `DatabaseConnection` or inside a
//! transaction.

use sea_orm::sea_query::SelectStatement;
use sea_orm::{ConnectionTrait, FromQueryResult};
use search_core::{PageResult, SearchParams, SortDir};
use search_db::{find_page_as, FieldMap, FieldPolicy, PageLimits, PageOptions, Resolvers};

use super::shapes::{self, LanguageRow, TranslationRow, UserRow, WordRow};
use crate::contract::{Language, Translation, User, VocabularyError, Word};
use crate::domain::repo::VocabularyRepository;

/// Every shape exposes it; appended to the sort so pages never overlap.
const TIEBREAKER: &str = "uuid";

pub struct SeaOrmVocabularyRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
    options: PageOptions,
    policy: FieldPolicy,
}

impl<C> SeaOrmVocabularyRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            options: PageOptions::default().with_limits(PageLimits::default()),
            policy: FieldPolicy::Reject,
        }
    }

    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.options = self.options.with_limits(limits);
        self
    }

    /// Drop unknown filter and sort fields instead of rejecting the request.
    pub fn lenient(mut self) -> Self {
        self.policy = FieldPolicy::Ignore;
        self
    }

    pub fn conn(&self) -> &C {
        &self.conn
    }

    async fn search<R, T>(
        &self,
        base: SelectStatement,
        fields: &FieldMap,
        params: &SearchParams,
    ) -> Result<PageResult<T>, VocabularyError>
    where
        R: FromQueryResult + Into<T>,
    {
        let mut params = params.clone();
        params.sort = params.sort.ensure_tiebreaker(TIEBREAKER, SortDir::Asc);

        let resolvers = Resolvers::same(fields).with_policy(self.policy);
        let page = find_page_as::<C, R>(&self.conn, base, &params, resolvers, self.options).await?;
        Ok(page.map_items(Into::into))
    }
}

#[async_trait::async_trait]
impl<C> VocabularyRepository for SeaOrmVocabularyRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_words(
        &self,
        params: &SearchParams,
        owner: Option<&str>,
    ) -> Result<PageResult<Word>, VocabularyError> {
        tracing::debug!(owner = ?owner, "find words");
        let fields = shapes::word_fields();
        self.search::<WordRow, _>(shapes::word_select(owner), &fields, params)
            .await
    }

    async fn find_translations(
        &self,
        params: &SearchParams,
    ) -> Result<PageResult<Translation>, VocabularyError> {
        let fields = shapes::translation_fields();
        self.search::<TranslationRow, _>(shapes::translation_select(), &fields, params)
            .await
    }

    async fn find_languages(
        &self,
        params: &SearchParams,
    ) -> Result<PageResult<Language>, VocabularyError> {
        let fields = shapes::language_fields();
        self.search::<LanguageRow, _>(shapes::language_select(), &fields, params)
            .await
    }

    async fn find_users(
        &self,
        params: &SearchParams,
    ) -> Result<PageResult<User>, VocabularyError> {
        let fields = shapes::user_fields();
        self.search::<UserRow, _>(shapes::user_select(), &fields, params)
            .await
    }
}
