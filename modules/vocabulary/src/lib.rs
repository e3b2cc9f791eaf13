//! Vocabulary resources (words, translations, languages, users) with client-driven
//! filtering, sorting and paging on top of `search-db`.

pub mod contract;
pub mod domain;
pub mod infra;

pub use contract::{
    Language, LanguageView, Translation, User, VocabularyError, Word, WordView,
};
pub use domain::repo::VocabularyRepository;
pub use infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmVocabularyRepository};
