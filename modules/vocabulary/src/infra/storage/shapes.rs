//! Query shapes: for each resource the base projection, the fields clients may filter and
//! sort on, and the row type the projection decodes into.
//!
//! Joined tables get their own aliases so a joined `name` never resolves to the base
//! table's column of the same name.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, Expr, Func, JoinType, Query, SelectStatement};
use sea_orm::FromQueryResult;
use search_db::{FieldKind, FieldMap};
use uuid::Uuid;

use super::entity::{language, translation, user, word};
use crate::contract::{Language, LanguageView, Translation, User, Word, WordView};

const LANG: &str = "lang";
const LANG_TO: &str = "lang_to";
const OWNER: &str = "owner";
const WORD: &str = "word";

/* ---------- words ---------- */

pub fn word_fields() -> FieldMap {
    FieldMap::new()
        .insert("uuid", word::Column::ExternalId, FieldKind::Uuid)
        .insert("sentence", word::Column::Sentence, FieldKind::String)
        .insert("translation", word::Column::Translation, FieldKind::String)
        .insert("description", word::Column::Description, FieldKind::String)
        .insert_aliased("language", LANG, language::Column::Name, FieldKind::String)
        .insert_aliased("languageTo", LANG_TO, language::Column::Name, FieldKind::String)
}

/// Words with both language names; `owner` keeps only the words of the user with that
/// identity id, compared case-insensitively.
pub fn word_select(owner: Option<&str>) -> SelectStatement {
    let mut q = Query::select();
    q.expr_as(
        Expr::col((word::Entity, word::Column::ExternalId)),
        Alias::new("uuid"),
    )
    .column((word::Entity, word::Column::Sentence))
    .column((word::Entity, word::Column::Translation))
    .column((word::Entity, word::Column::Description))
    .expr_as(
        Expr::col((Alias::new(LANG), language::Column::Name)),
        Alias::new("language"),
    )
    .expr_as(
        Expr::col((Alias::new(LANG_TO), language::Column::Name)),
        Alias::new("language_to"),
    )
    .from(word::Entity)
    .join_as(
        JoinType::InnerJoin,
        language::Entity,
        Alias::new(LANG),
        Expr::col((Alias::new(LANG), language::Column::Id))
            .equals((word::Entity, word::Column::LanguageId)),
    )
    .join_as(
        JoinType::InnerJoin,
        language::Entity,
        Alias::new(LANG_TO),
        Expr::col((Alias::new(LANG_TO), language::Column::Id))
            .equals((word::Entity, word::Column::LanguageToId)),
    );

    if let Some(identity) = owner {
        q.join_as(
            JoinType::InnerJoin,
            user::Entity,
            Alias::new(OWNER),
            Expr::col((Alias::new(OWNER), user::Column::Id))
                .equals((word::Entity, word::Column::UserId)),
        )
        .and_where(
            Expr::expr(Func::lower(Expr::col((
                Alias::new(OWNER),
                user::Column::IdentityId,
            ))))
            .eq(identity.to_lowercase()),
        );
    }
    q
}

#[derive(Debug, FromQueryResult)]
pub struct WordRow {
    pub uuid: Uuid,
    pub sentence: String,
    pub translation: String,
    pub description: Option<String>,
    pub language: String,
    pub language_to: String,
}

impl From<WordRow> for Word {
    fn from(r: WordRow) -> Self {
        Word {
            uuid: r.uuid,
            sentence: r.sentence,
            translation: r.translation,
            description: r.description,
            language: r.language,
            language_to: r.language_to,
        }
    }
}

/* ---------- translations ---------- */

pub fn translation_fields() -> FieldMap {
    FieldMap::new()
        .insert("uuid", translation::Column::ExternalId, FieldKind::Uuid)
        .insert("content", translation::Column::Content, FieldKind::String)
        .insert("createdAt", translation::Column::CreatedAt, FieldKind::DateTimeUtc)
        .insert("updatedAt", translation::Column::UpdatedAt, FieldKind::DateTimeUtc)
        .insert_aliased("language.name", LANG, language::Column::Name, FieldKind::String)
        .insert_aliased("word.uuid", WORD, word::Column::ExternalId, FieldKind::Uuid)
        .insert_aliased("word.sentence", WORD, word::Column::Sentence, FieldKind::String)
}

/// Translations with their optional language and word.
pub fn translation_select() -> SelectStatement {
    Query::select()
        .expr_as(
            Expr::col((translation::Entity, translation::Column::ExternalId)),
            Alias::new("uuid"),
        )
        .column((translation::Entity, translation::Column::Content))
        .column((translation::Entity, translation::Column::CreatedAt))
        .column((translation::Entity, translation::Column::UpdatedAt))
        .expr_as(
            Expr::col((Alias::new(LANG), language::Column::ExternalId)),
            Alias::new("language_uuid"),
        )
        .expr_as(
            Expr::col((Alias::new(LANG), language::Column::Name)),
            Alias::new("language_name"),
        )
        .expr_as(
            Expr::col((Alias::new(WORD), word::Column::ExternalId)),
            Alias::new("word_uuid"),
        )
        .expr_as(
            Expr::col((Alias::new(WORD), word::Column::Sentence)),
            Alias::new("word_sentence"),
        )
        .from(translation::Entity)
        .join_as(
            JoinType::LeftJoin,
            language::Entity,
            Alias::new(LANG),
            Expr::col((Alias::new(LANG), language::Column::Id))
                .equals((translation::Entity, translation::Column::LanguageId)),
        )
        .join_as(
            JoinType::LeftJoin,
            word::Entity,
            Alias::new(WORD),
            Expr::col((Alias::new(WORD), word::Column::Id))
                .equals((translation::Entity, translation::Column::WordId)),
        )
        .to_owned()
}

#[derive(Debug, FromQueryResult)]
pub struct TranslationRow {
    pub uuid: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub language_uuid: Option<Uuid>,
    pub language_name: Option<String>,
    pub word_uuid: Option<Uuid>,
    pub word_sentence: Option<String>,
}

impl From<TranslationRow> for Translation {
    fn from(r: TranslationRow) -> Self {
        let language = match (r.language_uuid, r.language_name) {
            (Some(uuid), Some(name)) => Some(LanguageView { uuid, name }),
            _ => None,
        };
        let word = match (r.word_uuid, r.word_sentence) {
            (Some(uuid), Some(sentence)) => Some(WordView { uuid, sentence }),
            _ => None,
        };
        Translation {
            uuid: r.uuid,
            content: r.content,
            language,
            word,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/* ---------- languages ---------- */

pub fn language_fields() -> FieldMap {
    FieldMap::new()
        .insert("uuid", language::Column::ExternalId, FieldKind::Uuid)
        .insert("name", language::Column::Name, FieldKind::String)
        .insert("nativeName", language::Column::NativeName, FieldKind::String)
}

pub fn language_select() -> SelectStatement {
    Query::select()
        .expr_as(
            Expr::col((language::Entity, language::Column::ExternalId)),
            Alias::new("uuid"),
        )
        .column((language::Entity, language::Column::Name))
        .column((language::Entity, language::Column::NativeName))
        .from(language::Entity)
        .to_owned()
}

#[derive(Debug, FromQueryResult)]
pub struct LanguageRow {
    pub uuid: Uuid,
    pub name: String,
    pub native_name: String,
}

impl From<LanguageRow> for Language {
    fn from(r: LanguageRow) -> Self {
        Language {
            uuid: r.uuid,
            name: r.name,
            native_name: r.native_name,
        }
    }
}

/* ---------- users ---------- */

pub fn user_fields() -> FieldMap {
    FieldMap::new()
        .insert("uuid", user::Column::ExternalId, FieldKind::Uuid)
        .insert("username", user::Column::Username, FieldKind::String)
        .insert("email", user::Column::Email, FieldKind::String)
}

/// The identity id stays out of the projection.
pub fn user_select() -> SelectStatement {
    Query::select()
        .expr_as(
            Expr::col((user::Entity, user::Column::ExternalId)),
            Alias::new("uuid"),
        )
        .column((user::Entity, user::Column::Username))
        .column((user::Entity, user::Column::Email))
        .from(user::Entity)
        .to_owned()
}

#[derive(Debug, FromQueryResult)]
pub struct UserRow {
    pub uuid: Uuid,
    pub username: String,
    pub email: String,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            uuid: r.uuid,
            username: r.username,
            email: r.email,
        }
    }
}
