//! Row inserts used to load demo data and to build test fixtures.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};
use uuid::Uuid;

use super::entity::{language, translation, user, word};

pub async fn insert_language<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    native_name: &str,
) -> Result<language::Model, DbErr> {
    language::ActiveModel {
        external_id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        native_name: Set(native_name.to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    email: &str,
    identity_id: &str,
) -> Result<user::Model, DbErr> {
    user::ActiveModel {
        external_id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        identity_id: Set(identity_id.to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

#[derive(Debug, Clone)]
pub struct NewWord<'a> {
    pub sentence: &'a str,
    pub translation: &'a str,
    pub description: Option<&'a str>,
    pub language_id: i32,
    pub language_to_id: i32,
    pub user_id: i32,
}

pub async fn insert_word<C: ConnectionTrait>(
    conn: &C,
    new: NewWord<'_>,
) -> Result<word::Model, DbErr> {
    word::ActiveModel {
        external_id: Set(Uuid::new_v4()),
        sentence: Set(new.sentence.to_string()),
        translation: Set(new.translation.to_string()),
        description: Set(new.description.map(str::to_string)),
        language_id: Set(new.language_id),
        language_to_id: Set(new.language_to_id),
        user_id: Set(new.user_id),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub async fn insert_translation<C: ConnectionTrait>(
    conn: &C,
    content: &str,
    language_id: Option<i32>,
    word_id: Option<i32>,
    created_at: DateTime<Utc>,
) -> Result<translation::Model, DbErr> {
    translation::ActiveModel {
        external_id: Set(Uuid::new_v4()),
        content: Set(content.to_string()),
        language_id: Set(language_id),
        word_id: Set(word_id),
        created_at: Set(created_at),
        updated_at: Set(None),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// A small data set: four languages, two users and a handful of words and translations.
pub async fn load_demo<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let english = insert_language(conn, "English", "English").await?;
    let italian = insert_language(conn, "Italian", "Italiano").await?;
    let german = insert_language(conn, "German", "Deutsch").await?;
    insert_language(conn, "Spanish", "Español").await?;

    let anna = insert_user(conn, "anna", "anna@example.com", "a7f3c2d1-anna").await?;
    let marco = insert_user(conn, "marco", "marco@example.com", "b81e44aa-marco").await?;

    let words = [
        ("the cat sleeps", "il gatto dorme", italian.id, &anna),
        ("good morning", "buongiorno", italian.id, &anna),
        ("thank you", "danke", german.id, &anna),
        ("tomcat", "Kater", german.id, &marco),
        ("see you later", "a dopo", italian.id, &marco),
    ];
    let now = Utc::now();
    for (sentence, translated, to, owner) in words {
        let w = insert_word(
            conn,
            NewWord {
                sentence,
                translation: translated,
                description: None,
                language_id: english.id,
                language_to_id: to,
                user_id: owner.id,
            },
        )
        .await?;
        insert_translation(conn, translated, Some(to), Some(w.id), now).await?;
    }
    tracing::info!("demo data loaded");
    Ok(())
}
