//! Repository tests against a fresh in-memory SQLite database per test, with migrations
//! applied and either the demo data set or a hand-built one loaded.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use search_core::{
    FilterCondition, FilterExpression, OperatorKind, PageRequest, SearchParams, SortKey, SortSpec,
};
use search_db::{connect, ConnectOpts, PageLimits};

use vocabulary::infra::storage::seed::{
    insert_language, insert_translation, insert_user, insert_word, load_demo, NewWord,
};
use vocabulary::{Migrator, SeaOrmVocabularyRepository, VocabularyError, VocabularyRepository};

async fn create_test_db() -> Result<DatabaseConnection> {
    let db = connect("sqlite::memory:", &ConnectOpts::default()).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

async fn demo_repo() -> Result<SeaOrmVocabularyRepository<DatabaseConnection>> {
    let db = create_test_db().await?;
    load_demo(&db).await?;
    Ok(SeaOrmVocabularyRepository::new(db))
}

fn sorted_by(field: &str) -> SearchParams {
    SearchParams::new().with_sort(SortSpec(vec![SortKey::asc(field)]))
}

fn sentences(page: &search_core::PageResult<vocabulary::Word>) -> Vec<&str> {
    page.items.iter().map(|w| w.sentence.as_str()).collect()
}

#[tokio::test]
async fn words_are_scoped_to_their_owner() -> Result<()> {
    let repo = demo_repo().await?;
    let params = sorted_by("sentence");

    let anna = repo.find_words(&params, Some("A7F3C2D1-ANNA")).await?;
    assert_eq!(
        sentences(&anna),
        ["good morning", "thank you", "the cat sleeps"]
    );

    let marco = repo.find_words(&params, Some("b81e44aa-marco")).await?;
    assert_eq!(marco.total_elements, 2);

    let nobody = repo.find_words(&params, Some("unknown")).await?;
    assert!(nobody.is_empty());

    let everyone = repo.find_words(&params, None).await?;
    assert_eq!(everyone.total_elements, 5);
    Ok(())
}

#[tokio::test]
async fn words_filter_on_joined_language_names() -> Result<()> {
    let repo = demo_repo().await?;
    let params = sorted_by("sentence").with_filter(FilterExpression::all([
        FilterCondition::new("language", OperatorKind::Eq, "English"),
        FilterCondition::new("languageTo", OperatorKind::Eq, "Italian"),
    ]));

    let page = repo.find_words(&params, None).await?;
    assert_eq!(
        sentences(&page),
        ["good morning", "see you later", "the cat sleeps"]
    );
    assert!(page
        .items
        .iter()
        .all(|w| w.language == "English" && w.language_to == "Italian"));
    Ok(())
}

#[tokio::test]
async fn words_contains_ignore_case() -> Result<()> {
    let repo = demo_repo().await?;
    let params = sorted_by("sentence").with_filter(FilterExpression::all([
        FilterCondition::new("sentence", OperatorKind::ContainsIgnoreCase, "CAT"),
    ]));

    let page = repo.find_words(&params, None).await?;
    assert_eq!(sentences(&page), ["the cat sleeps", "tomcat"]);
    Ok(())
}

#[tokio::test]
async fn words_sort_by_target_language_then_sentence() -> Result<()> {
    let repo = demo_repo().await?;
    let params = SearchParams::new().with_sort(SortSpec(vec![
        SortKey::desc("languageTo"),
        SortKey::asc("sentence"),
    ]));

    let page = repo.find_words(&params, None).await?;
    assert_eq!(
        sentences(&page),
        [
            "good morning",
            "see you later",
            "the cat sleeps",
            "thank you",
            "tomcat"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn word_by_uuid() -> Result<()> {
    let repo = demo_repo().await?;
    let all = repo.find_words(&sorted_by("sentence"), None).await?;
    let target = all.items[1].clone();

    let params = SearchParams::new().with_filter(FilterExpression::all([FilterCondition::new(
        "uuid",
        OperatorKind::Eq,
        target.uuid.to_string(),
    )]));
    let page = repo.find_words(&params, None).await?;
    assert_eq!(page.items, [target]);

    // not a uuid: matches nothing rather than failing
    let params = SearchParams::new().with_filter(FilterExpression::all([FilterCondition::new(
        "uuid",
        OperatorKind::Eq,
        "not-a-uuid",
    )]));
    assert!(repo.find_words(&params, None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn words_page_through_all_rows() -> Result<()> {
    let repo = demo_repo().await?;
    let mut request = PageRequest::new(2, 0)?;
    let mut seen = Vec::new();
    loop {
        let page = repo
            .find_words(&sorted_by("sentence").with_page(request), None)
            .await?;
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.page_index, request.page_index());
        seen.extend(page.items.iter().map(|w| w.sentence.clone()));
        if page.is_last_page {
            break;
        }
        request = request.next();
    }
    assert_eq!(
        seen,
        [
            "good morning",
            "see you later",
            "thank you",
            "the cat sleeps",
            "tomcat"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn unknown_field_is_an_invalid_query() -> Result<()> {
    let repo = demo_repo().await?;
    let params = SearchParams::new().with_filter(FilterExpression::all([FilterCondition::new(
        "user_id",
        OperatorKind::Eq,
        1,
    )]));

    let err = repo.find_words(&params, None).await.unwrap_err();
    assert!(matches!(
        &err,
        VocabularyError::InvalidQuery { message } if message.contains("user_id")
    ));

    let sort = SearchParams::new().with_sort(SortSpec(vec![SortKey::asc("identity_id")]));
    let err = repo.find_users(&sort).await.unwrap_err();
    assert!(matches!(err, VocabularyError::InvalidQuery { .. }));
    Ok(())
}

#[tokio::test]
async fn lenient_repository_drops_unknown_fields() -> Result<()> {
    let db = create_test_db().await?;
    load_demo(&db).await?;
    let repo = SeaOrmVocabularyRepository::new(db).lenient();

    let params = SearchParams::new()
        .with_filter(FilterExpression::all([
            FilterCondition::new("user_id", OperatorKind::Eq, 1),
            FilterCondition::new("sentence", OperatorKind::StartsWith, "t"),
        ]))
        .with_sort(SortSpec(vec![SortKey::desc("secret"), SortKey::asc("sentence")]));
    let page = repo.find_words(&params, None).await?;
    assert_eq!(
        sentences(&page),
        ["thank you", "the cat sleeps", "tomcat"]
    );
    Ok(())
}

#[tokio::test]
async fn page_size_is_capped() -> Result<()> {
    let db = create_test_db().await?;
    load_demo(&db).await?;
    let repo = SeaOrmVocabularyRepository::new(db).with_limits(PageLimits {
        default_size: 2,
        max_size: Some(3),
    });

    let page = repo
        .find_languages(&sorted_by("name").with_page(PageRequest::new(500, 0)?))
        .await?;
    assert_eq!(page.page_size, 3);
    assert_eq!(page.len(), 3);
    assert_eq!(page.total_elements, 4);
    assert_eq!(page.total_pages, 2);
    assert!(!page.is_last_page);
    Ok(())
}

#[tokio::test]
async fn languages_second_page() -> Result<()> {
    let repo = demo_repo().await?;
    let page = repo
        .find_languages(&sorted_by("nativeName").with_page(PageRequest::new(3, 3)?))
        .await?;

    assert_eq!(page.len(), 1);
    assert_eq!(page.items[0].native_name, "Italiano");
    assert_eq!(page.page_index, 1);
    assert!(page.is_last_page);
    Ok(())
}

#[tokio::test]
async fn users_hide_identity_and_filter_by_email() -> Result<()> {
    let repo = demo_repo().await?;
    let params = SearchParams::new().with_filter(FilterExpression::all([FilterCondition::new(
        "email",
        OperatorKind::StartsWith,
        "marco@",
    )]));

    let page = repo.find_users(&params).await?;
    assert_eq!(page.len(), 1);
    assert_eq!(page.items[0].username, "marco");

    let json = serde_json::to_value(&page.items[0])?;
    assert!(json.get("identity_id").is_none());
    Ok(())
}

#[tokio::test]
async fn translations_nest_language_and_word() -> Result<()> {
    let db = create_test_db().await?;
    let english = insert_language(&db, "English", "English").await?;
    let italian = insert_language(&db, "Italian", "Italiano").await?;
    let user = insert_user(&db, "anna", "anna@example.com", "anna-id").await?;
    let word = insert_word(
        &db,
        NewWord {
            sentence: "house",
            translation: "casa",
            description: Some("a building"),
            language_id: english.id,
            language_to_id: italian.id,
            user_id: user.id,
        },
    )
    .await?;

    let jan = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
    let feb = Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap();
    let mar = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    insert_translation(&db, "casa", Some(italian.id), Some(word.id), jan).await?;
    insert_translation(&db, "home", Some(english.id), None, feb).await?;
    insert_translation(&db, "orphan", None, None, mar).await?;

    let repo = SeaOrmVocabularyRepository::new(db);

    // sorted by the joined language name; the orphan has none
    let params = SearchParams::new()
        .with_filter(FilterExpression::all([FilterCondition::new(
            "createdAt",
            OperatorKind::Lt,
            "2024-03-01T00:00:00Z",
        )]))
        .with_sort(SortSpec(vec![SortKey::asc("language.name")]));
    let page = repo.find_translations(&params).await?;
    let contents: Vec<_> = page.items.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, ["home", "casa"]);

    let casa = &page.items[1];
    assert_eq!(casa.language.as_ref().unwrap().name, "Italian");
    assert_eq!(casa.word.as_ref().unwrap().sentence, "house");
    assert_eq!(casa.word.as_ref().unwrap().uuid, word.external_id);
    assert_eq!(casa.created_at, jan);
    assert!(page.items[0].word.is_none());

    let by_word = SearchParams::new().with_filter(FilterExpression::all([FilterCondition::new(
        "word.uuid",
        OperatorKind::Eq,
        word.external_id.to_string(),
    )]));
    assert_eq!(repo.find_translations(&by_word).await?.len(), 1);

    let orphan = SearchParams::new().with_filter(FilterExpression::all([FilterCondition::new(
        "createdAt",
        OperatorKind::Ge,
        "2024-03-01 00:00:00",
    )]));
    let page = repo.find_translations(&orphan).await?;
    assert_eq!(page.len(), 1);
    assert!(page.items[0].language.is_none());
    assert!(page.items[0].word.is_none());
    Ok(())
}

#[tokio::test]
async fn bad_date_is_an_invalid_query() -> Result<()> {
    let repo = demo_repo().await?;
    let params = SearchParams::new().with_filter(FilterExpression::all([FilterCondition::new(
        "createdAt",
        OperatorKind::Gt,
        "yesterday",
    )]));
    let err = repo.find_translations(&params).await.unwrap_err();
    assert!(matches!(err, VocabularyError::InvalidQuery { .. }));
    Ok(())
}
