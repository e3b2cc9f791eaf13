use super::*;
use crate::field::{FieldKind, FieldMap};
use sea_orm::sea_query::{
    MysqlQueryBuilder, PostgresQueryBuilder, QueryStatementWriter, SqliteQueryBuilder,
};
use search_core::{SortKey, SortSpec};

fn base() -> (SelectStatement, Vec<SortDirective>) {
    let fields = FieldMap::new()
        .insert_aliased("name", "w", Alias::new("name"), FieldKind::String)
        .insert_aliased("id", "w", Alias::new("id"), FieldKind::I64);
    let sort = build_sort(
        &SortSpec(vec![SortKey::desc("name"), SortKey::asc("id")]),
        &fields,
        crate::field::FieldPolicy::Reject,
    )
    .unwrap();

    let mut select = Query::select();
    select
        .column((Alias::new("w"), Alias::new("id")))
        .column((Alias::new("w"), Alias::new("name")))
        .from_as(Alias::new("words"), Alias::new("w"));
    compose(&mut select, sea_orm::sea_query::Condition::all(), &sort);
    (select, sort)
}

#[test]
fn builds_three_layers() {
    let (select, sort) = base();
    let page = PageRequest::new(10, 20).unwrap();
    let sql = paginate(select, &sort, page, DbBackend::Sqlite).to_string(SqliteQueryBuilder);

    assert!(sql.starts_with(r#"SELECT "t".*"#), "{sql}");
    assert!(sql.contains(r#"AS "total_rows""#), "{sql}");
    assert!(sql.contains("ROW_NUMBER() OVER"), "{sql}");
    assert!(sql.contains(r#"AS "row""#), "{sql}");
    assert!(sql.contains(r#"SELECT "u".* FROM (SELECT"#), "{sql}");
    assert!(sql.contains(r#"ORDER BY "u"."row" ASC LIMIT 10 OFFSET 20"#), "{sql}");
    assert!(sql.contains(r#"AS "actual_page_size""#), "{sql}");
    assert!(
        sql.contains(r#"MAX(t.row) OVER () = t.total_rows AS "last_page""#),
        "{sql}"
    );
    assert!(sql.contains(r#"AS "current_page""#), "{sql}");
    assert!(sql.ends_with(r#"ORDER BY "t"."row" ASC"#), "{sql}");

    // sort terms order both the base rows and ROW_NUMBER()
    assert_eq!(
        sql.matches(r#""w"."name" DESC, "w"."id" ASC"#).count(),
        2,
        "{sql}"
    );
}

#[test]
fn current_page_divides_by_page_size() {
    let (select, sort) = base();
    let page = PageRequest::new(7, 0).unwrap();
    let sql =
        paginate(select, &sort, page, DbBackend::Postgres).to_string(PostgresQueryBuilder);
    assert!(sql.contains(r#""t"."row" - 1"#), "{sql}");
    assert!(sql.contains("/ 7"), "{sql}");
    assert!(sql.contains("LIMIT 7 OFFSET 0"), "{sql}");
}

#[test]
fn mysql_uses_integer_division() {
    let (select, sort) = base();
    let sql = paginate(select, &sort, PageRequest::default(), DbBackend::MySql)
        .to_string(MysqlQueryBuilder);
    assert!(sql.contains("DIV 20"), "{sql}");
}

#[test]
fn unpaged_limit_is_clamped() {
    let (select, sort) = base();
    let sql = paginate(select, &sort, PageRequest::unpaged(), DbBackend::Sqlite)
        .to_string(SqliteQueryBuilder);
    assert!(
        sql.contains(&format!("LIMIT {} OFFSET 0", i64::MAX)),
        "{sql}"
    );
}

#[test]
fn row_number_without_sort_has_empty_window() {
    let mut select = Query::select();
    select.column(Asterisk).from(Alias::new("words"));
    let sql = paginate(select, &[], PageRequest::default(), DbBackend::Sqlite)
        .to_string(SqliteQueryBuilder);
    assert!(sql.contains("ROW_NUMBER() OVER"), "{sql}");
    assert!(!sql.contains("OVER ( ORDER BY"), "{sql}");
}

#[test]
fn options_apply_limits() {
    let options = PageOptions::default().with_limits(PageLimits {
        default_size: 10,
        max_size: Some(50),
    });
    let page = options.effective_page(PageRequest::new(500, 100).unwrap());
    assert_eq!((page.page_size(), page.offset()), (50, 100));

    let plain = PageOptions::default().single_statement();
    assert!(!plain.count_when_empty);
    assert!(plain.effective_page(PageRequest::unpaged()).is_unpaged());
}
