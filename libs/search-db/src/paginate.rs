//! Single-statement pagination with window functions.
//!
//! [`paginate`] wraps a filtered, sorted select in three layers:
//!
//! ```text
//! SELECT t.*, COUNT(*) OVER ()                       AS actual_page_size,
//!        MAX(t.row) OVER () = t.total_rows           AS last_page,
//!        (t.row - 1) / <page_size> + 1               AS current_page
//! FROM (SELECT u.* FROM (
//!           SELECT <base columns>,
//!                  COUNT(*) OVER ()                      AS total_rows,
//!                  ROW_NUMBER() OVER (ORDER BY <sort>)   AS row
//!           FROM ... WHERE <filter> ORDER BY <sort>
//!       ) u ORDER BY u.row LIMIT <page_size> OFFSET <offset>) t
//! ORDER BY t.row
//! ```
//!
//! Window functions run after WHERE and before LIMIT, so `total_rows` is the full match
//! count while only one page of rows travels back.

use sea_orm::sea_query::{
    Alias, Asterisk, Expr, Order, Query, SelectStatement, WindowStatement,
};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, FromQueryResult, QueryResult};
use search_core::{PageRequest, PageResult, SearchParams};

use crate::condition::build_condition;
use crate::dialect::MatchDialect;
use crate::error::SearchResult;
use crate::limits::PageLimits;
use crate::query::{compose, Resolvers};
use crate::sort::{build_sort, SortDirective};

pub const COL_TOTAL_ROWS: &str = "total_rows";
pub const COL_ROW: &str = "row";
pub const COL_ACTUAL_PAGE_SIZE: &str = "actual_page_size";
pub const COL_LAST_PAGE: &str = "last_page";
pub const COL_CURRENT_PAGE: &str = "current_page";

const BASE_ALIAS: &str = "u";
const SLICE_ALIAS: &str = "t";
const COUNT_ALIAS: &str = "c";

/// Bare qualified names are portable: a word after `.` is always read as an identifier.
const LAST_PAGE_EXPR: &str = "MAX(t.row) OVER () = t.total_rows";

#[derive(Clone, Copy, Debug)]
pub struct PageOptions {
    pub limits: Option<PageLimits>,
    /// Recount with `COUNT(*)` when a page past the end comes back empty, so the total
    /// stays correct. Off means an empty page always reports zero rows in total.
    pub count_when_empty: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            limits: None,
            count_when_empty: true,
        }
    }
}

impl PageOptions {
    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn single_statement(mut self) -> Self {
        self.count_when_empty = false;
        self
    }

    fn effective_page(&self, page: PageRequest) -> PageRequest {
        match self.limits {
            Some(limits) => limits.apply(page),
            None => page,
        }
    }
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Wrap `base` (already filtered and sorted by [`compose`]) into the paging layers.
///
/// `sort` must be the directives used to sort `base`; they also order `ROW_NUMBER()`.
/// The projection of `base` must not use the metadata column names.
pub fn paginate(
    mut base: SelectStatement,
    sort: &[SortDirective],
    page: PageRequest,
    backend: DbBackend,
) -> SelectStatement {
    let size = clamp_i64(page.page_size());
    let offset = clamp_i64(page.offset());

    let mut row_window = WindowStatement::new();
    for d in sort {
        row_window.order_by_expr(d.expr.clone(), d.order.clone());
    }
    base.expr_window_as(
        Expr::cust("COUNT(*)"),
        WindowStatement::new(),
        Alias::new(COL_TOTAL_ROWS),
    )
    .expr_window_as(Expr::cust("ROW_NUMBER()"), row_window, Alias::new(COL_ROW));

    let mut slice = Query::select();
    slice
        .column((Alias::new(BASE_ALIAS), Asterisk))
        .from_subquery(base, Alias::new(BASE_ALIAS))
        .order_by((Alias::new(BASE_ALIAS), Alias::new(COL_ROW)), Order::Asc)
        .limit(size as u64)
        .offset(offset as u64);

    let row = Expr::col((Alias::new(SLICE_ALIAS), Alias::new(COL_ROW)));
    let current_page =
        Expr::expr(backend.int_div(row.sub(1i64), Expr::val(size).into())).add(1i64);

    let mut outer = Query::select();
    outer
        .column((Alias::new(SLICE_ALIAS), Asterisk))
        .expr_window_as(
            Expr::cust("COUNT(*)"),
            WindowStatement::new(),
            Alias::new(COL_ACTUAL_PAGE_SIZE),
        )
        .expr_as(Expr::cust(LAST_PAGE_EXPR), Alias::new(COL_LAST_PAGE))
        .expr_as(current_page, Alias::new(COL_CURRENT_PAGE))
        .from_subquery(slice, Alias::new(SLICE_ALIAS))
        .order_by((Alias::new(SLICE_ALIAS), Alias::new(COL_ROW)), Order::Asc);
    outer
}

/// Paging metadata carried on every row of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMeta {
    pub total_rows: u64,
    pub row: u64,
    pub actual_page_size: u64,
    pub last_page: bool,
    pub current_page: u64,
}

impl PageMeta {
    pub fn from_row(row: &QueryResult) -> Result<Self, DbErr> {
        Ok(Self {
            total_rows: get_count(row, COL_TOTAL_ROWS)?,
            row: get_count(row, COL_ROW)?,
            actual_page_size: get_count(row, COL_ACTUAL_PAGE_SIZE)?,
            last_page: get_flag(row, COL_LAST_PAGE)?,
            current_page: get_count(row, COL_CURRENT_PAGE)?,
        })
    }
}

// MySQL reports ROW_NUMBER() unsigned
fn get_count(row: &QueryResult, col: &str) -> Result<u64, DbErr> {
    match row.try_get::<i64>("", col) {
        Ok(v) => Ok(u64::try_from(v).unwrap_or(0)),
        Err(e) => row.try_get::<u64>("", col).map_err(|_| e),
    }
}

// boolean on PostgreSQL, 0/1 elsewhere
fn get_flag(row: &QueryResult, col: &str) -> Result<bool, DbErr> {
    match row.try_get::<bool>("", col) {
        Ok(v) => Ok(v),
        Err(e) => row
            .try_get::<i64>("", col)
            .map(|v| v != 0)
            .map_err(|_| e),
    }
}

/// Turn the rows of one paginated statement into a [`PageResult`].
///
/// Metadata comes from the first row; an empty slice yields an empty last page with a
/// total of zero.
pub fn assemble<T, F>(
    rows: Vec<QueryResult>,
    page: PageRequest,
    map_row: F,
) -> SearchResult<PageResult<T>>
where
    F: Fn(&QueryResult) -> Result<T, DbErr>,
{
    let Some(first) = rows.first() else {
        return Ok(PageResult::empty(page, 0));
    };
    let meta = PageMeta::from_row(first)?;
    let items = rows.iter().map(map_row).collect::<Result<Vec<_>, _>>()?;

    Ok(PageResult::new(
        items,
        meta.total_rows,
        page.page_size(),
        meta.current_page.saturating_sub(1),
        meta.last_page,
    ))
}

/// Filter, sort and paginate `base` in one statement, then map the rows.
pub async fn find_page<C, T, F>(
    conn: &C,
    base: SelectStatement,
    params: &SearchParams,
    resolvers: Resolvers<'_>,
    options: PageOptions,
    map_row: F,
) -> SearchResult<PageResult<T>>
where
    C: ConnectionTrait,
    F: Fn(&QueryResult) -> Result<T, DbErr>,
{
    let backend = conn.get_database_backend();
    let page = options.effective_page(params.page);

    let condition = build_condition(
        &params.filter,
        resolvers.filter,
        resolvers.policy,
        backend,
    )?;
    let sort = build_sort(&params.sort, resolvers.sort, resolvers.policy)?;

    let mut filtered = base;
    compose(&mut filtered, condition, &sort);
    let recount = (options.count_when_empty && page.offset() > 0).then(|| filtered.clone());

    let stmt = backend.build(&paginate(filtered, &sort, page, backend));
    tracing::debug!(
        sql = %stmt.sql,
        page_size = page.page_size(),
        offset = page.offset(),
        "search page"
    );
    let rows = conn.query_all(stmt).await?;

    if rows.is_empty() {
        if let Some(filtered) = recount {
            let total = count_rows(conn, filtered).await?;
            tracing::debug!(total, offset = page.offset(), "page past the end");
            return Ok(PageResult::empty(page, total));
        }
    }
    assemble(rows, page, map_row)
}

/// [`find_page`] decoding each row into `M`. Metadata columns are ignored by the model.
pub async fn find_page_as<C, M>(
    conn: &C,
    base: SelectStatement,
    params: &SearchParams,
    resolvers: Resolvers<'_>,
    options: PageOptions,
) -> SearchResult<PageResult<M>>
where
    C: ConnectionTrait,
    M: FromQueryResult,
{
    find_page(conn, base, params, resolvers, options, |row| {
        M::from_query_result(row, "")
    })
    .await
}

async fn count_rows<C>(conn: &C, filtered: SelectStatement) -> SearchResult<u64>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    let mut count = Query::select();
    count
        .expr_as(Expr::cust("COUNT(*)"), Alias::new(COL_TOTAL_ROWS))
        .from_subquery(filtered, Alias::new(COUNT_ALIAS));
    let row = conn.query_one(backend.build(&count)).await?;
    Ok(match row {
        Some(r) => get_count(&r, COL_TOTAL_ROWS)?,
        None => 0,
    })
}

#[cfg(test)]
#[path = "paginate_tests.rs"]
mod paginate_tests;
