//! Injection-safe filtering and single-round-trip pagination over sea-query.
//!
//! The flow for one request is
//! [`build_condition`] → [`build_sort`] → [`compose`] → [`paginate`] → execute → [`assemble`];
//! [`find_page`] runs all of it against a `ConnectionTrait`.
//!
//! Client supplied field names never reach SQL directly: every name goes through a
//! [`FieldResolver`] which maps it onto an allow-listed column expression.
//!
//! # Features
//! - `sqlite` (default), `pg`, `mysql`: enable the matching sea-orm sqlx driver
//! - `integration`: container backed tests
//!
//! # Example
//! ```rust,no_run
//! # async fn run(conn: &sea_orm::DatabaseConnection) -> Result<(), search_db::SearchError> {
//! use sea_orm::sea_query::{Alias, Query};
//! use search_core::{FilterCondition, FilterExpression, OperatorKind, SearchParams};
//! use search_db::{find_page, ColumnHandle, FieldKind, FieldMap, PageOptions, Resolvers};
//!
//! let fields = FieldMap::new().insert_expr(
//!     "name",
//!     ColumnHandle::aliased("person", Alias::new("name"), FieldKind::String),
//! );
//! let base = Query::select()
//!     .column((Alias::new("person"), Alias::new("name")))
//!     .from(Alias::new("person"))
//!     .to_owned();
//! let params = SearchParams::new().with_filter(FilterExpression::all([FilterCondition::new(
//!     "name",
//!     OperatorKind::StartsWith,
//!     "Jo",
//! )]));
//! let page = find_page(conn, base, &params, Resolvers::same(&fields), PageOptions::default(), |row| {
//!     row.try_get::<String>("", "name")
//! })
//! .await?;
//! println!("{} of {}", page.items.len(), page.total_elements);
//! # Ok(())
//! # }
//! ```

pub mod condition;
pub mod dialect;
pub mod error;
pub mod field;
pub mod limits;
pub mod paginate;
pub mod query;
pub mod sort;
mod value;

pub use condition::build_condition;
pub use dialect::MatchDialect;
pub use error::{SearchError, SearchResult};
pub use field::{ColumnHandle, FieldKind, FieldMap, FieldPolicy, FieldResolver};
pub use limits::PageLimits;
pub use paginate::{
    assemble, find_page, find_page_as, paginate, PageMeta, PageOptions, COL_ACTUAL_PAGE_SIZE,
    COL_CURRENT_PAGE, COL_LAST_PAGE, COL_ROW, COL_TOTAL_ROWS,
};
pub use query::{compose, Resolvers, SearchSelectExt};
pub use sort::{build_sort, SortDirective};

pub use search_core;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use thiserror::Error;

/// Library-local result type for connection helpers.
pub type DbResult<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    MySql,
    Sqlite,
}

impl DbEngine {
    /// Detect engine by DSN scheme. The tail (credentials etc.) is never inspected.
    pub fn detect(dsn: &str) -> DbResult<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("mysql://") {
            Ok(DbEngine::MySql)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(dsn.to_string()))
        }
    }

    fn ensure_enabled(self) -> DbResult<()> {
        match self {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => Ok(()),
            #[cfg(feature = "mysql")]
            DbEngine::MySql => Ok(()),
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => Ok(()),
            #[allow(unreachable_patterns)]
            DbEngine::Postgres => Err(DbError::FeatureDisabled("pg")),
            #[allow(unreachable_patterns)]
            DbEngine::MySql => Err(DbError::FeatureDisabled("mysql")),
            #[allow(unreachable_patterns)]
            DbEngine::Sqlite => Err(DbError::FeatureDisabled("sqlite")),
        }
    }
}

/// Pool knobs; each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Minimum number of connections in the pool.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    pub idle_timeout: Option<Duration>,
    /// Log every statement through sqlx.
    pub log_statements: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            log_statements: false,
        }
    }
}

fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Connect a sea-orm pool for `dsn`.
pub async fn connect(dsn: &str, opts: &ConnectOpts) -> DbResult<DatabaseConnection> {
    let engine = DbEngine::detect(dsn)?;
    engine.ensure_enabled()?;

    let mut o = ConnectOptions::new(dsn.to_string());
    // every pooled connection to an in-memory SQLite database would see its own database
    let max_conns = if engine == DbEngine::Sqlite && is_sqlite_memory(dsn) {
        Some(1)
    } else {
        opts.max_conns
    };
    if let Some(n) = max_conns {
        o.max_connections(n);
    }
    if let Some(n) = opts.min_conns {
        o.min_connections(n);
    }
    if let Some(t) = opts.acquire_timeout {
        o.acquire_timeout(t);
    }
    if let Some(t) = opts.idle_timeout {
        o.idle_timeout(t);
    }
    o.sqlx_logging(opts.log_statements);

    tracing::debug!(?engine, "connecting database");
    Ok(Database::connect(o).await?)
}
