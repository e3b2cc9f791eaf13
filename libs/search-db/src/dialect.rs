//! Backend specific pieces of the generated SQL.
//!
//! Everything else the engine emits is portable sea-query; only text casts, pattern
//! matching and integer division differ between PostgreSQL, SQLite and MySQL.

use sea_orm::sea_query::{Alias, BinOper, Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::DbBackend;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextMatch {
    Contains,
    StartsWith,
    EndsWith,
}

pub trait MatchDialect {
    /// Expression yielding the text form of `expr`.
    fn cast_to_text(&self, expr: SimpleExpr) -> SimpleExpr;

    /// Case-sensitive substring, prefix or suffix test of `text` against a literal `needle`.
    fn text_match(&self, text: SimpleExpr, kind: TextMatch, needle: &str) -> SimpleExpr;

    /// Case-insensitive substring test.
    fn contains_ignore_case(&self, text: SimpleExpr, needle: &str) -> SimpleExpr;

    /// Truncating integer division.
    fn int_div(&self, lhs: SimpleExpr, rhs: SimpleExpr) -> SimpleExpr;
}

impl MatchDialect for DbBackend {
    fn cast_to_text(&self, expr: SimpleExpr) -> SimpleExpr {
        let target = match self {
            DbBackend::MySql => "CHAR",
            DbBackend::Postgres | DbBackend::Sqlite => "TEXT",
        };
        Expr::expr(expr).cast_as(Alias::new(target))
    }

    fn text_match(&self, text: SimpleExpr, kind: TextMatch, needle: &str) -> SimpleExpr {
        match self {
            // LIKE ignores ASCII case in SQLite, GLOB does not
            DbBackend::Sqlite => {
                let escaped = glob_escape(needle);
                let pattern = match kind {
                    TextMatch::Contains => format!("*{escaped}*"),
                    TextMatch::StartsWith => format!("{escaped}*"),
                    TextMatch::EndsWith => format!("*{escaped}"),
                };
                Expr::expr(text).binary(BinOper::Custom("GLOB"), pattern)
            }
            DbBackend::Postgres | DbBackend::MySql => {
                let pattern = match kind {
                    TextMatch::Contains => like_contains(needle),
                    TextMatch::StartsWith => like_starts(needle),
                    TextMatch::EndsWith => like_ends(needle),
                };
                Expr::expr(text).like(LikeExpr::new(pattern).escape('\\'))
            }
        }
    }

    fn contains_ignore_case(&self, text: SimpleExpr, needle: &str) -> SimpleExpr {
        // SQLite's LOWER() folds ASCII only; fold the needle the same way
        let needle = match self {
            DbBackend::Sqlite => needle.to_ascii_lowercase(),
            DbBackend::Postgres | DbBackend::MySql => needle.to_lowercase(),
        };
        Expr::expr(Func::lower(text)).like(LikeExpr::new(like_contains(&needle)).escape('\\'))
    }

    fn int_div(&self, lhs: SimpleExpr, rhs: SimpleExpr) -> SimpleExpr {
        match self {
            DbBackend::MySql => Expr::expr(lhs).binary(BinOper::Custom("DIV"), rhs),
            DbBackend::Postgres | DbBackend::Sqlite => Expr::expr(lhs).div(rhs),
        }
    }
}

/* ---------- LIKE helpers ---------- */

pub(crate) fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}

fn like_starts(s: &str) -> String {
    format!("{}%", like_escape(s))
}

fn like_ends(s: &str) -> String {
    format!("%{}", like_escape(s))
}

/* ---------- GLOB helpers ---------- */

/// Wraps GLOB metacharacters in single-character classes. A lone `]` is literal.
pub(crate) fn glob_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '*' => out.push_str("[*]"),
            '?' => out.push_str("[?]"),
            '[' => out.push_str("[[]"),
            c => out.push(c),
        }
    }
    out
}
