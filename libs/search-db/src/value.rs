//! Coercion of client scalars into typed column values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::Value;
use search_core::FilterValue;

use crate::error::{SearchError, SearchResult};
use crate::field::FieldKind;

/// Parse the text form of a value of `kind`. `None` when `s` is not such a value.
pub(crate) fn parse_text(kind: FieldKind, s: &str) -> Option<Value> {
    let s = s.trim();
    Some(match kind {
        FieldKind::String => s.to_string().into(),
        FieldKind::I64 => s.parse::<i64>().ok()?.into(),
        FieldKind::F64 => s.parse::<f64>().ok()?.into(),
        FieldKind::Decimal => s.parse::<Decimal>().ok()?.into(),
        FieldKind::Bool => parse_bool(s)?.into(),
        FieldKind::Uuid => s.parse::<uuid::Uuid>().ok()?.into(),
        FieldKind::DateTimeUtc => parse_datetime(s)?.into(),
        FieldKind::Date => s.parse::<NaiveDate>().ok()?.into(),
        FieldKind::Time => s.parse::<NaiveTime>().ok()?.into(),
    })
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") || s == "1" {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s == "0" {
        Some(false)
    } else {
        None
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Coerce `v` into a value comparable with a column of `kind` using native ordering.
pub(crate) fn coerce(field: &str, kind: FieldKind, v: &FilterValue) -> SearchResult<Value> {
    let mismatch = || SearchError::TypeMismatch {
        field: field.to_string(),
        expected: kind,
        got: v.type_name(),
    };

    Ok(match (kind, v) {
        (FieldKind::String, v) => v.to_string().into(),

        (FieldKind::I64, FilterValue::Int(i)) => (*i).into(),
        (FieldKind::F64, FilterValue::Int(i)) => (*i as f64).into(),
        (FieldKind::F64, FilterValue::Float(f)) => (*f).into(),
        (FieldKind::Decimal, FilterValue::Int(i)) => Decimal::from(*i).into(),
        (FieldKind::Decimal, FilterValue::Float(f)) => {
            Decimal::try_from(*f).map_err(|_| mismatch())?.into()
        }
        (FieldKind::Bool, FilterValue::Bool(b)) => (*b).into(),

        (kind, FilterValue::String(s)) => parse_text(kind, s).ok_or_else(mismatch)?,

        _ => return Err(mismatch()),
    })
}
