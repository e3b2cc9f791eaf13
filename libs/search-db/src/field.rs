//! Allow-listed mapping from external field names onto column expressions.

use std::collections::HashMap;

use sea_orm::sea_query::{Alias, Expr, IntoIden, SimpleExpr};
use sea_orm::ColumnTrait;

use crate::error::{SearchError, SearchResult};

/// Column type as far as value coercion is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    I64,
    F64,
    Bool,
    Uuid,
    DateTimeUtc,
    Date,
    Time,
    Decimal,
}

/// A resolved field: the column expression plus its kind.
#[derive(Clone, Debug)]
pub struct ColumnHandle {
    pub expr: SimpleExpr,
    pub kind: FieldKind,
}

impl ColumnHandle {
    /// Entity column, qualified with the entity's table name.
    pub fn of<C: ColumnTrait>(col: C, kind: FieldKind) -> Self {
        Self {
            expr: Expr::col((col.entity_name(), col)).into(),
            kind,
        }
    }

    /// Column reached through a table alias, e.g. the `name` of a joined `lang_to`.
    pub fn aliased<C: IntoIden + 'static>(alias: &str, col: C, kind: FieldKind) -> Self {
        Self {
            expr: Expr::col((Alias::new(alias), col)).into(),
            kind,
        }
    }

    pub fn expr(expr: impl Into<SimpleExpr>, kind: FieldKind) -> Self {
        Self {
            expr: expr.into(),
            kind,
        }
    }
}

/// Maps an external field name onto a column. Unknown names fail with
/// [`SearchError::UnsupportedField`]; that is the only way a client string becomes SQL.
pub trait FieldResolver: Send + Sync {
    fn resolve(&self, field: &str) -> SearchResult<ColumnHandle>;
}

impl<F> FieldResolver for F
where
    F: Fn(&str) -> Option<ColumnHandle> + Send + Sync,
{
    fn resolve(&self, field: &str) -> SearchResult<ColumnHandle> {
        self(field).ok_or_else(|| SearchError::unsupported_field(field))
    }
}

/// What to do with conditions or sort keys naming a field the resolver does not know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldPolicy {
    #[default]
    Reject,
    /// Drop the offending condition or sort key.
    Ignore,
}

/// Case-insensitive allow-list built up front for one query shape.
#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    map: HashMap<String, ColumnHandle>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<C: ColumnTrait>(
        self,
        api_name: impl Into<String>,
        col: C,
        kind: FieldKind,
    ) -> Self {
        self.insert_expr(api_name, ColumnHandle::of(col, kind))
    }

    pub fn insert_aliased<C: IntoIden + 'static>(
        self,
        api_name: impl Into<String>,
        alias: &str,
        col: C,
        kind: FieldKind,
    ) -> Self {
        self.insert_expr(api_name, ColumnHandle::aliased(alias, col, kind))
    }

    pub fn insert_expr(mut self, api_name: impl Into<String>, handle: ColumnHandle) -> Self {
        self.map.insert(api_name.into().to_lowercase(), handle);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ColumnHandle> {
        self.map.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FieldResolver for FieldMap {
    fn resolve(&self, field: &str) -> SearchResult<ColumnHandle> {
        self.get(field)
            .cloned()
            .ok_or_else(|| SearchError::unsupported_field(field))
    }
}

/// Resolve `field`, turning an unknown name into `None` when the policy allows it.
pub(crate) fn resolve_with_policy(
    resolver: &dyn FieldResolver,
    field: &str,
    policy: FieldPolicy,
) -> SearchResult<Option<ColumnHandle>> {
    match resolver.resolve(field) {
        Ok(handle) => Ok(Some(handle)),
        Err(SearchError::UnsupportedField { field }) if policy == FieldPolicy::Ignore => {
            tracing::debug!(%field, "ignoring unsupported field");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
