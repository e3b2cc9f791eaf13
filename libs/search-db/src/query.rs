use sea_orm::sea_query::{Condition, SelectStatement};
use sea_orm::{DbBackend, EntityTrait, QueryTrait};
use search_core::{FilterExpression, SortSpec};

use crate::condition::build_condition;
use crate::error::SearchResult;
use crate::field::{FieldPolicy, FieldResolver};
use crate::sort::{build_sort, SortDirective};

/// Resolvers for one query shape. Filter and sort may expose different fields.
#[derive(Clone, Copy)]
pub struct Resolvers<'a> {
    pub filter: &'a dyn FieldResolver,
    pub sort: &'a dyn FieldResolver,
    pub policy: FieldPolicy,
}

impl<'a> Resolvers<'a> {
    pub fn same(fields: &'a dyn FieldResolver) -> Self {
        Self {
            filter: fields,
            sort: fields,
            policy: FieldPolicy::Reject,
        }
    }

    pub fn split(filter: &'a dyn FieldResolver, sort: &'a dyn FieldResolver) -> Self {
        Self {
            filter,
            sort,
            policy: FieldPolicy::Reject,
        }
    }

    pub fn with_policy(mut self, policy: FieldPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// AND `condition` into the WHERE clause of `select` and append the ORDER BY terms.
/// An empty condition leaves the WHERE clause untouched.
pub fn compose(select: &mut SelectStatement, condition: Condition, sort: &[SortDirective]) {
    if !condition.is_empty() {
        select.cond_where(condition);
    }
    for d in sort {
        select.order_by_expr(d.expr.clone(), d.order.clone());
    }
}

/// Apply a client filter and sort to a select in one call.
pub trait SearchSelectExt: Sized {
    fn apply_search(
        self,
        filter: &FilterExpression,
        sort: &SortSpec,
        resolvers: Resolvers<'_>,
        backend: DbBackend,
    ) -> SearchResult<Self>;
}

impl SearchSelectExt for SelectStatement {
    fn apply_search(
        mut self,
        filter: &FilterExpression,
        sort: &SortSpec,
        resolvers: Resolvers<'_>,
        backend: DbBackend,
    ) -> SearchResult<Self> {
        let cond = build_condition(filter, resolvers.filter, resolvers.policy, backend)?;
        let order = build_sort(sort, resolvers.sort, resolvers.policy)?;
        compose(&mut self, cond, &order);
        Ok(self)
    }
}

impl<E: EntityTrait> SearchSelectExt for sea_orm::Select<E> {
    fn apply_search(
        mut self,
        filter: &FilterExpression,
        sort: &SortSpec,
        resolvers: Resolvers<'_>,
        backend: DbBackend,
    ) -> SearchResult<Self> {
        let cond = build_condition(filter, resolvers.filter, resolvers.policy, backend)?;
        let order = build_sort(sort, resolvers.sort, resolvers.policy)?;
        compose(QueryTrait::query(&mut self), cond, &order);
        Ok(self)
    }
}
