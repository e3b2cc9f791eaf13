use sea_orm::sea_query::{Order, SimpleExpr};
use search_core::{SortDir, SortSpec};

use crate::error::SearchResult;
use crate::field::{resolve_with_policy, FieldPolicy, FieldResolver};

/// One resolved ORDER BY term.
#[derive(Clone, Debug)]
pub struct SortDirective {
    pub expr: SimpleExpr,
    pub order: Order,
}

/// Resolve each sort key in order. No implicit tiebreaker is added.
pub fn build_sort(
    spec: &SortSpec,
    resolver: &dyn FieldResolver,
    policy: FieldPolicy,
) -> SearchResult<Vec<SortDirective>> {
    let mut out = Vec::with_capacity(spec.keys().len());
    for key in spec.keys() {
        let Some(column) = resolve_with_policy(resolver, &key.field, policy)? else {
            continue;
        };
        out.push(SortDirective {
            expr: column.expr,
            order: match key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            },
        });
    }
    Ok(out)
}
