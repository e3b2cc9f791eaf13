//! `FilterExpression` → `sea_query::Condition` compiler.

use sea_orm::sea_query::{Condition, Expr, SimpleExpr};
use sea_orm::DbBackend;
use search_core::{Combinator, FilterCondition, FilterExpression, FilterValue, OperatorKind};

use crate::dialect::{MatchDialect, TextMatch};
use crate::error::SearchResult;
use crate::field::{resolve_with_policy, ColumnHandle, FieldKind, FieldPolicy, FieldResolver};
use crate::value::{coerce, parse_text};

/// Translate `expr` into a predicate over allow-listed columns.
///
/// Every field is resolved before anything else, so with [`FieldPolicy::Reject`] an unknown
/// field fails the request even when its condition has no value. A condition without a value
/// never restricts the result, and an expression with no remaining conditions matches every
/// row, whichever combinator it uses.
pub fn build_condition(
    expr: &FilterExpression,
    resolver: &dyn FieldResolver,
    policy: FieldPolicy,
    backend: DbBackend,
) -> SearchResult<Condition> {
    let mut terms = Vec::with_capacity(expr.conditions.len());
    let mut unconditional = false;

    for cond in &expr.conditions {
        let Some(column) = resolve_with_policy(resolver, &cond.field, policy)? else {
            continue;
        };
        match &cond.value {
            Some(value) => terms.push(condition_expr(cond, &column, value, backend)?),
            None => unconditional = true,
        }
    }

    Ok(match expr.combinator {
        Combinator::And => terms.into_iter().fold(Condition::all(), |c, t| c.add(t)),
        Combinator::Or if unconditional || terms.is_empty() => Condition::all(),
        Combinator::Or => terms.into_iter().fold(Condition::any(), |c, t| c.add(t)),
    })
}

fn condition_expr(
    cond: &FilterCondition,
    column: &ColumnHandle,
    value: &FilterValue,
    backend: DbBackend,
) -> SearchResult<SimpleExpr> {
    let col = || Expr::expr(column.expr.clone());
    let ordered = || coerce(&cond.field, column.kind, value);

    Ok(match cond.operator {
        OperatorKind::Eq => equality(column, value, true, backend),
        OperatorKind::Ne => equality(column, value, false, backend),
        OperatorKind::Gt => col().gt(ordered()?),
        OperatorKind::Ge => col().gte(ordered()?),
        OperatorKind::Lt => col().lt(ordered()?),
        OperatorKind::Le => col().lte(ordered()?),
        OperatorKind::Contains => {
            backend.text_match(text_of(column, backend), TextMatch::Contains, &value.to_string())
        }
        OperatorKind::StartsWith => backend.text_match(
            text_of(column, backend),
            TextMatch::StartsWith,
            &value.to_string(),
        ),
        OperatorKind::EndsWith => {
            backend.text_match(text_of(column, backend), TextMatch::EndsWith, &value.to_string())
        }
        OperatorKind::ContainsIgnoreCase => {
            backend.contains_ignore_case(text_of(column, backend), &value.to_string())
        }
    })
}

fn text_of(column: &ColumnHandle, backend: DbBackend) -> SimpleExpr {
    match column.kind {
        FieldKind::String => column.expr.clone(),
        _ => backend.cast_to_text(column.expr.clone()),
    }
}

/// `eq`/`ne` compare text representations. Kinds whose stored text form varies by backend
/// are compared natively after parsing the operand, which is the same test.
fn equality(
    column: &ColumnHandle,
    value: &FilterValue,
    eq: bool,
    backend: DbBackend,
) -> SimpleExpr {
    let wanted = value.to_string();
    let cmp = |lhs: SimpleExpr, rhs: SimpleExpr| {
        if eq {
            Expr::expr(lhs).eq(rhs)
        } else {
            Expr::expr(lhs).ne(rhs)
        }
    };

    match column.kind {
        FieldKind::String | FieldKind::I64 => cmp(text_of(column, backend), wanted.into()),
        kind => match parse_text(kind, &wanted) {
            Some(v) => cmp(column.expr.clone(), v.into()),
            // no value of this kind prints as `wanted`
            None if eq => Expr::cust("1=0"),
            None => Expr::expr(column.expr.clone()).is_not_null(),
        },
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod condition_tests;
