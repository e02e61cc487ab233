//! Sort and filter resolution for the list endpoints.
//!
//! Each entity exposes a static whitelist mapping query-string names to typed
//! columns. Unknown sort fields silently fall back to the entity default and
//! anything that is not `desc` sorts ascending, so a hostile or typo'd query
//! can never produce an error or reach the SQL layer as text.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition, IntoSimpleExpr, Order};

use crate::pagination::PageRequest;

/// Everything a list endpoint accepts, already coerced.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub page: PageRequest,
    pub search: Option<String>,
    pub category: Option<i32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Resolve `(sortBy, sortOrder)` against a whitelist.
pub fn resolve_sort<C>(
    requested: Option<&str>,
    order: Option<&str>,
    allowed: &[(&str, C)],
    default: C,
) -> (C, Order)
where
    C: ColumnTrait + Copy,
{
    let column = requested
        .and_then(|name| {
            allowed
                .iter()
                .find(|(candidate, _)| *candidate == name)
                .map(|(_, column)| *column)
        })
        .unwrap_or(default);
    (column, resolve_order(order))
}

/// `desc` (any casing) sorts descending, everything else ascending.
pub fn resolve_order(raw: Option<&str>) -> Order {
    match raw {
        Some(value) if value.eq_ignore_ascii_case("desc") => Order::Desc,
        _ => Order::Asc,
    }
}

/// Case-insensitive "any field contains the term" condition, or `None` when
/// the term is blank after trimming.
pub fn search_condition<C>(search: Option<&str>, fields: &[C]) -> Option<Condition>
where
    C: ColumnTrait + Copy,
{
    let term = search.map(str::trim).filter(|t| !t.is_empty())?;
    let pattern = format!("%{}%", term.to_lowercase());
    let mut condition = Condition::any();
    for field in fields {
        condition = condition.add(
            Expr::expr(Func::lower(field.into_simple_expr())).like(pattern.clone()),
        );
    }
    Some(condition)
}

/// The `category` query parameter filters on `category_id` when it parses as
/// an integer; anything else is ignored.
pub fn category_filter(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|value| value.trim().parse::<i32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::product;

    const PRODUCT_SORTS: &[(&str, product::Column)] = &[
        ("name", product::Column::Name),
        ("selling_price", product::Column::SellingPrice),
        ("created_at", product::Column::CreatedAt),
        ("updated_at", product::Column::UpdatedAt),
    ];

    #[test]
    fn unknown_sort_field_falls_back_to_default() {
        let (column, order) = resolve_sort(
            Some("unknown_field"),
            Some("asc"),
            PRODUCT_SORTS,
            product::Column::Name,
        );
        assert_eq!(column, product::Column::Name);
        assert_eq!(order, Order::Asc);
    }

    #[test]
    fn whitelisted_sort_field_is_used() {
        let (column, order) = resolve_sort(
            Some("selling_price"),
            Some("DESC"),
            PRODUCT_SORTS,
            product::Column::Name,
        );
        assert_eq!(column, product::Column::SellingPrice);
        assert_eq!(order, Order::Desc);
    }

    #[test]
    fn bad_sort_order_defaults_to_ascending() {
        assert_eq!(resolve_order(Some("sideways")), Order::Asc);
        assert_eq!(resolve_order(None), Order::Asc);
        assert_eq!(resolve_order(Some("dEsC")), Order::Desc);
    }

    #[test]
    fn blank_search_produces_no_condition() {
        let fields = [product::Column::Name, product::Column::Description];
        assert!(search_condition(None, &fields).is_none());
        assert!(search_condition(Some("   "), &fields).is_none());
        assert!(search_condition(Some("beer"), &fields).is_some());
    }

    #[test]
    fn category_must_be_numeric() {
        assert_eq!(category_filter(Some("7")), Some(7));
        assert_eq!(category_filter(Some(" 12 ")), Some(12));
        assert_eq!(category_filter(Some("electronics")), None);
        assert_eq!(category_filter(None), None);
    }
}
