//! Stock aggregation across a product's variants.

use crate::entities::product_variant;

/// Computes the stock total reported on a product.
///
/// Real (non-default) variants carry the truth: as soon as at least one
/// exists, their stock sums and the default variant's count is ignored as a
/// leftover. A product whose only variant is the default one reports that
/// variant's stock. No variants at all means zero.
pub fn total_stock(variants: &[product_variant::Model]) -> i64 {
    let real: i64 = variants
        .iter()
        .filter(|v| !v.is_default)
        .map(|v| v.stock as i64)
        .sum();
    let has_real = variants.iter().any(|v| !v.is_default);

    if has_real {
        real
    } else {
        variants
            .iter()
            .find(|v| v.is_default)
            .map(|v| v.stock as i64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn variant(stock: i32, is_default: bool) -> product_variant::Model {
        product_variant::Model {
            id: 1,
            user_id: 1,
            product_id: 1,
            variant_name: "Default".to_string(),
            stock,
            selling_price_modifier: Decimal::ZERO,
            min_stock_alert: 0,
            enable_stock_alerts: false,
            is_default,
            attributes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_variants_means_zero() {
        assert_eq!(total_stock(&[]), 0);
    }

    #[test]
    fn only_default_variant_reports_its_stock() {
        assert_eq!(total_stock(&[variant(7, true)]), 7);
    }

    #[test]
    fn real_variants_shadow_the_default() {
        // A stale default row must not inflate the total once real
        // variants exist.
        let variants = [variant(7, true), variant(3, false), variant(8, false)];
        assert_eq!(total_stock(&variants), 11);
    }

    #[test]
    fn real_variants_with_zero_stock_still_win() {
        let variants = [variant(7, true), variant(0, false)];
        assert_eq!(total_stock(&variants), 0);
    }
}
