//! Discount derivation from the discount catalogue.

use crate::models::{DiscountRule, DiscountType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a computed discount relates to the amount it applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMode {
    /// Fixed discounts apply in full, even above the base amount.
    #[default]
    AsConfigured,
    /// Bound every discount to `[0, base]`.
    ClampToBase,
}

/// Discount value of `rule` against `base`.
///
/// Percentage rules scale with the base; fixed rules return their amount
/// verbatim, including when the base is zero or negative. Never panics: a
/// product too large for `Decimal` is computed on the scaled-down base and
/// saturates at the representable bound.
pub fn compute_discount(rule: Option<&DiscountRule>, base: Decimal) -> Decimal {
    let Some(rule) = rule else {
        return Decimal::ZERO;
    };

    match rule.discount_type {
        DiscountType::Percentage => base
            .checked_mul(rule.percentage)
            .map(|scaled| scaled / Decimal::ONE_HUNDRED)
            .unwrap_or_else(|| (base / Decimal::ONE_HUNDRED).saturating_mul(rule.percentage)),
        DiscountType::Fixed => rule.amount,
    }
}

/// [`compute_discount`] under a [`DiscountMode`].
pub fn compute_discount_with_mode(
    rule: Option<&DiscountRule>,
    base: Decimal,
    mode: DiscountMode,
) -> Decimal {
    let discount = compute_discount(rule, base);

    match mode {
        DiscountMode::AsConfigured => discount,
        DiscountMode::ClampToBase => discount.min(base.max(Decimal::ZERO)).max(Decimal::ZERO),
    }
}

/// Find a rule by code. Blank codes never match.
pub fn find_rule<'a>(rules: &'a [DiscountRule], code: Option<&str>) -> Option<&'a DiscountRule> {
    let code = code.map(str::trim).filter(|c| !c.is_empty())?;
    rules.iter().find(|rule| rule.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percentage(pct: i64) -> DiscountRule {
        DiscountRule {
            code: "SIBLING10".to_string(),
            discount_type: DiscountType::Percentage,
            percentage: Decimal::from(pct),
            amount: Decimal::ZERO,
            name: "Sibling discount".to_string(),
        }
    }

    fn fixed(amount: i64) -> DiscountRule {
        DiscountRule {
            code: "EARLY500".to_string(),
            discount_type: DiscountType::Fixed,
            percentage: Decimal::ZERO,
            amount: Decimal::from(amount),
            name: "Early bird".to_string(),
        }
    }

    #[test]
    fn test_no_rule_is_zero() {
        assert_eq!(compute_discount(None, Decimal::from(2000)), Decimal::ZERO);
        assert_eq!(compute_discount(None, Decimal::from(-5)), Decimal::ZERO);
    }

    #[test]
    fn test_percentage_discount() {
        let rule = percentage(10);
        assert_eq!(
            compute_discount(Some(&rule), Decimal::from(2000)),
            Decimal::from(200)
        );
        assert_eq!(compute_discount(Some(&rule), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_fixed_discount_ignores_base() {
        let rule = fixed(500);
        for base in [0, 100, 2000, -50] {
            assert_eq!(
                compute_discount(Some(&rule), Decimal::from(base)),
                Decimal::from(500)
            );
        }
    }

    #[test]
    fn test_clamp_to_base() {
        let rule = fixed(500);
        let clamp = DiscountMode::ClampToBase;

        assert_eq!(
            compute_discount_with_mode(Some(&rule), Decimal::from(300), clamp),
            Decimal::from(300)
        );
        assert_eq!(
            compute_discount_with_mode(Some(&rule), Decimal::ZERO, clamp),
            Decimal::ZERO
        );
        assert_eq!(
            compute_discount_with_mode(Some(&rule), Decimal::from(-40), clamp),
            Decimal::ZERO
        );
        assert_eq!(
            compute_discount_with_mode(Some(&rule), Decimal::from(300), DiscountMode::AsConfigured),
            Decimal::from(500)
        );
    }

    #[test]
    fn test_percentage_of_largest_amount_does_not_overflow() {
        let rule = percentage(10);

        let discount = compute_discount(Some(&rule), Decimal::MAX);
        assert_eq!(discount, Decimal::MAX / Decimal::ONE_HUNDRED * Decimal::from(10));
        assert!(discount < Decimal::MAX);

        let discount = compute_discount(Some(&rule), Decimal::MIN);
        assert!(discount < Decimal::ZERO);

        let clamped =
            compute_discount_with_mode(Some(&percentage(250)), Decimal::MAX, DiscountMode::ClampToBase);
        assert_eq!(clamped, Decimal::MAX);
    }

    #[test]
    fn test_find_rule() {
        let rules = vec![percentage(10), fixed(500)];

        assert_eq!(find_rule(&rules, Some("EARLY500")).map(|r| r.amount), Some(Decimal::from(500)));
        assert!(find_rule(&rules, Some("UNKNOWN")).is_none());
        assert!(find_rule(&rules, Some(" ")).is_none());
        assert!(find_rule(&rules, None).is_none());
    }
}
