//! Aggregate totals over fee groups.

use crate::models::FeeGroup;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Add;

/// Column sums of a fee group table. Plain sums, no rounding; a column that
/// would exceed the `Decimal` range saturates instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTotals {
    pub amount: Decimal,
    pub paid: Decimal,
    pub discount: Decimal,
    pub fine: Decimal,
    pub balance: Decimal,
}

impl From<&FeeGroup> for FeeTotals {
    fn from(group: &FeeGroup) -> Self {
        Self {
            amount: group.amount,
            paid: group.paid,
            discount: group.discount,
            fine: group.fine,
            balance: group.balance,
        }
    }
}

impl Add for FeeTotals {
    type Output = FeeTotals;

    fn add(self, rhs: FeeTotals) -> FeeTotals {
        FeeTotals {
            amount: self.amount.saturating_add(rhs.amount),
            paid: self.paid.saturating_add(rhs.paid),
            discount: self.discount.saturating_add(rhs.discount),
            fine: self.fine.saturating_add(rhs.fine),
            balance: self.balance.saturating_add(rhs.balance),
        }
    }
}

pub fn aggregate<'a, I>(groups: I) -> FeeTotals
where
    I: IntoIterator<Item = &'a FeeGroup>,
{
    groups
        .into_iter()
        .map(FeeTotals::from)
        .fold(FeeTotals::default(), Add::add)
}

/// Totals over the groups whose id is in `selected_ids`. Unknown ids are
/// ignored.
pub fn aggregate_selected<S: AsRef<str>>(groups: &[FeeGroup], selected_ids: &[S]) -> FeeTotals {
    let selected: HashSet<&str> = selected_ids.iter().map(AsRef::as_ref).collect();
    aggregate(groups.iter().filter(|g| selected.contains(g.id.as_str())))
}
