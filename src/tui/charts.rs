//! Client-side grouping over the fetched expense list, feeding the
//! dashboard widgets.

use crate::domain::expense::{CategoryTotal, Expense};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Per-month sums in chronological order, labelled with the short month
/// name.
pub fn monthly_totals(expenses: &[Expense]) -> Vec<(String, Decimal)> {
    let mut keyed: Vec<((i32, u32), Decimal)> = Vec::new();
    for expense in expenses {
        let key = (expense.date.year(), expense.date.month());
        match keyed.iter_mut().find(|(k, _)| *k == key) {
            Some((_, amount)) => *amount += expense.amount,
            None => keyed.push((key, expense.amount)),
        }
    }
    keyed.sort_by_key(|(key, _)| *key);
    keyed
        .into_iter()
        .map(|((_, month), amount)| (month_label(month), amount))
        .collect()
}

pub fn grand_total(stats: &[CategoryTotal]) -> Decimal {
    stats.iter().map(|s| s.total).sum()
}

pub fn top_category(stats: &[CategoryTotal]) -> Option<&CategoryTotal> {
    stats.iter().max_by_key(|s| s.total)
}

fn month_label(month: u32) -> String {
    NaiveDate::from_ymd_opt(2000, month, 1)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default()
}
