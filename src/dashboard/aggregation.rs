//! Transaction data aggregation for the dashboard.
//!
//! Everything here is a single linear pass over the fetched transaction list,
//! building running sums keyed by category or month.

use std::collections::HashMap;

use time::Date;

use crate::{
    category::Category,
    transaction::{Transaction, TransactionType, UNCATEGORIZED_LABEL, category_label, category_names},
};

/// Overall income and expense running sums.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct Summary {
    pub income: f64,
    pub expense: f64,
}

impl Summary {
    /// What is left after expenses.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// Income and expense running sums for one month.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct MonthTotals {
    pub income: f64,
    pub expense: f64,
}

/// Sum income and expense amounts over all transactions.
pub(super) fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();

    for transaction in transactions {
        match transaction.kind {
            TransactionType::Income => summary.income += transaction.amount,
            TransactionType::Expense => summary.expense += transaction.amount,
        }
    }

    summary
}

/// Sum expense amounts per category name.
///
/// Transactions without a category, or whose category reference no longer
/// resolves, are labeled "Uncategorized". The result is sorted by name with
/// "Uncategorized" last.
pub(super) fn expense_totals_by_category(
    transactions: &[Transaction],
    categories: &[Category],
) -> Vec<(String, f64)> {
    let names = category_names(categories);
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionType::Expense {
            continue;
        }

        let label = category_label(transaction.category, &names);
        *totals.entry(label).or_insert(0.0) += transaction.amount;
    }

    let mut sorted: Vec<(String, f64)> = totals
        .iter()
        .filter(|(label, _)| **label != UNCATEGORIZED_LABEL)
        .map(|(label, total)| (label.to_string(), *total))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(total) = totals.get(UNCATEGORIZED_LABEL) {
        sorted.push((UNCATEGORIZED_LABEL.to_owned(), *total));
    }

    sorted
}

/// Sum income and expense amounts per month, in chronological order.
///
/// Each month is represented by the first day of that month.
pub(super) fn monthly_totals(transactions: &[Transaction]) -> Vec<(Date, MonthTotals)> {
    let mut totals: HashMap<Date, MonthTotals> = HashMap::new();

    for transaction in transactions {
        let month = transaction.date.replace_day(1).unwrap();
        let entry = totals.entry(month).or_default();

        match transaction.kind {
            TransactionType::Income => entry.income += transaction.amount,
            TransactionType::Expense => entry.expense += transaction.amount,
        }
    }

    let mut sorted: Vec<(Date, MonthTotals)> = totals.into_iter().collect();
    sorted.sort_by_key(|(month, _)| *month);
    sorted
}

/// Format a month as a chart label, e.g. "Jan 2024".
pub(super) fn month_label(month: Date) -> String {
    use time::Month;

    let month_name = match month.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{} {}", month_name, month.year())
}
