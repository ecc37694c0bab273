//! The summary cards shown above the dashboard charts.

use maud::{Markup, html};

use crate::{dashboard::aggregation::Summary, html::format_currency};

fn card(title: &str, amount: f64, color_style: &str) -> Markup {
    html! {
        div class={ "p-6 rounded-xl shadow-lg text-center " (color_style) }
        {
            h2 class="text-lg font-semibold" { (title) }

            p class="text-2xl font-bold" { (format_currency(amount)) }
        }
    }
}

/// Render the Income, Expenses, and Balance cards.
pub(super) fn summary_cards(summary: &Summary) -> Markup {
    html! {
        div class="grid grid-cols-1 sm:grid-cols-3 gap-6 mb-10 w-full"
        {
            (card(
                "Income",
                summary.income,
                "bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-200",
            ))
            (card(
                "Expenses",
                summary.expense,
                "bg-red-100 text-red-800 dark:bg-red-900 dark:text-red-200",
            ))
            (card(
                "Balance",
                summary.balance(),
                "bg-blue-100 text-blue-800 dark:bg-blue-900 dark:text-blue-200",
            ))
        }
    }
}
