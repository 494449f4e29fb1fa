// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived views over an expense snapshot.
//!
//! Everything here is a pure function of its arguments: no clock access, no
//! mutation of the input, no failure paths. Records the functions cannot
//! interpret (dates missing a month component) contribute nothing instead of
//! aborting the whole computation.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Category, Expense};

const HEATMAP_MONTHS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    /// `YYYY-MM` key the bucket aggregates.
    pub month: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    /// Full date, kept for tooltips and exports.
    pub date: String,
    /// Day-of-month display label.
    pub day: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapBucket {
    pub month: String,
    /// Short month name for display ("Jan"), or the raw key when the key is
    /// not a well-formed year-month.
    pub label: String,
    pub year: i32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub buckets: Vec<HeatmapBucket>,
    /// Mean over buckets strictly before the current month with amount > 0;
    /// zero when no such bucket exists.
    pub average_completed_monthly: Decimal,
}

pub fn total_of(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

/// Per-category sums in category declaration order. Categories with no
/// expense in the input do not appear; a zero-amount expense still earns its
/// category a bucket.
pub fn category_totals_of(expenses: &[Expense]) -> Vec<CategoryTotal> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let mut seen = false;
            let mut total = Decimal::ZERO;
            for e in expenses.iter().filter(|e| e.category == category) {
                seen = true;
                total += e.amount;
            }
            seen.then_some(CategoryTotal { category, total })
        })
        .collect()
}

/// Sum per `YYYY-MM` prefix, ascending by year-month. Dates with fewer than
/// two `-`-separated components are skipped.
pub fn monthly_series_of(expenses: &[Expense]) -> Vec<MonthBucket> {
    let mut map: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in expenses {
        if let Some(month) = month_key(&e.date) {
            *map.entry(month).or_insert(Decimal::ZERO) += e.amount;
        }
    }
    map.into_iter()
        .map(|(month, amount)| MonthBucket { month, amount })
        .collect()
}

/// Sum per exact date within `today`'s calendar month, ascending.
pub fn current_month_daily_series_of(expenses: &[Expense], today: NaiveDate) -> Vec<DayBucket> {
    let prefix = month_prefix(today);
    let mut map: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in expenses.iter().filter(|e| e.date.starts_with(&prefix)) {
        *map.entry(e.date.clone()).or_insert(Decimal::ZERO) += e.amount;
    }
    map.into_iter()
        .map(|(date, amount)| {
            let day = date
                .split('-')
                .nth(2)
                .and_then(|d| d.parse::<u32>().ok())
                .map(|d| d.to_string())
                .unwrap_or_else(|| date.clone());
            DayBucket { date, day, amount }
        })
        .collect()
}

pub fn current_month_total_of(expenses: &[Expense], today: NaiveDate) -> Decimal {
    let prefix = month_prefix(today);
    expenses
        .iter()
        .filter(|e| e.date.starts_with(&prefix))
        .map(|e| e.amount)
        .sum()
}

/// The last 12 months of the monthly series. Sparse real data is not padded
/// with synthetic zero months; only a collection with no usable data at all
/// yields a rolling empty 12-month window ending at `today`'s month.
pub fn heatmap_of(expenses: &[Expense], today: NaiveDate) -> Heatmap {
    let series = monthly_series_of(expenses);
    let buckets: Vec<HeatmapBucket> = if series.is_empty() {
        rolling_empty_window(today)
    } else {
        let start = series.len().saturating_sub(HEATMAP_MONTHS);
        series[start..]
            .iter()
            .map(|b| heatmap_bucket(&b.month, b.amount))
            .collect()
    };

    let current = month_prefix(today);
    let completed: Vec<Decimal> = buckets
        .iter()
        .filter(|b| b.month.as_str() < current.as_str() && b.amount > Decimal::ZERO)
        .map(|b| b.amount)
        .collect();
    let average_completed_monthly = if completed.is_empty() {
        Decimal::ZERO
    } else {
        completed.iter().copied().sum::<Decimal>() / Decimal::from(completed.len() as u64)
    };

    Heatmap {
        buckets,
        average_completed_monthly,
    }
}

fn month_key(date: &str) -> Option<String> {
    let mut parts = date.splitn(3, '-');
    let year = parts.next()?;
    let month = parts.next()?;
    Some(format!("{}-{}", year, month))
}

fn month_prefix(today: NaiveDate) -> String {
    format!("{:04}-{:02}", today.year(), today.month())
}

fn heatmap_bucket(month: &str, amount: Decimal) -> HeatmapBucket {
    let parsed = parse_month_key(month)
        .and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1).map(|first| (y, first)));
    let (label, year) = match parsed {
        Some((y, first)) => (first.format("%b").to_string(), y),
        None => (month.to_string(), 0),
    };
    HeatmapBucket {
        month: month.to_string(),
        label,
        year,
        amount,
    }
}

fn parse_month_key(month: &str) -> Option<(i32, u32)> {
    let mut parts = month.splitn(2, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    (1..=12).contains(&m).then_some((year, m))
}

fn rolling_empty_window(today: NaiveDate) -> Vec<HeatmapBucket> {
    let mut year = today.year();
    let mut month = today.month();
    let mut keys = Vec::with_capacity(HEATMAP_MONTHS);
    for _ in 0..HEATMAP_MONTHS {
        keys.push(format!("{:04}-{:02}", year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    keys.reverse();
    keys.iter()
        .map(|k| heatmap_bucket(k, Decimal::ZERO))
        .collect()
}
