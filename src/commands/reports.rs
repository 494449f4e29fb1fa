// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::session::Session;
use crate::stats;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(session: &Session, m: &clap::ArgMatches) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    match m.subcommand() {
        Some(("summary", sub)) => summary(session, sub, today)?,
        Some(("monthly", sub)) => monthly(session, sub)?,
        Some(("daily", sub)) => daily(session, sub, today)?,
        Some(("heatmap", sub)) => heatmap(session, sub, today)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct Summary {
    total: rust_decimal::Decimal,
    current_month: rust_decimal::Decimal,
    categories: Vec<stats::CategoryTotal>,
}

fn summary(session: &Session, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let expenses = session.expenses();
    let summary = Summary {
        total: stats::total_of(&expenses),
        current_month: stats::current_month_total_of(&expenses, today),
        categories: stats::category_totals_of(&expenses),
    };
    if maybe_print_json(json_flag, jsonl_flag, &summary)? {
        return Ok(());
    }

    println!("Total: {:.2}", summary.total);
    println!(
        "{} expenses: {:.2}",
        today.format("%B"),
        summary.current_month
    );
    if summary.categories.is_empty() {
        println!("No expenses yet");
    } else {
        let rows = summary
            .categories
            .iter()
            .map(|c| vec![c.category.to_string(), format!("{:.2}", c.total)])
            .collect();
        println!("{}", pretty_table(&["Category", "Total"], rows));
    }
    Ok(())
}

fn monthly(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let series = stats::monthly_series_of(&session.expenses());
    if maybe_print_json(json_flag, jsonl_flag, &series)? {
        return Ok(());
    }
    let rows = series
        .iter()
        .map(|b| vec![b.month.clone(), format!("{:.2}", b.amount)])
        .collect();
    println!("{}", pretty_table(&["Month", "Total"], rows));
    Ok(())
}

fn daily(session: &Session, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let series = stats::current_month_daily_series_of(&session.expenses(), today);
    if maybe_print_json(json_flag, jsonl_flag, &series)? {
        return Ok(());
    }
    let rows = series
        .iter()
        .map(|b| vec![b.day.clone(), b.date.clone(), format!("{:.2}", b.amount)])
        .collect();
    println!("{}", pretty_table(&["Day", "Date", "Amount"], rows));
    Ok(())
}

fn heatmap(session: &Session, sub: &clap::ArgMatches, today: NaiveDate) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let heatmap = stats::heatmap_of(&session.expenses(), today);
    if maybe_print_json(json_flag, jsonl_flag, &heatmap)? {
        return Ok(());
    }
    let rows = heatmap
        .buckets
        .iter()
        .map(|b| {
            vec![
                b.label.clone(),
                b.year.to_string(),
                format!("{:.2}", b.amount),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Year", "Total"], rows));
    println!(
        "Average completed month: {:.2}",
        heatmap.average_completed_monthly
    );
    Ok(())
}
