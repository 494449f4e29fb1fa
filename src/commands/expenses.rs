// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use crate::models::{Category, Expense, ExpensePatch, NewExpense};
use crate::session::Session;
use crate::utils::{maybe_print_json, parse_amount, parse_date, parse_month, pretty_table};

pub const PAGE_SIZE: usize = 10;

pub fn handle(session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("edit", sub)) => edit(session, sub)?,
        Some(("rm", sub)) => rm(session, sub)?,
        Some(("list", sub)) => list(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let description = sub
        .get_one::<String>("description")
        .unwrap()
        .trim()
        .to_string();
    if description.is_empty() {
        anyhow::bail!("Description is required");
    }
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let category = match sub.get_one::<String>("category") {
        Some(raw) => raw.parse::<Category>()?,
        None => Category::ALL[0],
    };
    let date = match sub.get_one::<String>("date") {
        Some(raw) => parse_date(raw)?.to_string(),
        None => chrono::Local::now().date_naive().to_string(),
    };

    let id = session.create(NewExpense {
        description: description.clone(),
        amount,
        category,
        date: date.clone(),
    })?;
    println!("Recorded {} on {} for '{}' [{}]", amount, date, description, id);
    Ok(())
}

fn edit(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("ID").unwrap();
    let mut patch = ExpensePatch::default();
    if let Some(raw) = sub.get_one::<String>("description") {
        let description = raw.trim();
        if description.is_empty() {
            anyhow::bail!("Description must not be blank");
        }
        patch.description = Some(description.to_string());
    }
    if let Some(raw) = sub.get_one::<String>("amount") {
        patch.amount = Some(parse_amount(raw)?);
    }
    if let Some(raw) = sub.get_one::<String>("category") {
        patch.category = Some(raw.parse::<Category>()?);
    }
    if let Some(raw) = sub.get_one::<String>("date") {
        patch.date = Some(parse_date(raw)?.to_string());
    }
    if patch.is_empty() {
        anyhow::bail!("Nothing to change, pass at least one of --description/--amount/--category/--date");
    }

    session.update(id, patch)?;
    println!("Updated expense {}", id);
    Ok(())
}

fn rm(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("ID").unwrap();
    session.delete(id)?;
    println!("Deleted expense {}", id);
    Ok(())
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: String,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
}

pub struct Page {
    pub rows: Vec<ExpenseRow>,
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

/// Applies the list filters, orders newest-date-first and slices out the
/// requested page.
pub fn page_of(mut expenses: Vec<Expense>, sub: &clap::ArgMatches) -> Result<Page> {
    if let Some(raw) = sub.get_one::<String>("category") {
        let category = raw.parse::<Category>()?;
        expenses.retain(|e| e.category == category);
    }
    if let Some(raw) = sub.get_one::<String>("month") {
        let month = parse_month(raw)?;
        expenses.retain(|e| e.date.starts_with(&month));
    }
    expenses.sort_by(|a, b| b.date.cmp(&a.date));

    let total = expenses.len();
    let page = sub.get_one::<usize>("page").copied().unwrap_or(1).max(1);
    let first_index = (page - 1) * PAGE_SIZE;
    let rows: Vec<ExpenseRow> = expenses
        .into_iter()
        .skip(first_index)
        .take(PAGE_SIZE)
        .map(|e| ExpenseRow {
            id: e.id,
            date: e.date,
            description: e.description,
            category: e.category.to_string(),
            amount: format!("{:.2}", e.amount),
        })
        .collect();
    let first = if rows.is_empty() { 0 } else { first_index + 1 };
    let last = if rows.is_empty() {
        0
    } else {
        first_index + rows.len()
    };
    Ok(Page {
        rows,
        first,
        last,
        total,
    })
}

fn list(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page = page_of(session.expenses(), sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &page.rows)? {
        return Ok(());
    }
    if page.total == 0 {
        println!("No expenses yet");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                r.date.clone(),
                r.description.clone(),
                r.category.clone(),
                r.amount.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Date", "Description", "Category", "Amount"], rows)
    );
    println!(
        "Showing {} to {} of {} expenses",
        page.first, page.last, page.total
    );
    Ok(())
}
