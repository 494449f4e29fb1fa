// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use crate::models::Expense;
use crate::session::Session;

pub fn handle(session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => export_expenses(session, sub),
        _ => Ok(()),
    }
}

fn export_expenses(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = match sub.get_one::<String>("out") {
        Some(path) => path.clone(),
        None => format!(
            "expenses_{}.{}",
            chrono::Local::now().date_naive(),
            if fmt == "json" { "json" } else { "csv" }
        ),
    };

    let mut expenses = session.expenses();
    expenses.sort_by(|a, b| b.date.cmp(&a.date));

    match fmt.as_str() {
        "csv" => write_csv(&expenses, &out)?,
        "json" => std::fs::write(&out, serde_json::to_string_pretty(&expenses)?)?,
        other => anyhow::bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported {} expenses to {}", expenses.len(), out);
    Ok(())
}

/// CSV shape expected by downstream spreadsheets: fixed header, amounts with
/// exactly two decimals, embedded quotes doubled by the writer.
fn write_csv(expenses: &[Expense], out: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
    wtr.write_record(["Date", "Description", "Category", "Amount"])?;
    for e in expenses {
        let amount = format!("{:.2}", e.amount);
        wtr.write_record([
            e.date.as_str(),
            e.description.as_str(),
            e.category.as_str(),
            amount.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
