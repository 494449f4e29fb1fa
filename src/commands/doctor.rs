// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::models::{Category, MAX_EXPENSE_AMOUNT};
use crate::utils::pretty_table;

/// The schema keeps amount/category/date as free text, so rows written by
/// other tools can drift; this reports anything the app itself would have
/// refused at the input edge.
pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    let mut stmt =
        conn.prepare("SELECT id, amount, category, date FROM expenses ORDER BY date, id")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: String = r.get(0)?;
        let amount: String = r.get(1)?;
        let category: String = r.get(2)?;
        let date: String = r.get(3)?;

        match amount.parse::<Decimal>() {
            Ok(a) if a < Decimal::ZERO => {
                rows.push(vec!["negative_amount".into(), format!("{} {}", id, amount)])
            }
            Ok(a) if a > *MAX_EXPENSE_AMOUNT => rows.push(vec![
                "amount_over_ceiling".into(),
                format!("{} {}", id, amount),
            ]),
            Ok(_) => {}
            Err(_) => rows.push(vec!["bad_amount".into(), format!("{} '{}'", id, amount)]),
        }
        if category.parse::<Category>().is_err() {
            rows.push(vec![
                "unknown_category".into(),
                format!("{} '{}'", id, category),
            ]);
        }
        if chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
            rows.push(vec!["bad_date".into(), format!("{} '{}'", id, date)]);
        }
    }

    // Rows owned by nobody we know about (imported or pre-FK data).
    let mut stmt2 = conn.prepare("SELECT DISTINCT user_id FROM expenses EXCEPT SELECT id FROM users")?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let user_id: String = r.get(0)?;
        rows.push(vec!["expense_user_unknown".into(), user_id]);
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
