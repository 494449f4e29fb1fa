// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::rc::Rc;

use rusqlite::Connection;
use rust_decimal::Decimal;
use spendlog::identity::LocalIdentity;
use spendlog::models::{Category, NewExpense};
use spendlog::session::Session;
use spendlog::store::SqliteStore;
use spendlog::{cli, commands::exporter, db};
use tempfile::tempdir;

fn session_with_expenses() -> Session {
    let conn = Rc::new(Connection::open_in_memory().unwrap());
    db::init_schema(&conn).unwrap();
    let store = Rc::new(SqliteStore::new(Rc::clone(&conn)));
    let identity = Rc::new(LocalIdentity::new(Rc::clone(&conn)));
    let session = Session::new(identity, store);
    session.start().unwrap();
    session.sign_in("Asha").unwrap();

    for (date, description, amount, category) in [
        ("2025-01-05", "weekly groceries", Decimal::new(4250, 2), Category::Necessities),
        (
            "2025-02-14",
            "dinner, \"chez nous\"",
            Decimal::new(8800, 2),
            Category::Comforts,
        ),
        ("2025-02-01", "bus pass", Decimal::from(20), Category::Basics),
    ] {
        session
            .create(NewExpense {
                description: description.into(),
                amount,
                category,
                date: date.into(),
            })
            .unwrap();
    }
    session
}

fn export_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["spendlog", "export", "expenses"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    export_m.clone()
}

#[test]
fn csv_round_trips_newest_first_with_two_decimal_amounts() {
    let session = session_with_expenses();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let export_m = export_matches(&["--format", "csv", "--out", &out_str]);
    exporter::handle(&session, &export_m).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    assert_eq!(
        rdr.headers().unwrap(),
        &csv::StringRecord::from(vec!["Date", "Description", "Category", "Amount"])
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);

    // Newest date first, fields reproduced exactly, amounts at two decimals.
    assert_eq!(
        (&rows[0][0], &rows[0][1], &rows[0][2], &rows[0][3]),
        ("2025-02-14", "dinner, \"chez nous\"", "comforts", "88.00")
    );
    assert_eq!(
        (&rows[1][0], &rows[1][1], &rows[1][2], &rows[1][3]),
        ("2025-02-01", "bus pass", "basics", "20.00")
    );
    assert_eq!(
        (&rows[2][0], &rows[2][1], &rows[2][2], &rows[2][3]),
        ("2025-01-05", "weekly groceries", "necessities", "42.50")
    );
}

#[test]
fn quotes_inside_descriptions_are_doubled_on_disk() {
    let session = session_with_expenses();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    exporter::handle(&session, &export_matches(&["--format", "csv", "--out", &out_str])).unwrap();

    let raw = std::fs::read_to_string(&out_path).unwrap();
    assert!(raw.contains("\"dinner, \"\"chez nous\"\"\""));
}

#[test]
fn json_export_serializes_the_full_records() {
    let session = session_with_expenses();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    exporter::handle(&session, &export_matches(&["--format", "json", "--out", &out_str])).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["date"], "2025-02-14");
    assert_eq!(items[0]["category"], "comforts");
    assert!(items[0]["id"].as_str().is_some());
}

#[test]
fn unknown_format_is_rejected_without_output() {
    let session = session_with_expenses();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let export_m = export_matches(&["--format", "xml", "--out", &out_str]);
    assert!(exporter::handle(&session, &export_m).is_err());
    assert!(!out_path.exists());
}
