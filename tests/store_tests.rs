// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::RefCell;
use std::rc::Rc;

use rusqlite::Connection;
use rust_decimal::Decimal;
use spendlog::db;
use spendlog::models::{Category, Expense, ExpensePatch, NewExpense};
use spendlog::store::{ExpenseStore, SqliteStore, StoreError};

fn setup() -> SqliteStore {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO users(id, display_name) VALUES ('u1', 'Asha'), ('u2', 'Bo')",
        [],
    )
    .unwrap();
    SqliteStore::new(Rc::new(conn))
}

fn new_expense(description: &str, amount: i64, date: &str) -> NewExpense {
    NewExpense {
        description: description.into(),
        amount: Decimal::from(amount),
        category: Category::Basics,
        date: date.into(),
    }
}

type Snapshots = Rc<RefCell<Vec<Vec<Expense>>>>;

fn recording_listener(snapshots: &Snapshots) -> Box<dyn FnMut(&[Expense])> {
    let snapshots = Rc::clone(snapshots);
    Box::new(move |expenses| snapshots.borrow_mut().push(expenses.to_vec()))
}

#[test]
fn subscribe_fires_immediately_with_an_empty_snapshot() {
    let store = setup();
    let snapshots: Snapshots = Rc::default();
    let _sub = store.subscribe("u1", recording_listener(&snapshots)).unwrap();

    let seen = snapshots.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_empty());
}

#[test]
fn create_echoes_through_the_subscription() {
    let store = setup();
    let snapshots: Snapshots = Rc::default();
    let _sub = store.subscribe("u1", recording_listener(&snapshots)).unwrap();

    let id = store
        .create("u1", new_expense("coffee", 4, "2025-03-01"))
        .unwrap();

    let seen = snapshots.borrow();
    assert_eq!(seen.len(), 2);
    let last = &seen[1];
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].id, id);
    assert_eq!(last[0].description, "coffee");
    assert_eq!(last[0].amount, Decimal::from(4));
    assert_eq!(last[0].category, Category::Basics);
    assert_eq!(last[0].date, "2025-03-01");
}

#[test]
fn update_merges_fields_and_preserves_id_and_created_at() {
    let store = setup();
    let snapshots: Snapshots = Rc::default();
    let _sub = store.subscribe("u1", recording_listener(&snapshots)).unwrap();

    let id = store
        .create("u1", new_expense("groceries", 60, "2025-03-02"))
        .unwrap();
    let created_at = snapshots.borrow().last().unwrap()[0].created_at;

    store
        .update(
            "u1",
            &id,
            ExpensePatch {
                amount: Some(Decimal::from(75)),
                category: Some(Category::Necessities),
                ..Default::default()
            },
        )
        .unwrap();

    let seen = snapshots.borrow();
    let last = &seen.last().unwrap()[0];
    assert_eq!(last.id, id);
    assert_eq!(last.created_at, created_at);
    assert_eq!(last.amount, Decimal::from(75));
    assert_eq!(last.category, Category::Necessities);
    // Untouched fields survive the merge.
    assert_eq!(last.description, "groceries");
    assert_eq!(last.date, "2025-03-02");
}

#[test]
fn update_unknown_id_reports_not_found() {
    let store = setup();
    let err = store
        .update(
            "u1",
            "missing",
            ExpensePatch {
                amount: Some(Decimal::from(1)),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn delete_removes_the_record_and_tolerates_unknown_ids() {
    let store = setup();
    let snapshots: Snapshots = Rc::default();
    let _sub = store.subscribe("u1", recording_listener(&snapshots)).unwrap();

    let id = store
        .create("u1", new_expense("lunch", 12, "2025-03-03"))
        .unwrap();
    store.delete("u1", &id).unwrap();

    let seen = snapshots.borrow();
    assert!(seen.last().unwrap().iter().all(|e| e.id != id));
    drop(seen);

    store.delete("u1", "missing").unwrap();
}

#[test]
fn cancelled_subscription_stops_callbacks() {
    let store = setup();
    let snapshots: Snapshots = Rc::default();
    let sub = store.subscribe("u1", recording_listener(&snapshots)).unwrap();
    sub.cancel();

    store
        .create("u1", new_expense("unseen", 5, "2025-03-04"))
        .unwrap();
    assert_eq!(snapshots.borrow().len(), 1);
}

#[test]
fn snapshots_are_scoped_per_user() {
    let store = setup();
    let snapshots: Snapshots = Rc::default();
    let _sub = store.subscribe("u1", recording_listener(&snapshots)).unwrap();

    store
        .create("u2", new_expense("not mine", 9, "2025-03-05"))
        .unwrap();

    // Another user's mutation neither fires our listener nor leaks records.
    let seen = snapshots.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_empty());
}
