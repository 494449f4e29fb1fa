// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::rc::Rc;

use rusqlite::Connection;
use rust_decimal::Decimal;
use spendlog::db;
use spendlog::identity::{AuthError, LocalIdentity};
use spendlog::models::{Category, NewExpense};
use spendlog::session::{Session, SessionError};
use spendlog::store::{ExpenseStore, SqliteStore};

fn setup() -> (Rc<SqliteStore>, Session) {
    let conn = Rc::new(Connection::open_in_memory().unwrap());
    db::init_schema(&conn).unwrap();
    let store = Rc::new(SqliteStore::new(Rc::clone(&conn)));
    let identity = Rc::new(LocalIdentity::new(Rc::clone(&conn)));
    let session = Session::new(identity, Rc::clone(&store) as Rc<dyn ExpenseStore>);
    session.start().unwrap();
    (store, session)
}

fn new_expense(description: &str, amount: i64, date: &str) -> NewExpense {
    NewExpense {
        description: description.into(),
        amount: Decimal::from(amount),
        category: Category::Comforts,
        date: date.into(),
    }
}

#[test]
fn mutations_are_refused_while_signed_out() {
    let (_store, session) = setup();
    assert!(session.user().is_none());
    let err = session
        .create(new_expense("no user", 1, "2025-04-01"))
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Auth(AuthError::NotSignedIn)
    ));
}

#[test]
fn sign_in_establishes_a_live_snapshot() {
    let (_store, session) = setup();
    let user = session.sign_in("Asha").unwrap();
    assert_eq!(session.user().unwrap().id, user.id);
    assert!(session.expenses().is_empty());

    session
        .create(new_expense("cinema", 18, "2025-04-02"))
        .unwrap();
    let expenses = session.expenses();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].description, "cinema");
}

#[test]
fn switching_users_swaps_the_snapshot() {
    let (_store, session) = setup();
    session.sign_in("Asha").unwrap();
    session
        .create(new_expense("hers", 10, "2025-04-03"))
        .unwrap();
    session
        .create(new_expense("hers too", 20, "2025-04-04"))
        .unwrap();
    assert_eq!(session.expenses().len(), 2);

    session.sign_in("Bo").unwrap();
    assert!(session.expenses().is_empty());
    session
        .create(new_expense("theirs", 5, "2025-04-05"))
        .unwrap();
    assert_eq!(session.expenses().len(), 1);

    session.sign_in("Asha").unwrap();
    assert_eq!(session.expenses().len(), 2);
}

#[test]
fn sign_out_clears_state_and_stops_tracking() {
    let (store, session) = setup();
    let user = session.sign_in("Asha").unwrap();
    session
        .create(new_expense("before", 7, "2025-04-06"))
        .unwrap();
    assert_eq!(session.expenses().len(), 1);

    session.sign_out().unwrap();
    assert!(session.user().is_none());
    assert!(session.expenses().is_empty());

    // The old subscription is gone: direct store writes no longer reach us.
    store
        .create(&user.id, new_expense("after", 8, "2025-04-07"))
        .unwrap();
    assert!(session.expenses().is_empty());
}

#[test]
fn shutdown_cancels_the_subscriptions() {
    let (store, session) = setup();
    let user = session.sign_in("Asha").unwrap();
    session
        .create(new_expense("tracked", 3, "2025-04-08"))
        .unwrap();
    assert_eq!(session.expenses().len(), 1);

    session.shutdown();
    store
        .create(&user.id, new_expense("untracked", 4, "2025-04-09"))
        .unwrap();
    assert_eq!(session.expenses().len(), 1);
}

#[test]
fn edits_flow_back_into_the_snapshot() {
    let (_store, session) = setup();
    session.sign_in("Asha").unwrap();
    let id = session
        .create(new_expense("typo", 30, "2025-04-10"))
        .unwrap();

    session
        .update(
            &id,
            spendlog::models::ExpensePatch {
                description: Some("fixed".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(session.expenses()[0].description, "fixed");

    session.delete(&id).unwrap();
    assert!(session.expenses().is_empty());
}
