// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Category, Expense, ExpensePatch, NewExpense};
use crate::subscription::Subscription;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("expense '{0}' not found")]
    NotFound(String),
    #[error("corrupt expense record '{id}': {reason}")]
    Corrupt { id: String, reason: String },
    #[error("storage error: {0}")]
    Backend(#[from] rusqlite::Error),
}

/// Listener invoked with the full current list of a user's expenses on every
/// change to that collection.
pub type SnapshotListener = Box<dyn FnMut(&[Expense])>;

/// Capability surface of the expense collection. The rest of the crate only
/// talks to this trait, so it can run against any backend that can replay
/// full snapshots.
pub trait ExpenseStore {
    /// Registers `listener` for `user_id` and invokes it immediately with
    /// the current snapshot (an empty collection yields an empty list);
    /// afterwards it fires on every mutation of that user's expenses.
    fn subscribe(
        &self,
        user_id: &str,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError>;

    /// Persists a new record, assigning `id` and `created_at`. The new state
    /// is echoed through active subscriptions; the assigned id is also
    /// returned for convenience.
    fn create(&self, user_id: &str, expense: NewExpense) -> Result<String, StoreError>;

    /// Merges the patch into the record identified by `id`. Unknown ids
    /// report `StoreError::NotFound`.
    fn update(&self, user_id: &str, id: &str, patch: ExpensePatch) -> Result<(), StoreError>;

    /// Removes the record. Deleting an id that does not exist is a no-op.
    fn delete(&self, user_id: &str, id: &str) -> Result<(), StoreError>;
}

struct ListenerEntry {
    id: u64,
    user_id: String,
    listener: SnapshotListener,
}

/// Sqlite-backed store with single-threaded snapshot listeners. Opened over
/// an in-memory connection it doubles as the test fake.
pub struct SqliteStore {
    conn: Rc<Connection>,
    listeners: Rc<RefCell<Vec<ListenerEntry>>>,
    next_listener_id: Cell<u64>,
}

impl SqliteStore {
    pub fn new(conn: Rc<Connection>) -> Self {
        SqliteStore {
            conn,
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener_id: Cell::new(0),
        }
    }

    fn load_snapshot(&self, user_id: &str) -> Result<Vec<Expense>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, amount, category, date, created_at
             FROM expenses WHERE user_id=?1 ORDER BY date, created_at",
        )?;
        let mut rows = stmt.query(params![user_id])?;
        let mut snapshot = Vec::new();
        while let Some(r) = rows.next()? {
            let id: String = r.get(0)?;
            let description: String = r.get(1)?;
            let amount_s: String = r.get(2)?;
            let category_s: String = r.get(3)?;
            let date: String = r.get(4)?;
            let created_s: String = r.get(5)?;
            let amount = amount_s.parse::<Decimal>().map_err(|e| StoreError::Corrupt {
                id: id.clone(),
                reason: format!("amount '{}': {}", amount_s, e),
            })?;
            let category = category_s
                .parse::<Category>()
                .map_err(|e| StoreError::Corrupt {
                    id: id.clone(),
                    reason: e.to_string(),
                })?;
            let created_at = DateTime::parse_from_rfc3339(&created_s)
                .map_err(|e| StoreError::Corrupt {
                    id: id.clone(),
                    reason: format!("created_at '{}': {}", created_s, e),
                })?
                .with_timezone(&Utc);
            snapshot.push(Expense {
                id,
                description,
                amount,
                category,
                date,
                created_at,
            });
        }
        Ok(snapshot)
    }

    // Listeners run while the registry is borrowed, so they must not call
    // back into the store.
    fn notify(&self, user_id: &str) -> Result<(), StoreError> {
        let snapshot = self.load_snapshot(user_id)?;
        let mut listeners = self.listeners.borrow_mut();
        for entry in listeners.iter_mut().filter(|l| l.user_id == user_id) {
            (entry.listener)(&snapshot);
        }
        Ok(())
    }
}

impl ExpenseStore for SqliteStore {
    fn subscribe(
        &self,
        user_id: &str,
        mut listener: SnapshotListener,
    ) -> Result<Subscription, StoreError> {
        let snapshot = self.load_snapshot(user_id)?;
        listener(&snapshot);

        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);
        self.listeners.borrow_mut().push(ListenerEntry {
            id,
            user_id: user_id.to_string(),
            listener,
        });

        let registry = Rc::downgrade(&self.listeners);
        Ok(Subscription::new(move || {
            if let Some(listeners) = registry.upgrade() {
                listeners.borrow_mut().retain(|l| l.id != id);
            }
        }))
    }

    fn create(&self, user_id: &str, expense: NewExpense) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO expenses(id, user_id, description, amount, category, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                user_id,
                expense.description,
                expense.amount.to_string(),
                expense.category.as_str(),
                expense.date,
                created_at
            ],
        )?;
        self.notify(user_id)?;
        Ok(id)
    }

    fn update(&self, user_id: &str, id: &str, patch: ExpensePatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(description) = patch.description {
            sets.push("description=?");
            values.push(description);
        }
        if let Some(amount) = patch.amount {
            sets.push("amount=?");
            values.push(amount.to_string());
        }
        if let Some(category) = patch.category {
            sets.push("category=?");
            values.push(category.as_str().to_string());
        }
        if let Some(date) = patch.date {
            sets.push("date=?");
            values.push(date);
        }
        let sql = format!(
            "UPDATE expenses SET {} WHERE user_id=? AND id=?",
            sets.join(", ")
        );
        values.push(user_id.to_string());
        values.push(id.to_string());
        let changed = self
            .conn
            .execute(&sql, rusqlite::params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.notify(user_id)
    }

    fn delete(&self, user_id: &str, id: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM expenses WHERE user_id=?1 AND id=?2",
            params![user_id, id],
        )?;
        self.notify(user_id)
    }
}
