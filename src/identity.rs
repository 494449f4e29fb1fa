// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use uuid::Uuid;

use crate::models::UserIdentity;
use crate::subscription::Subscription;

const CURRENT_USER_KEY: &str = "current_user";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("authentication error: {0}")]
    Backend(#[from] rusqlite::Error),
}

/// Listener invoked with the current identity (or none) on registration and
/// on every transition afterwards.
pub type AuthStateListener = Box<dyn FnMut(Option<&UserIdentity>)>;

pub trait IdentityGateway {
    /// Resolves the named profile, creating it on first use, and makes it
    /// the active session.
    fn sign_in(&self, name: &str) -> Result<UserIdentity, AuthError>;
    fn sign_out(&self) -> Result<(), AuthError>;
    fn current(&self) -> Result<Option<UserIdentity>, AuthError>;
    fn subscribe_auth_state(&self, listener: AuthStateListener)
        -> Result<Subscription, AuthError>;
}

struct ListenerEntry {
    id: u64,
    listener: AuthStateListener,
}

/// Identity backed by local profiles in the `users` table; the active
/// session lives in the `settings` table.
pub struct LocalIdentity {
    conn: Rc<Connection>,
    listeners: Rc<RefCell<Vec<ListenerEntry>>>,
    next_listener_id: Cell<u64>,
}

impl LocalIdentity {
    pub fn new(conn: Rc<Connection>) -> Self {
        LocalIdentity {
            conn,
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener_id: Cell::new(0),
        }
    }

    fn find_by_name(&self, name: &str) -> Result<Option<UserIdentity>, AuthError> {
        let user = self
            .conn
            .query_row(
                "SELECT id, display_name FROM users WHERE display_name=?1",
                params![name],
                |r| {
                    Ok(UserIdentity {
                        id: r.get(0)?,
                        display_name: r.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    // Listeners run while the registry is borrowed, so they must not call
    // back into the gateway.
    fn notify(&self, user: Option<&UserIdentity>) {
        let mut listeners = self.listeners.borrow_mut();
        for entry in listeners.iter_mut() {
            (entry.listener)(user);
        }
    }
}

impl IdentityGateway for LocalIdentity {
    fn sign_in(&self, name: &str) -> Result<UserIdentity, AuthError> {
        let user = match self.find_by_name(name)? {
            Some(user) => user,
            None => {
                let id = Uuid::new_v4().to_string();
                self.conn.execute(
                    "INSERT INTO users(id, display_name) VALUES (?1, ?2)",
                    params![id, name],
                )?;
                UserIdentity {
                    id,
                    display_name: name.to_string(),
                }
            }
        };
        self.conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![CURRENT_USER_KEY, user.id],
        )?;
        self.notify(Some(&user));
        Ok(user)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        self.conn.execute(
            "DELETE FROM settings WHERE key=?1",
            params![CURRENT_USER_KEY],
        )?;
        self.notify(None);
        Ok(())
    }

    fn current(&self) -> Result<Option<UserIdentity>, AuthError> {
        let user_id: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key=?1",
                params![CURRENT_USER_KEY],
                |r| r.get(0),
            )
            .optional()?;
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        let user = self
            .conn
            .query_row(
                "SELECT id, display_name FROM users WHERE id=?1",
                params![user_id],
                |r| {
                    Ok(UserIdentity {
                        id: r.get(0)?,
                        display_name: r.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn subscribe_auth_state(
        &self,
        mut listener: AuthStateListener,
    ) -> Result<Subscription, AuthError> {
        let current = self.current()?;
        listener(current.as_ref());

        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);
        self.listeners
            .borrow_mut()
            .push(ListenerEntry { id, listener });

        let registry = Rc::downgrade(&self.listeners);
        Ok(Subscription::new(move || {
            if let Some(listeners) = registry.upgrade() {
                listeners.borrow_mut().retain(|l| l.id != id);
            }
        }))
    }
}
