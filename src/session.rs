// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::identity::{AuthError, IdentityGateway};
use crate::models::{Expense, ExpensePatch, NewExpense, UserIdentity};
use crate::store::{ExpenseStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Default)]
struct SessionState {
    user: Option<UserIdentity>,
    expenses: Vec<Expense>,
    store_sub: Option<crate::subscription::Subscription>,
    auth_sub: Option<crate::subscription::Subscription>,
}

/// Single owner of the mutable app state for one sitting: the signed-in
/// identity, the latest expense snapshot, and the live subscriptions that
/// keep both fresh. Mutations go through here so they can be refused while
/// signed out; reads see whatever the store last emitted.
pub struct Session {
    identity: Rc<dyn IdentityGateway>,
    store: Rc<dyn ExpenseStore>,
    state: Rc<RefCell<SessionState>>,
}

impl Session {
    pub fn new(identity: Rc<dyn IdentityGateway>, store: Rc<dyn ExpenseStore>) -> Self {
        Session {
            identity,
            store,
            state: Rc::new(RefCell::new(SessionState::default())),
        }
    }

    /// Wires the auth listener. On every identity transition the previous
    /// expense subscription is cancelled before the new one is established,
    /// so snapshots can never arrive for a stale user.
    pub fn start(&self) -> Result<(), AuthError> {
        let state = Rc::clone(&self.state);
        let store = Rc::clone(&self.store);
        let auth_sub = self.identity.subscribe_auth_state(Box::new(move |user| {
            let prev = {
                let mut st = state.borrow_mut();
                st.user = user.cloned();
                st.expenses.clear();
                st.store_sub.take()
            };
            if let Some(sub) = prev {
                sub.cancel();
            }
            let user_id = match state.borrow().user.as_ref() {
                Some(u) => u.id.clone(),
                None => return,
            };
            let snap_state = Rc::clone(&state);
            let subscribed = store.subscribe(
                &user_id,
                Box::new(move |expenses| {
                    snap_state.borrow_mut().expenses = expenses.to_vec();
                }),
            );
            match subscribed {
                Ok(sub) => state.borrow_mut().store_sub = Some(sub),
                Err(err) => eprintln!("Expense subscription failed: {}", err),
            }
        }))?;
        self.state.borrow_mut().auth_sub = Some(auth_sub);
        Ok(())
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.state.borrow().user.clone()
    }

    /// The last snapshot the store emitted for the signed-in user.
    pub fn expenses(&self) -> Vec<Expense> {
        self.state.borrow().expenses.clone()
    }

    pub fn sign_in(&self, name: &str) -> Result<UserIdentity, AuthError> {
        self.identity.sign_in(name)
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.identity.sign_out()
    }

    pub fn create(&self, expense: NewExpense) -> Result<String, SessionError> {
        let user = self.require_user()?;
        Ok(self.store.create(&user.id, expense)?)
    }

    pub fn update(&self, id: &str, patch: ExpensePatch) -> Result<(), SessionError> {
        let user = self.require_user()?;
        Ok(self.store.update(&user.id, id, patch)?)
    }

    pub fn delete(&self, id: &str) -> Result<(), SessionError> {
        let user = self.require_user()?;
        Ok(self.store.delete(&user.id, id)?)
    }

    /// Cancels both subscriptions; the session stops tracking changes.
    pub fn shutdown(&self) {
        let (auth_sub, store_sub) = {
            let mut st = self.state.borrow_mut();
            (st.auth_sub.take(), st.store_sub.take())
        };
        if let Some(sub) = store_sub {
            sub.cancel();
        }
        if let Some(sub) = auth_sub {
            sub.cancel();
        }
    }

    fn require_user(&self) -> Result<UserIdentity, AuthError> {
        self.state
            .borrow()
            .user
            .clone()
            .ok_or(AuthError::NotSignedIn)
    }
}
