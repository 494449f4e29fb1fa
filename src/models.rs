// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound accepted for a single expense amount, enforced at the input
/// edge only.
pub static MAX_EXPENSE_AMOUNT: Lazy<Decimal> = Lazy::new(|| Decimal::from(1_000_000));

/// Closed set of spending classifications. Free text from the outside world
/// is parsed into this enum at the input edge; everything downstream matches
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Necessities,
    Basics,
    Comforts,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Necessities, Category::Basics, Category::Comforts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Necessities => "necessities",
            Category::Basics => "basics",
            Category::Comforts => "comforts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown category '{0}', expected one of: necessities, basics, comforts")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "necessities" => Ok(Category::Necessities),
            "basics" => Ok(Category::Basics),
            "comforts" => Ok(Category::Comforts),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// A single recorded spending entry. `id` and `created_at` are assigned by
/// the store and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
    /// Calendar date as stored, expected `YYYY-MM-DD`. Kept as text: the
    /// store does not enforce the format, and derived views skip values they
    /// cannot interpret instead of failing.
    pub date: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an expense; the store fills in `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
    pub date: String,
}

/// Field-wise merge applied to an existing expense. `id` and `created_at`
/// are not patchable.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<Category>,
    pub date: Option<String>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub display_name: String,
}
