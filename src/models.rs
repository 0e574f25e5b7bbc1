// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Transaction (and category) kind. Budgets only ever track expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Income,
    Expense,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Income => "income",
            TxnType::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "income" => Ok(TxnType::Income),
            "expense" => Ok(TxnType::Expense),
            other => Err(Error::Validation {
                field: "type",
                message: format!("expected 'income' or 'expense', got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
            Period::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            "custom" => Ok(Period::Custom),
            other => Err(Error::Validation {
                field: "period",
                message: format!(
                    "expected one of daily/weekly/monthly/yearly/custom, got '{}'",
                    other
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub currency: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    /// Normalized to lowercase at write time.
    pub name: String,
    pub kind: TxnType,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_default: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub kind: TxnType,
    pub amount: Decimal,
    pub category_id: i64,
    pub description: String,
    pub date: NaiveDate,
    pub tags: Vec<String>,
    pub payment_type: Option<String>,
    pub is_active: bool,
}

/// `spent` and `remaining` are derived by the reconciliation engine (or
/// recomputed on read); they are never set directly by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub is_active: bool,
}

impl Budget {
    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
