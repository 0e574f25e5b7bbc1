// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistence gateway: the typed queries the lifecycle managers and the
//! reconciliation engine run against SQLite. Amounts are stored as decimal
//! TEXT and parsed into `rust_decimal::Decimal`, so sums never touch floats.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::errors::Error;
use crate::models::{Budget, Category, Period, Transaction, TxnType, User};

fn decimal_col(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn txn_type_col(row: &Row, idx: usize) -> rusqlite::Result<TxnType> {
    let s: String = row.get(idx)?;
    TxnType::parse(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn period_col(row: &Row, idx: usize) -> rusqlite::Result<Period> {
    let s: String = row.get(idx)?;
    Period::parse(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn tags_col(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let s: Option<String> = row.get(idx)?;
    match s {
        None => Ok(Vec::new()),
        Some(s) => serde_json::from_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

pub(crate) fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        currency: row.get(3)?,
        timezone: row.get(4)?,
    })
}

pub(crate) fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        kind: txn_type_col(row, 3)?,
        icon: row.get(4)?,
        color: row.get(5)?,
        is_default: row.get(6)?,
        is_active: row.get(7)?,
    })
}

pub(crate) fn txn_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: txn_type_col(row, 2)?,
        amount: decimal_col(row, 3)?,
        category_id: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        tags: tags_col(row, 7)?,
        payment_type: row.get(8)?,
        is_active: row.get(9)?,
    })
}

pub(crate) fn budget_from_row(row: &Row) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category_id: row.get(2)?,
        amount: decimal_col(row, 3)?,
        period: period_col(row, 4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        spent: decimal_col(row, 7)?,
        remaining: decimal_col(row, 8)?,
        is_active: row.get(9)?,
    })
}

pub(crate) const TXN_COLS: &str =
    "id, user_id, type, amount, category_id, description, date, tags, payment_type, is_active";
pub(crate) const BUDGET_COLS: &str =
    "id, user_id, category_id, amount, period, start_date, end_date, spent, remaining, is_active";
pub(crate) const CATEGORY_COLS: &str =
    "id, user_id, name, type, icon, color, is_default, is_active";

/// The active budget for (user, category) whose inclusive window contains
/// `date`. The non-overlap invariant should make the match unique; if the
/// data violates it, the lowest id wins.
pub fn find_active_budget(
    conn: &Connection,
    user_id: i64,
    category_id: i64,
    date: NaiveDate,
) -> Result<Option<Budget>, Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BUDGET_COLS} FROM budgets
         WHERE user_id=?1 AND category_id=?2 AND is_active=1
           AND start_date<=?3 AND end_date>=?3
         ORDER BY id LIMIT 1"
    ))?;
    let budget = stmt
        .query_row(params![user_id, category_id, date], budget_from_row)
        .optional()?;
    Ok(budget)
}

/// First active budget for (user, category) whose window intersects
/// `[start, end]`. `exclude_id` lets the update path skip the budget being
/// edited.
pub fn find_overlapping_budget(
    conn: &Connection,
    user_id: i64,
    category_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    exclude_id: Option<i64>,
) -> Result<Option<Budget>, Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BUDGET_COLS} FROM budgets
         WHERE user_id=?1 AND category_id=?2 AND is_active=1
           AND start_date<=?4 AND end_date>=?3
           AND (?5 IS NULL OR id<>?5)
         ORDER BY id LIMIT 1"
    ))?;
    let budget = stmt
        .query_row(
            params![user_id, category_id, start, end, exclude_id],
            budget_from_row,
        )
        .optional()?;
    Ok(budget)
}

/// Sum of `amount` over active, expense-type transactions of the user and
/// category with `start <= date <= end` (inclusive on both ends). Income
/// and soft-deleted transactions never count.
pub fn sum_active_expenses(
    conn: &Connection,
    user_id: i64,
    category_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Decimal, Error> {
    let mut stmt = conn.prepare(
        "SELECT amount FROM transactions
         WHERE user_id=?1 AND category_id=?2 AND type='expense' AND is_active=1
           AND date>=?3 AND date<=?4",
    )?;
    let mut rows = stmt.query(params![user_id, category_id, start, end])?;
    let mut total = Decimal::ZERO;
    while let Some(row) = rows.next()? {
        let s: String = row.get(0)?;
        let amount = s.parse::<Decimal>().map_err(|_| Error::BadDecimal {
            column: "transactions.amount",
            value: s,
        })?;
        total += amount;
    }
    Ok(total)
}

/// Persist reconciled aggregates. Only the engine (and the on-read refresh
/// after a budget update) goes through here.
pub fn apply_budget_aggregates(
    conn: &Connection,
    budget_id: i64,
    spent: Decimal,
    remaining: Decimal,
) -> Result<(), Error> {
    conn.execute(
        "UPDATE budgets SET spent=?2, remaining=?3 WHERE id=?1",
        params![budget_id, spent.to_string(), remaining.to_string()],
    )?;
    Ok(())
}

pub fn get_budget(conn: &Connection, user_id: i64, id: i64) -> Result<Option<Budget>, Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BUDGET_COLS} FROM budgets WHERE id=?1 AND user_id=?2 AND is_active=1"
    ))?;
    let budget = stmt
        .query_row(params![id, user_id], budget_from_row)
        .optional()?;
    Ok(budget)
}

pub fn list_budgets(conn: &Connection, user_id: i64) -> Result<Vec<Budget>, Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BUDGET_COLS} FROM budgets WHERE user_id=?1 AND is_active=1 ORDER BY id DESC"
    ))?;
    let rows = stmt.query_map(params![user_id], budget_from_row)?;
    let mut budgets = Vec::new();
    for row in rows {
        budgets.push(row?);
    }
    Ok(budgets)
}

/// Lookup scoped by owner. A record belonging to another user is
/// indistinguishable from a missing one.
pub fn get_transaction(
    conn: &Connection,
    user_id: i64,
    id: i64,
) -> Result<Option<Transaction>, Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TXN_COLS} FROM transactions WHERE id=?1 AND user_id=?2 AND is_active=1"
    ))?;
    let txn = stmt.query_row(params![id, user_id], txn_from_row).optional()?;
    Ok(txn)
}

pub fn get_category(conn: &Connection, user_id: i64, id: i64) -> Result<Option<Category>, Error> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLS} FROM categories WHERE id=?1 AND user_id=?2 AND is_active=1"
    ))?;
    let cat = stmt
        .query_row(params![id, user_id], category_from_row)
        .optional()?;
    Ok(cat)
}
