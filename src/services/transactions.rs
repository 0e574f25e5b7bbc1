// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction lifecycle: create, patch-style update, soft delete. Each
//! mutation triggers budget reconciliation for the (category, date) pairs it
//! affects. A reconciliation failure is logged and reported as a secondary
//! warning only; the committed transaction write always stands.

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::errors::Error;
use crate::models::{Transaction, TxnType};
use crate::reconcile;
use crate::store;
use crate::utils::validate_amount;

pub struct NewTransaction {
    pub kind: TxnType,
    pub amount: Decimal,
    pub category_id: i64,
    pub description: String,
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub payment_type: Option<String>,
}

/// Patch semantics: absent fields are left untouched.
#[derive(Default)]
pub struct TransactionPatch {
    pub kind: Option<TxnType>,
    pub amount: Option<Decimal>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub payment_type: Option<String>,
}

#[derive(Default)]
pub struct TxnFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<TxnType>,
    pub category_id: Option<i64>,
    pub payment_type: Option<String>,
    pub limit: Option<usize>,
}

pub fn create(conn: &Connection, user_id: i64, new: NewTransaction) -> Result<Transaction, Error> {
    validate_amount("amount", new.amount)?;
    if new.description.trim().is_empty() {
        return Err(Error::validation("description", "must not be empty"));
    }
    // The category must exist, be active, and belong to the caller.
    store::get_category(conn, user_id, new.category_id)?.ok_or(Error::NotFound("category"))?;
    let date = new.date.unwrap_or_else(|| Local::now().date_naive());

    conn.execute(
        "INSERT INTO transactions(user_id, type, amount, category_id, description, date, tags, payment_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user_id,
            new.kind.as_str(),
            new.amount.to_string(),
            new.category_id,
            new.description.trim(),
            date,
            serde_json::to_string(&new.tags).unwrap_or_else(|_| "[]".into()),
            new.payment_type,
        ],
    )?;
    let id = conn.last_insert_rowid();

    if new.kind == TxnType::Expense {
        reconcile_or_warn(conn, user_id, new.category_id, date);
    }
    get(conn, user_id, id)
}

pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    patch: TransactionPatch,
) -> Result<Transaction, Error> {
    let old = store::get_transaction(conn, user_id, id)?.ok_or(Error::NotFound("transaction"))?;

    let kind = patch.kind.unwrap_or(old.kind);
    let amount = patch.amount.unwrap_or(old.amount);
    validate_amount("amount", amount)?;
    let category_id = patch.category_id.unwrap_or(old.category_id);
    if category_id != old.category_id {
        store::get_category(conn, user_id, category_id)?.ok_or(Error::NotFound("category"))?;
    }
    let description = patch.description.unwrap_or(old.description.clone());
    if description.trim().is_empty() {
        return Err(Error::validation("description", "must not be empty"));
    }
    let date = patch.date.unwrap_or(old.date);
    let tags = patch.tags.unwrap_or_else(|| old.tags.clone());
    let payment_type = patch.payment_type.or_else(|| old.payment_type.clone());

    conn.execute(
        "UPDATE transactions
         SET type=?3, amount=?4, category_id=?5, description=?6, date=?7, tags=?8, payment_type=?9
         WHERE id=?1 AND user_id=?2",
        params![
            id,
            user_id,
            kind.as_str(),
            amount.to_string(),
            category_id,
            description.trim(),
            date,
            serde_json::to_string(&tags).unwrap_or_else(|_| "[]".into()),
            payment_type,
        ],
    )?;

    // Reconcile the pre-update pair first so a budget the transaction moved
    // out of is not left stale, then the post-update pair.
    let pair_changed = (old.category_id, old.date) != (category_id, date);
    if old.kind == TxnType::Expense && (pair_changed || kind != TxnType::Expense) {
        reconcile_or_warn(conn, user_id, old.category_id, old.date);
    }
    if kind == TxnType::Expense {
        reconcile_or_warn(conn, user_id, category_id, date);
    }
    get(conn, user_id, id)
}

/// Soft delete: `active -> inactive`, one-way. The exclusion from the active
/// set is what changes the budget sum.
pub fn remove(conn: &Connection, user_id: i64, id: i64) -> Result<Transaction, Error> {
    let txn = store::get_transaction(conn, user_id, id)?.ok_or(Error::NotFound("transaction"))?;
    conn.execute(
        "UPDATE transactions SET is_active=0 WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    info!(user_id, transaction_id = id, "transaction soft deleted");

    if txn.kind == TxnType::Expense {
        reconcile_or_warn(conn, user_id, txn.category_id, txn.date);
    }
    Ok(Transaction {
        is_active: false,
        ..txn
    })
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> Result<Transaction, Error> {
    store::get_transaction(conn, user_id, id)?.ok_or(Error::NotFound("transaction"))
}

pub fn list(
    conn: &Connection,
    user_id: i64,
    filter: &TxnFilter,
) -> Result<Vec<Transaction>, Error> {
    let mut sql = format!(
        "SELECT {} FROM transactions WHERE user_id=? AND is_active=1",
        store::TXN_COLS
    );
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

    if let Some(from) = filter.from {
        sql.push_str(" AND date>=?");
        args.push(Box::new(from));
    }
    if let Some(to) = filter.to {
        sql.push_str(" AND date<=?");
        args.push(Box::new(to));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND type=?");
        args.push(Box::new(kind.as_str()));
    }
    if let Some(category_id) = filter.category_id {
        sql.push_str(" AND category_id=?");
        args.push(Box::new(category_id));
    }
    if let Some(ref payment_type) = filter.payment_type {
        sql.push_str(" AND payment_type=?");
        args.push(Box::new(payment_type.clone()));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        args.push(Box::new(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = args.iter().map(|a| a.as_ref()).collect();
    let rows = stmt.query_map(rusqlite::params_from_iter(params), store::txn_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// The mutation that triggered reconciliation has already been committed, so
/// a failure here must not propagate; the stored aggregates heal on the next
/// mutation or on-read recompute.
fn reconcile_or_warn(conn: &Connection, user_id: i64, category_id: i64, date: NaiveDate) {
    if let Err(err) = reconcile::reconcile_budget(conn, user_id, category_id, date) {
        let err = Error::Reconciliation(Box::new(err));
        warn!(user_id, category_id, %date, %err, "budget left stale after committed write");
    }
}
