// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget lifecycle: overlap-checked create, live-recomputed reads,
//! restricted update, soft delete. The stored `spent`/`remaining` are a
//! cache maintained by the reconciliation engine; every read here recomputes
//! them from the matching transactions, so reads are self-healing.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use tracing::info;

use crate::errors::Error;
use crate::models::{Budget, Period};
use crate::reconcile::{self, Reconciled};
use crate::store;
use crate::utils::validate_amount;

pub struct NewBudget {
    pub category_id: i64,
    pub amount: Decimal,
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Only the cap and the window are user-mutable; `spent`/`remaining` are
/// derived and period is fixed at creation.
#[derive(Default)]
pub struct BudgetPatch {
    pub amount: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn create(conn: &Connection, user_id: i64, new: NewBudget) -> Result<Budget, Error> {
    validate_amount("amount", new.amount)?;
    if new.start_date > new.end_date {
        return Err(Error::validation(
            "start_date",
            "window start must not be after window end",
        ));
    }
    store::get_category(conn, user_id, new.category_id)?.ok_or(Error::NotFound("category"))?;

    if let Some(existing) = store::find_overlapping_budget(
        conn,
        user_id,
        new.category_id,
        new.start_date,
        new.end_date,
        None,
    )? {
        return Err(Error::Conflict(format!(
            "a budget for this category already covers {} to {}",
            existing.start_date, existing.end_date
        )));
    }

    conn.execute(
        "INSERT INTO budgets(user_id, category_id, amount, period, start_date, end_date, spent, remaining)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, '0', ?3)",
        params![
            user_id,
            new.category_id,
            new.amount.to_string(),
            new.period.as_str(),
            new.start_date,
            new.end_date,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(user_id, budget_id = id, "budget created");
    get(conn, user_id, id)
}

/// By-id read with `spent` recomputed from the live transaction set rather
/// than the stored cache.
pub fn get(conn: &Connection, user_id: i64, id: i64) -> Result<Budget, Error> {
    let budget = store::get_budget(conn, user_id, id)?.ok_or(Error::NotFound("budget"))?;
    with_live_aggregates(conn, budget)
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Budget>, Error> {
    let mut out = Vec::new();
    for budget in store::list_budgets(conn, user_id)? {
        out.push(with_live_aggregates(conn, budget)?);
    }
    Ok(out)
}

pub fn update(conn: &Connection, user_id: i64, id: i64, patch: BudgetPatch) -> Result<Budget, Error> {
    let current = store::get_budget(conn, user_id, id)?.ok_or(Error::NotFound("budget"))?;

    let amount = patch.amount.unwrap_or(current.amount);
    validate_amount("amount", amount)?;
    let start_date = patch.start_date.unwrap_or(current.start_date);
    let end_date = patch.end_date.unwrap_or(current.end_date);
    if start_date > end_date {
        return Err(Error::validation(
            "start_date",
            "window start must not be after window end",
        ));
    }

    // A moved window is re-validated against sibling budgets, excluding this
    // one. Enforced on update as well as create.
    let window_changed = (start_date, end_date) != (current.start_date, current.end_date);
    if window_changed {
        if let Some(existing) = store::find_overlapping_budget(
            conn,
            user_id,
            current.category_id,
            start_date,
            end_date,
            Some(id),
        )? {
            return Err(Error::Conflict(format!(
                "a budget for this category already covers {} to {}",
                existing.start_date, existing.end_date
            )));
        }
    }

    conn.execute(
        "UPDATE budgets SET amount=?3, start_date=?4, end_date=?5 WHERE id=?1 AND user_id=?2",
        params![id, user_id, amount.to_string(), start_date, end_date],
    )?;

    // The cap or window changed under the stored aggregates; refresh them.
    let updated = store::get_budget(conn, user_id, id)?.ok_or(Error::NotFound("budget"))?;
    let spent = reconcile::compute_spent(conn, &updated)?;
    store::apply_budget_aggregates(conn, id, spent, updated.amount - spent)?;
    get(conn, user_id, id)
}

/// Soft delete; no cascading effect on transactions.
pub fn remove(conn: &Connection, user_id: i64, id: i64) -> Result<(), Error> {
    let n = conn.execute(
        "UPDATE budgets SET is_active=0 WHERE id=?1 AND user_id=?2 AND is_active=1",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(Error::NotFound("budget"));
    }
    info!(user_id, budget_id = id, "budget soft deleted");
    Ok(())
}

/// On-demand reconciliation for (user, category, date). Unlike the
/// mutation-triggered path, failures here surface to the caller, wrapped in
/// the reconciliation variant.
pub fn reconcile(
    conn: &Connection,
    user_id: i64,
    category_id: i64,
    date: NaiveDate,
) -> Result<Option<Reconciled>, Error> {
    reconcile::reconcile_budget(conn, user_id, category_id, date)
        .map_err(|e| Error::Reconciliation(Box::new(e)))
}

fn with_live_aggregates(conn: &Connection, mut budget: Budget) -> Result<Budget, Error> {
    let spent = reconcile::compute_spent(conn, &budget)?;
    budget.remaining = budget.amount - spent;
    budget.spent = spent;
    Ok(budget)
}
