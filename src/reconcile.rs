// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget reconciliation engine.
//!
//! Given (user, category, date), find the active budget whose window covers
//! the date and recompute its `spent`/`remaining` from the matching
//! transactions. The whole recompute-and-write runs inside one SQLite
//! transaction, so a concurrent mutation can never interleave between the
//! aggregation read and the aggregate write.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::debug;

use crate::errors::Error;
use crate::models::Budget;
use crate::store;

/// Outcome of a reconciliation pass that found a covering budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub budget_id: i64,
    pub spent: Decimal,
    pub remaining: Decimal,
}

/// Recompute and persist `spent`/`remaining` for the active budget of
/// (user, category) covering `date`.
///
/// Returns `Ok(None)` when no active budget covers the date; that is not an
/// error, it just means nothing tracks this category/period combination.
/// `remaining` may go negative: overspend is signalled, not rejected.
pub fn reconcile_budget(
    conn: &Connection,
    user_id: i64,
    category_id: i64,
    date: NaiveDate,
) -> Result<Option<Reconciled>, Error> {
    let tx = conn.unchecked_transaction()?;

    let Some(budget) = store::find_active_budget(&tx, user_id, category_id, date)? else {
        return Ok(None);
    };

    let spent = store::sum_active_expenses(
        &tx,
        user_id,
        category_id,
        budget.start_date,
        budget.end_date,
    )?;
    let remaining = budget.amount - spent;
    store::apply_budget_aggregates(&tx, budget.id, spent, remaining)?;
    tx.commit()?;

    debug!(
        user_id,
        category_id,
        budget_id = budget.id,
        %spent,
        %remaining,
        "budget reconciled"
    );
    Ok(Some(Reconciled {
        budget_id: budget.id,
        spent,
        remaining,
    }))
}

/// On-read variant: compute `spent` for a budget's own window without
/// persisting anything. Read paths prefer this over the stored value, which
/// is only a cache.
pub fn compute_spent(conn: &Connection, budget: &Budget) -> Result<Decimal, Error> {
    store::sum_active_expenses(
        conn,
        budget.user_id,
        budget.category_id,
        budget.start_date,
        budget.end_date,
    )
}
