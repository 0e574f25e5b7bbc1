// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use anyhow::Result;
use rusqlite::Connection;

use crate::models::Period;
use crate::services::budgets::{self, BudgetPatch, NewBudget};
use crate::services::categories;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};

use super::current_user;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("reconcile", sub)) => reconcile(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let category = sub.get_one::<String>("category").unwrap();
    let budget = budgets::create(
        conn,
        user.id,
        NewBudget {
            category_id: categories::id_for_name(conn, user.id, category)?,
            amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
            period: Period::parse(sub.get_one::<String>("period").unwrap())?,
            start_date: parse_date(sub.get_one::<String>("start").unwrap())?,
            end_date: parse_date(sub.get_one::<String>("end").unwrap())?,
        },
    )?;
    println!(
        "Budget set: {} {} for {} to {}",
        category,
        fmt_money(&budget.amount),
        budget.start_date,
        budget.end_date
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let views = budgets::list(conn, user.id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &views)? {
        let names: HashMap<i64, String> = categories::list(conn, user.id, None)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let rows = views
            .iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    names.get(&b.category_id).cloned().unwrap_or_default(),
                    b.period.as_str().to_string(),
                    b.start_date.to_string(),
                    b.end_date.to_string(),
                    fmt_money(&b.amount),
                    fmt_money(&b.spent),
                    fmt_money(&b.remaining),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Category", "Period", "Start", "End", "Amount", "Spent", "Remaining"],
                rows,
            )
        );
    }
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let budget = budgets::update(
        conn,
        user.id,
        id,
        BudgetPatch {
            amount: sub
                .get_one::<String>("amount")
                .map(|s| parse_decimal(s))
                .transpose()?,
            start_date: sub.get_one::<String>("start").map(|s| parse_date(s)).transpose()?,
            end_date: sub.get_one::<String>("end").map(|s| parse_date(s)).transpose()?,
        },
    )?;
    println!(
        "Updated budget {}: {} for {} to {} (spent {}, remaining {})",
        budget.id,
        fmt_money(&budget.amount),
        budget.start_date,
        budget.end_date,
        fmt_money(&budget.spent),
        fmt_money(&budget.remaining)
    );
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    budgets::remove(conn, user.id, id)?;
    println!("Removed budget {}", id);
    Ok(())
}

fn reconcile(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let category = sub.get_one::<String>("category").unwrap();
    let category_id = categories::id_for_name(conn, user.id, category)?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    match budgets::reconcile(conn, user.id, category_id, date)? {
        Some(r) => println!(
            "Reconciled budget {}: spent {}, remaining {}",
            r.budget_id,
            fmt_money(&r.spent),
            fmt_money(&r.remaining)
        ),
        None => println!("No active budget covers {} for '{}'", date, category),
    }
    Ok(())
}
