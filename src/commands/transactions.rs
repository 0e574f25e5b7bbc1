// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use anyhow::Result;
use rusqlite::Connection;

use crate::models::TxnType;
use crate::services::categories;
use crate::services::transactions::{self, NewTransaction, TransactionPatch, TxnFilter};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};

use super::current_user;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn split_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let kind = TxnType::parse(sub.get_one::<String>("type").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap();
    let category_id = categories::id_for_name(conn, user.id, category)?;
    let date = sub
        .get_one::<String>("date")
        .map(|s| parse_date(s))
        .transpose()?;

    let txn = transactions::create(
        conn,
        user.id,
        NewTransaction {
            kind,
            amount,
            category_id,
            description: sub.get_one::<String>("desc").unwrap().clone(),
            date,
            tags: sub
                .get_one::<String>("tags")
                .map(|s| split_tags(s))
                .unwrap_or_default(),
            payment_type: sub.get_one::<String>("payment").cloned(),
        },
    )?;
    println!(
        "Recorded {} {} '{}' on {} (id {})",
        txn.kind.as_str(),
        fmt_money(&txn.amount),
        category,
        txn.date,
        txn.id
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let filter = TxnFilter {
        from: sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?,
        to: sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?,
        kind: sub
            .get_one::<String>("type")
            .map(|s| TxnType::parse(s))
            .transpose()?,
        category_id: sub
            .get_one::<String>("category")
            .map(|c| categories::id_for_name(conn, user.id, c))
            .transpose()?,
        payment_type: sub.get_one::<String>("payment").cloned(),
        limit: sub.get_one::<usize>("limit").copied(),
    };
    let txns = transactions::list(conn, user.id, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &txns)? {
        let names: HashMap<i64, String> = categories::list(conn, user.id, None)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let rows = txns
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.kind.as_str().to_string(),
                    fmt_money(&t.amount),
                    names.get(&t.category_id).cloned().unwrap_or_default(),
                    t.description.clone(),
                    t.payment_type.clone().unwrap_or_default(),
                    t.tags.join(","),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Type", "Amount", "Category", "Description", "Payment", "Tags"],
                rows,
            )
        );
    }
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let patch = TransactionPatch {
        kind: sub
            .get_one::<String>("type")
            .map(|s| TxnType::parse(s))
            .transpose()?,
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        category_id: sub
            .get_one::<String>("category")
            .map(|c| categories::id_for_name(conn, user.id, c))
            .transpose()?,
        description: sub.get_one::<String>("desc").cloned(),
        date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
        tags: sub.get_one::<String>("tags").map(|s| split_tags(s)),
        payment_type: sub.get_one::<String>("payment").cloned(),
    };
    let txn = transactions::update(conn, user.id, id, patch)?;
    println!(
        "Updated transaction {}: {} {} on {}",
        txn.id,
        txn.kind.as_str(),
        fmt_money(&txn.amount),
        txn.date
    );
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let txn = transactions::remove(conn, user.id, id)?;
    println!(
        "Removed transaction {} ({} {})",
        txn.id,
        txn.kind.as_str(),
        fmt_money(&txn.amount)
    );
    Ok(())
}
