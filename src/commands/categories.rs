// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::models::TxnType;
use crate::services::categories::{self, CategoryPatch, NewCategory};
use crate::utils::{maybe_print_json, pretty_table};

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

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let kind = TxnType::parse(sub.get_one::<String>("type").unwrap())?;
    let cat = categories::create(
        conn,
        user.id,
        NewCategory {
            name: sub.get_one::<String>("name").unwrap().clone(),
            kind,
            icon: sub.get_one::<String>("icon").cloned(),
            color: sub.get_one::<String>("color").cloned(),
        },
    )?;
    println!("Added {} category '{}'", cat.kind.as_str(), cat.name);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let kind = sub
        .get_one::<String>("type")
        .map(|s| TxnType::parse(s))
        .transpose()?;
    let cats = categories::list(conn, user.id, kind)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
        let rows = cats
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.name.clone(),
                    c.kind.as_str().to_string(),
                    c.icon.clone().unwrap_or_default(),
                    c.color.clone().unwrap_or_default(),
                    if c.is_default { "yes".into() } else { "".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Type", "Icon", "Color", "Default"], rows)
        );
    }
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let cat = categories::update(
        conn,
        user.id,
        id,
        CategoryPatch {
            name: sub.get_one::<String>("name").cloned(),
            icon: sub.get_one::<String>("icon").cloned(),
            color: sub.get_one::<String>("color").cloned(),
        },
    )?;
    println!("Updated category '{}'", cat.name);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    categories::remove(conn, user.id, id)?;
    println!("Removed category {}", id);
    Ok(())
}
