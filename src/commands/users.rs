// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::services::users::{self, NewUser};
use crate::utils::{maybe_print_json, pretty_table};

use super::CURRENT_USER_KEY;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("use", sub)) => use_user(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = users::register(
        conn,
        NewUser {
            name: sub.get_one::<String>("name").unwrap().clone(),
            email: sub.get_one::<String>("email").unwrap().clone(),
            password_hash: None,
            currency: sub.get_one::<String>("currency").cloned(),
            timezone: sub.get_one::<String>("timezone").cloned(),
        },
    )?;
    println!("Registered user '{}' <{}>", user.name, user.email);

    // First user becomes the active one.
    if crate::utils::get_setting(conn, CURRENT_USER_KEY)?.is_none() {
        crate::utils::set_setting(conn, CURRENT_USER_KEY, &user.id.to_string())?;
        println!("Active user set to {}", user.email);
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let users = users::list(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &users)? {
        let rows = users
            .iter()
            .map(|u| {
                vec![
                    u.id.to_string(),
                    u.name.clone(),
                    u.email.clone(),
                    u.currency.clone(),
                    u.timezone.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Email", "Currency", "Timezone"], rows)
        );
    }
    Ok(())
}

fn use_user(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let email = sub.get_one::<String>("email").unwrap();
    let user = users::find_by_email(conn, email)?
        .with_context(|| format!("No user with email '{}'", email))?;
    crate::utils::set_setting(conn, CURRENT_USER_KEY, &user.id.to_string())?;
    println!("Active user set to {}", user.email);
    Ok(())
}
