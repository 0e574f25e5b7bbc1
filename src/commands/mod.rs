// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::User;
use crate::utils;

pub mod budgets;
pub mod categories;
pub mod transactions;
pub mod users;

pub(crate) const CURRENT_USER_KEY: &str = "current_user";

/// Every entity command runs on behalf of the active user selected via
/// `user use <email>`.
pub fn current_user(conn: &Connection) -> Result<User> {
    let id = utils::get_setting(conn, CURRENT_USER_KEY)?
        .context("No active user; run 'pocketbook user use <email>' first")?;
    let id: i64 = id.parse().context("Corrupt active-user setting")?;
    Ok(crate::services::users::get(conn, id)?)
}
