// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::errors::Error;
use crate::models::User;
use crate::store;

pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Opaque credential supplied by the caller; hashing happens upstream.
    pub password_hash: Option<String>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub timezone: Option<String>,
}

/// Seeded for every new user; seeded categories are flagged `is_default`
/// and cannot be deleted.
const DEFAULT_EXPENSE_CATEGORIES: &[(&str, &str, &str)] = &[
    ("food", "🍽️", "#FF5733"),
    ("transportation", "🚗", "#33FF57"),
    ("housing", "🏠", "#3357FF"),
    ("utilities", "💡", "#FF33F6"),
    ("healthcare", "🏥", "#33FFF6"),
    ("entertainment", "🎮", "#F6FF33"),
    ("shopping", "🛍️", "#FF3333"),
    ("education", "📚", "#33FF33"),
    ("personal care", "💅", "#3333FF"),
    ("other", "📦", "#CCCCCC"),
];

// Category names are unique per user across both kinds, so the income
// counterpart of "other" needs its own name.
const DEFAULT_INCOME_CATEGORIES: &[(&str, &str, &str)] = &[
    ("salary", "💰", "#33FF57"),
    ("freelance", "💻", "#3357FF"),
    ("investments", "📈", "#FF5733"),
    ("gifts", "🎁", "#FF33F6"),
    ("other income", "📦", "#CCCCCC"),
];

pub fn register(conn: &Connection, new: NewUser) -> Result<User, Error> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    let email = new.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(Error::validation("email", "must be a valid email address"));
    }
    if find_by_email(conn, &email)?.is_some() {
        return Err(Error::Conflict(format!(
            "a user with email '{}' already exists",
            email
        )));
    }

    // The user row and its seeded categories land together or not at all.
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO users(name, email, password_hash, currency, timezone)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            name,
            email,
            new.password_hash.unwrap_or_default(),
            new.currency.unwrap_or_else(|| "USD".into()),
            new.timezone.unwrap_or_else(|| "UTC".into()),
        ],
    )?;
    let id = tx.last_insert_rowid();
    seed_default_categories(&tx, id)?;
    tx.commit()?;
    info!(user_id = id, %email, "user registered");
    get(conn, id)
}

fn seed_default_categories(conn: &Connection, user_id: i64) -> Result<(), Error> {
    let mut stmt = conn.prepare(
        "INSERT INTO categories(user_id, name, type, icon, color, is_default)
         VALUES (?1, ?2, ?3, ?4, ?5, 1)",
    )?;
    for (name, icon, color) in DEFAULT_EXPENSE_CATEGORIES {
        stmt.execute(params![user_id, name, "expense", icon, color])?;
    }
    for (name, icon, color) in DEFAULT_INCOME_CATEGORIES {
        stmt.execute(params![user_id, name, "income", icon, color])?;
    }
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> Result<User, Error> {
    let mut stmt = conn
        .prepare("SELECT id, name, email, currency, timezone FROM users WHERE id=?1")?;
    stmt.query_row(params![id], store::user_from_row)
        .optional()?
        .ok_or(Error::NotFound("user"))
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>, Error> {
    let mut stmt = conn
        .prepare("SELECT id, name, email, currency, timezone FROM users WHERE email=?1")?;
    let user = stmt
        .query_row(params![email.trim().to_lowercase()], store::user_from_row)
        .optional()?;
    Ok(user)
}

pub fn list(conn: &Connection) -> Result<Vec<User>, Error> {
    let mut stmt = conn
        .prepare("SELECT id, name, email, currency, timezone FROM users ORDER BY email")?;
    let rows = stmt.query_map([], store::user_from_row)?;
    let mut users = Vec::new();
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

pub fn update_profile(conn: &Connection, user_id: i64, patch: ProfilePatch) -> Result<User, Error> {
    let user = get(conn, user_id)?;
    let name = patch.name.unwrap_or(user.name);
    if name.trim().is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    conn.execute(
        "UPDATE users SET name=?2, currency=?3, timezone=?4 WHERE id=?1",
        params![
            user_id,
            name.trim(),
            patch.currency.unwrap_or(user.currency),
            patch.timezone.unwrap_or(user.timezone),
        ],
    )?;
    get(conn, user_id)
}

pub fn set_password_hash(conn: &Connection, user_id: i64, hash: &str) -> Result<(), Error> {
    let n = conn.execute(
        "UPDATE users SET password_hash=?2 WHERE id=?1",
        params![user_id, hash],
    )?;
    if n == 0 {
        return Err(Error::NotFound("user"));
    }
    Ok(())
}
