// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::errors::Error;
use crate::models::{Category, TxnType};
use crate::store;
use crate::utils::normalize_name;

pub struct NewCategory {
    pub name: String,
    pub kind: TxnType,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

pub fn create(conn: &Connection, user_id: i64, new: NewCategory) -> Result<Category, Error> {
    let name = normalize_name(&new.name);
    if name.is_empty() {
        return Err(Error::validation("name", "must not be empty"));
    }
    if name_taken(conn, user_id, &name, None)? {
        return Err(Error::Conflict(format!(
            "category '{}' already exists",
            name
        )));
    }
    conn.execute(
        "INSERT INTO categories(user_id, name, type, icon, color) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, name, new.kind.as_str(), new.icon, new.color],
    )?;
    let id = conn.last_insert_rowid();
    get(conn, user_id, id)
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> Result<Category, Error> {
    store::get_category(conn, user_id, id)?.ok_or(Error::NotFound("category"))
}

pub fn list(
    conn: &Connection,
    user_id: i64,
    kind: Option<TxnType>,
) -> Result<Vec<Category>, Error> {
    let mut sql = format!(
        "SELECT {} FROM categories WHERE user_id=?1 AND is_active=1",
        store::CATEGORY_COLS
    );
    if kind.is_some() {
        sql.push_str(" AND type=?2");
    }
    sql.push_str(" ORDER BY name");

    let mut stmt = conn.prepare(&sql)?;
    let mut out = Vec::new();
    if let Some(kind) = kind {
        let rows = stmt.query_map(params![user_id, kind.as_str()], store::category_from_row)?;
        for row in rows {
            out.push(row?);
        }
    } else {
        let rows = stmt.query_map(params![user_id], store::category_from_row)?;
        for row in rows {
            out.push(row?);
        }
    }
    Ok(out)
}

pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    patch: CategoryPatch,
) -> Result<Category, Error> {
    let current = get(conn, user_id, id)?;
    let name = match patch.name {
        Some(n) => {
            let n = normalize_name(&n);
            if n.is_empty() {
                return Err(Error::validation("name", "must not be empty"));
            }
            if n != current.name && name_taken(conn, user_id, &n, Some(id))? {
                return Err(Error::Conflict(format!("category '{}' already exists", n)));
            }
            n
        }
        None => current.name,
    };
    conn.execute(
        "UPDATE categories SET name=?3, icon=?4, color=?5 WHERE id=?1 AND user_id=?2",
        params![
            id,
            user_id,
            name,
            patch.icon.or(current.icon),
            patch.color.or(current.color),
        ],
    )?;
    get(conn, user_id, id)
}

/// Soft delete. Seeded default categories cannot be removed; like a missing
/// or foreign record, that surfaces as not-found.
pub fn remove(conn: &Connection, user_id: i64, id: i64) -> Result<(), Error> {
    let n = conn.execute(
        "UPDATE categories SET is_active=0
         WHERE id=?1 AND user_id=?2 AND is_default=0 AND is_active=1",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(Error::NotFound("category"));
    }
    info!(user_id, category_id = id, "category soft deleted");
    Ok(())
}

/// Resolve an active category by its (normalized) name.
pub fn id_for_name(conn: &Connection, user_id: i64, name: &str) -> Result<i64, Error> {
    let mut stmt = conn.prepare(
        "SELECT id FROM categories WHERE user_id=?1 AND name=?2 AND is_active=1",
    )?;
    stmt.query_row(params![user_id, normalize_name(name)], |r| r.get(0))
        .optional()?
        .ok_or(Error::NotFound("category"))
}

fn name_taken(
    conn: &Connection,
    user_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, Error> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM categories
         WHERE user_id=?1 AND name=?2 AND is_active=1 AND (?3 IS NULL OR id<>?3)",
    )?;
    let hit: Option<i64> = stmt
        .query_row(params![user_id, name, exclude_id], |r| r.get(0))
        .optional()?;
    Ok(hit.is_some())
}
