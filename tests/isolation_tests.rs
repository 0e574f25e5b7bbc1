// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

use pocketbook::db;
use pocketbook::errors::Error;
use pocketbook::models::{Period, TxnType};
use pocketbook::services::{budgets, categories, transactions, users};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn register(conn: &Connection, email: &str) -> i64 {
    users::register(
        conn,
        users::NewUser {
            name: "user".into(),
            email: email.into(),
            password_hash: None,
            currency: None,
            timezone: None,
        },
    )
    .unwrap()
    .id
}

fn setup_two_users() -> (Connection, i64, i64) {
    let conn = db::open_in_memory().unwrap();
    let a = register(&conn, "a@example.com");
    let b = register(&conn, "b@example.com");
    (conn, a, b)
}

#[test]
fn foreign_transaction_is_not_found() {
    let (conn, a, b) = setup_two_users();
    let cat = categories::create(
        &conn,
        a,
        categories::NewCategory {
            name: "groceries".into(),
            kind: TxnType::Expense,
            icon: None,
            color: None,
        },
    )
    .unwrap();
    let txn = transactions::create(
        &conn,
        a,
        transactions::NewTransaction {
            kind: TxnType::Expense,
            amount: dec("10.00"),
            category_id: cat.id,
            description: "mine".into(),
            date: Some(date("2024-03-01")),
            tags: vec![],
            payment_type: None,
        },
    )
    .unwrap();

    // A valid id owned by someone else reads as missing, never as forbidden.
    assert!(matches!(
        transactions::get(&conn, b, txn.id).unwrap_err(),
        Error::NotFound("transaction")
    ));
    assert!(matches!(
        transactions::update(&conn, b, txn.id, Default::default()).unwrap_err(),
        Error::NotFound("transaction")
    ));
    assert!(matches!(
        transactions::remove(&conn, b, txn.id).unwrap_err(),
        Error::NotFound("transaction")
    ));
    // Untouched for the owner.
    assert!(transactions::get(&conn, a, txn.id).unwrap().is_active);
}

#[test]
fn foreign_budget_is_not_found() {
    let (conn, a, b) = setup_two_users();
    let cat = categories::create(
        &conn,
        a,
        categories::NewCategory {
            name: "groceries".into(),
            kind: TxnType::Expense,
            icon: None,
            color: None,
        },
    )
    .unwrap();
    let budget = budgets::create(
        &conn,
        a,
        budgets::NewBudget {
            category_id: cat.id,
            amount: dec("500"),
            period: Period::Monthly,
            start_date: date("2024-03-01"),
            end_date: date("2024-03-31"),
        },
    )
    .unwrap();

    assert!(matches!(
        budgets::get(&conn, b, budget.id).unwrap_err(),
        Error::NotFound("budget")
    ));
    assert!(matches!(
        budgets::update(&conn, b, budget.id, Default::default()).unwrap_err(),
        Error::NotFound("budget")
    ));
    assert!(matches!(
        budgets::remove(&conn, b, budget.id).unwrap_err(),
        Error::NotFound("budget")
    ));
}

#[test]
fn budgets_of_different_users_never_interfere() {
    let (conn, a, b) = setup_two_users();
    // Same category name and same window for both users: no conflict, and
    // each budget only sums its own user's spending.
    let cat_a = categories::id_for_name(&conn, a, "food").unwrap();
    let cat_b = categories::id_for_name(&conn, b, "food").unwrap();
    let budget_a = budgets::create(
        &conn,
        a,
        budgets::NewBudget {
            category_id: cat_a,
            amount: dec("500"),
            period: Period::Monthly,
            start_date: date("2024-03-01"),
            end_date: date("2024-03-31"),
        },
    )
    .unwrap();
    budgets::create(
        &conn,
        b,
        budgets::NewBudget {
            category_id: cat_b,
            amount: dec("500"),
            period: Period::Monthly,
            start_date: date("2024-03-01"),
            end_date: date("2024-03-31"),
        },
    )
    .unwrap();

    transactions::create(
        &conn,
        b,
        transactions::NewTransaction {
            kind: TxnType::Expense,
            amount: dec("100.00"),
            category_id: cat_b,
            description: "theirs".into(),
            date: Some(date("2024-03-05")),
            tags: vec![],
            payment_type: None,
        },
    )
    .unwrap();

    let view = budgets::get(&conn, a, budget_a.id).unwrap();
    assert_eq!(view.spent, Decimal::ZERO);
}

#[test]
fn duplicate_email_is_a_conflict() {
    let conn = db::open_in_memory().unwrap();
    register(&conn, "a@example.com");
    let err = users::register(
        &conn,
        users::NewUser {
            name: "again".into(),
            email: "A@Example.com".into(),
            password_hash: None,
            currency: None,
            timezone: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn category_names_are_unique_per_user_case_insensitively() {
    let (conn, a, b) = setup_two_users();
    categories::create(
        &conn,
        a,
        categories::NewCategory {
            name: "Groceries".into(),
            kind: TxnType::Expense,
            icon: None,
            color: None,
        },
    )
    .unwrap();

    let err = categories::create(
        &conn,
        a,
        categories::NewCategory {
            name: "  GROCERIES ".into(),
            kind: TxnType::Expense,
            icon: None,
            color: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    // Same name for another user is fine.
    categories::create(
        &conn,
        b,
        categories::NewCategory {
            name: "groceries".into(),
            kind: TxnType::Expense,
            icon: None,
            color: None,
        },
    )
    .unwrap();
}

#[test]
fn default_categories_are_seeded_and_undeletable() {
    let conn = db::open_in_memory().unwrap();
    let user = register(&conn, "a@example.com");

    let cats = categories::list(&conn, user, None).unwrap();
    assert_eq!(cats.len(), 15);
    assert_eq!(
        categories::list(&conn, user, Some(TxnType::Expense))
            .unwrap()
            .len(),
        10
    );
    assert_eq!(
        categories::list(&conn, user, Some(TxnType::Income))
            .unwrap()
            .len(),
        5
    );
    // The catch-all buckets are distinct: names are unique per user across
    // both kinds.
    categories::id_for_name(&conn, user, "other").unwrap();
    categories::id_for_name(&conn, user, "other income").unwrap();

    let food = categories::id_for_name(&conn, user, "food").unwrap();
    assert!(matches!(
        categories::remove(&conn, user, food).unwrap_err(),
        Error::NotFound("category")
    ));

    // A user-created category can be removed, and its name becomes free
    // again afterwards.
    let custom = categories::create(
        &conn,
        user,
        categories::NewCategory {
            name: "hobbies".into(),
            kind: TxnType::Expense,
            icon: None,
            color: None,
        },
    )
    .unwrap();
    categories::remove(&conn, user, custom.id).unwrap();
    categories::create(
        &conn,
        user,
        categories::NewCategory {
            name: "hobbies".into(),
            kind: TxnType::Expense,
            icon: None,
            color: None,
        },
    )
    .unwrap();
}

#[test]
fn failed_registration_leaves_no_partial_writes() {
    let conn = db::open_in_memory().unwrap();
    // Make one of the seed inserts blow up mid-registration.
    conn.execute_batch(
        "CREATE TRIGGER block_salary BEFORE INSERT ON categories
         WHEN NEW.name = 'salary'
         BEGIN SELECT RAISE(ABORT, 'seed blocked'); END;",
    )
    .unwrap();

    users::register(
        &conn,
        users::NewUser {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: None,
            currency: None,
            timezone: None,
        },
    )
    .unwrap_err();

    // Neither the user row nor any of the categories seeded before the
    // failing one survive.
    let users_n: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .unwrap();
    let cats_n: i64 = conn
        .query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))
        .unwrap();
    assert_eq!(users_n, 0);
    assert_eq!(cats_n, 0);

    // With the trigger gone, the same registration goes through whole.
    conn.execute_batch("DROP TRIGGER block_salary").unwrap();
    let user = users::register(
        &conn,
        users::NewUser {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: None,
            currency: None,
            timezone: None,
        },
    )
    .unwrap();
    assert_eq!(categories::list(&conn, user.id, None).unwrap().len(), 15);
}

#[test]
fn category_rename_checks_conflicts() {
    let conn = db::open_in_memory().unwrap();
    let user = register(&conn, "a@example.com");
    let custom = categories::create(
        &conn,
        user,
        categories::NewCategory {
            name: "hobbies".into(),
            kind: TxnType::Expense,
            icon: None,
            color: None,
        },
    )
    .unwrap();

    let err = categories::update(
        &conn,
        user,
        custom.id,
        categories::CategoryPatch {
            name: Some("food".into()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let renamed = categories::update(
        &conn,
        user,
        custom.id,
        categories::CategoryPatch {
            name: Some("Crafts".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(renamed.name, "crafts");
}
