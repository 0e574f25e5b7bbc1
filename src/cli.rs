// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print output as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print output as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("pocketbook")
        .about("Personal finance tracker with category budgets and automatic reconciliation")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(user_cmd())
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(budget_cmd())
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Manage users")
        .subcommand(
            Command::new("add")
                .about("Register a new user (seeds the default categories)")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("currency").long("currency"))
                .arg(Arg::new("timezone").long("timezone")),
        )
        .subcommand(json_flags(Command::new("list").about("List users")))
        .subcommand(
            Command::new("use")
                .about("Select the active user by email")
                .arg(Arg::new("email").required(true)),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories for the active user")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("income or expense"),
                )
                .arg(Arg::new("icon").long("icon"))
                .arg(Arg::new("color").long("color")),
        )
        .subcommand(json_flags(
            Command::new("list").arg(Arg::new("type").long("type").help("income or expense")),
        ))
        .subcommand(
            Command::new("update")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64)))
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("icon").long("icon"))
                .arg(Arg::new("color").long("color")),
        )
        .subcommand(
            Command::new("rm")
                .about("Soft-delete a category (default categories cannot be removed)")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64))),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Manage transactions for the active user")
        .subcommand(
            Command::new("add")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("income or expense"),
                )
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .required(true)
                        .help("Category name"),
                )
                .arg(Arg::new("desc").long("desc").required(true))
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
                .arg(Arg::new("payment").long("payment").help("Payment type, e.g. card"))
                .arg(Arg::new("tags").long("tags").help("Comma-separated tags")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").help("YYYY-MM-DD"))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("payment").long("payment"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(
            Command::new("update")
                .about("Patch fields of a transaction; omitted fields stay as they are")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64)))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("desc").long("desc"))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("payment").long("payment"))
                .arg(Arg::new("tags").long("tags")),
        )
        .subcommand(
            Command::new("rm")
                .about("Soft-delete a transaction")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64))),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Manage budgets for the active user")
        .subcommand(
            Command::new("add")
                .arg(
                    Arg::new("category")
                        .long("category")
                        .required(true)
                        .help("Category name"),
                )
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(
                    Arg::new("period")
                        .long("period")
                        .default_value("monthly")
                        .help("daily, weekly, monthly, yearly or custom"),
                )
                .arg(Arg::new("start").long("start").required(true).help("YYYY-MM-DD"))
                .arg(Arg::new("end").long("end").required(true).help("YYYY-MM-DD")),
        )
        .subcommand(json_flags(Command::new("list").about("List budgets with live spent totals")))
        .subcommand(
            Command::new("update")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64)))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("start").long("start"))
                .arg(Arg::new("end").long("end")),
        )
        .subcommand(
            Command::new("rm")
                .about("Soft-delete a budget")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(i64))),
        )
        .subcommand(
            Command::new("reconcile")
                .about("Recompute spent/remaining for the budget covering a date")
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD")),
        )
}
