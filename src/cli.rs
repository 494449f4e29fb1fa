// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{arg, command, value_parser, Arg, ArgAction, Command};

fn json_flag() -> Arg {
    arg!(--json "Print as pretty JSON").action(ArgAction::SetTrue)
}

fn jsonl_flag() -> Arg {
    arg!(--jsonl "Print as JSON lines").action(ArgAction::SetTrue)
}

pub fn build_cli() -> Command {
    command!()
        .name("spendlog")
        .about("Personal expense tracking: record, browse, derive stats, export")
        .subcommand(Command::new("init").about("Initialize the local database"))
        .subcommand(
            Command::new("login")
                .about("Sign in, creating the profile on first use")
                .arg(arg!(--user <NAME> "Profile name").required(true)),
        )
        .subcommand(Command::new("logout").about("Sign out of the current session"))
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(
            Command::new("expense")
                .about("Record and browse expenses")
                .subcommand(
                    Command::new("add")
                        .about("Record a new expense")
                        .arg(arg!(--description <TEXT> "What the money went to").required(true))
                        .arg(arg!(--amount <AMOUNT> "Positive decimal amount").required(true))
                        .arg(
                            arg!(--category <CATEGORY> "necessities, basics or comforts")
                                .required(false),
                        )
                        .arg(arg!(--date <DATE> "YYYY-MM-DD, defaults to today").required(false)),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Change fields of an existing expense")
                        .arg(arg!(<ID> "Expense id"))
                        .arg(arg!(--description <TEXT> "New description").required(false))
                        .arg(arg!(--amount <AMOUNT> "New amount").required(false))
                        .arg(arg!(--category <CATEGORY> "New category").required(false))
                        .arg(arg!(--date <DATE> "New date (YYYY-MM-DD)").required(false)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an expense")
                        .arg(arg!(<ID> "Expense id")),
                )
                .subcommand(
                    Command::new("list")
                        .about("List expenses, newest first")
                        .arg(arg!(--category <CATEGORY> "Only this category").required(false))
                        .arg(arg!(--month <MONTH> "Only this month (YYYY-MM)").required(false))
                        .arg(
                            arg!(--page <N> "Page number, 10 rows per page")
                                .required(false)
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(json_flag())
                        .arg(jsonl_flag()),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Derived views over your expenses")
                .subcommand(
                    Command::new("summary")
                        .about("Current-month total and per-category totals")
                        .arg(json_flag())
                        .arg(jsonl_flag()),
                )
                .subcommand(
                    Command::new("monthly")
                        .about("Total per month, oldest first")
                        .arg(json_flag())
                        .arg(jsonl_flag()),
                )
                .subcommand(
                    Command::new("daily")
                        .about("Per-day totals for the current month")
                        .arg(json_flag())
                        .arg(jsonl_flag()),
                )
                .subcommand(
                    Command::new("heatmap")
                        .about("Last 12 months with the completed-month average")
                        .arg(json_flag())
                        .arg(jsonl_flag()),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export the expense list")
                .subcommand(
                    Command::new("expenses")
                        .about("Write the full list to a file")
                        .arg(
                            arg!(--format <FORMAT> "csv or json")
                                .required(false)
                                .default_value("csv"),
                        )
                        .arg(
                            arg!(--out <PATH> "Output path, defaults to expenses_<today>")
                                .required(false),
                        ),
                ),
        )
        .subcommand(Command::new("doctor").about("Scan stored data for integrity issues"))
}
