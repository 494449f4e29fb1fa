// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::rc::Rc;

use anyhow::Result;

use spendlog::identity::LocalIdentity;
use spendlog::session::Session;
use spendlog::store::SqliteStore;
use spendlog::{cli, commands, db};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = Rc::new(db::open_or_init()?);
    let store = Rc::new(SqliteStore::new(Rc::clone(&conn)));
    let identity = Rc::new(LocalIdentity::new(Rc::clone(&conn)));
    let session = Session::new(identity, store);
    session.start()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("login", sub)) => commands::auth::login(&session, sub)?,
        Some(("logout", _)) => commands::auth::logout(&session)?,
        Some(("whoami", _)) => commands::auth::whoami(&session)?,
        Some(("expense", sub)) => commands::expenses::handle(&session, sub)?,
        Some(("stats", sub)) => commands::reports::handle(&session, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&session, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    session.shutdown();
    Ok(())
}
