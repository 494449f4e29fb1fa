// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::session::Session;

pub fn login(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("user").unwrap().trim().to_string();
    if name.is_empty() {
        anyhow::bail!("Profile name must not be blank");
    }
    let user = session.sign_in(&name)?;
    println!("Signed in as {} ({})", user.display_name, user.id);
    Ok(())
}

pub fn logout(session: &Session) -> Result<()> {
    session.sign_out()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(session: &Session) -> Result<()> {
    match session.user() {
        Some(user) => println!("{} ({})", user.display_name, user.id),
        None => println!("Not signed in"),
    }
    Ok(())
}
