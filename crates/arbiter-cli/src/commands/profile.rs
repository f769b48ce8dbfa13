//! The profile command: inspect bias profiles.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use arbiter_domain::traits::ArbitrationStore;
use arbiter_store::SqliteStore;

/// Execute the profile command.
pub fn execute_profile(args: ProfileArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = SqliteStore::new(&config.db_path)?;

    match args.action {
        ProfileAction::List => {
            let profiles = store.list_profiles()?;
            println!("{}", formatter.format_profiles(&profiles)?);
        }
        ProfileAction::Show { name } => match store.get_profile(&name)? {
            Some(profile) => println!("{}", formatter.format_profiles(&[profile])?),
            None => println!("{}", formatter.error(&format!("No profile named '{}'", name))),
        },
    }
    Ok(())
}
