//! The status command: poll a request by id.

use crate::cli::StatusArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use arbiter_domain::traits::ArbitrationStore;
use arbiter_domain::{RequestId, RequestStatus};
use arbiter_store::SqliteStore;

/// Execute the status command.
pub fn execute_status(args: StatusArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let id = RequestId::from_string(&args.request_id).map_err(CliError::InvalidInput)?;
    let store = SqliteStore::new(&config.db_path)?;

    match store.get_request(id)? {
        Some(request) => {
            println!("{}", formatter.format_request(&request)?);
            if request.status == RequestStatus::Completed {
                if let Some(result) = store.get_result(id)? {
                    println!("{}", formatter.format_result(&result)?);
                }
            }
        }
        None => println!("{}", formatter.error("Request not found")),
    }
    Ok(())
}
