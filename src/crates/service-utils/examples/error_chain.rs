//! Example demonstrating error chains across layers
//!
//! A repository fails, a service adds context, and the handler logs the
//! full message while checking the root cause by identity.

use service_utils::logger::{self, error, info, LoggerConfig};
use service_utils::{chain_error, ErrorChain, ResultExt};

fn read_users(path: &str) -> Result<String, ErrorChain> {
    std::fs::read_to_string(path).stack_trace(format!("Failed to open file={}", path))
}

fn find_user(not_found: &ErrorChain, id: u64) -> Result<String, ErrorChain> {
    if id == 0 {
        return Err(not_found.add_stack_trace_fmt(format_args!("Find user id={}", id)));
    }
    Ok(format!("user-{}", id))
}

fn main() -> anyhow::Result<()> {
    logger::init(&LoggerConfig::default())?;

    let not_found = chain_error!("user not found");

    match find_user(&not_found, 0).context("Get users") {
        Ok(user) => info!(user = %user, "Found user"),
        Err(err) => {
            error!(error = %err, root_cause = %err.root_cause_str(), "Request failed");
            if err.is(&not_found) {
                info!("Responding with 404");
            }
            println!("{:?}", err);
        }
    }

    if let Err(err) = read_users("/nonexistent/users.csv").context("Import users") {
        error!(error = %err, "Import failed");
        if let Some(location) = err.iter().find_map(ErrorChain::location) {
            println!("First traced at {}", location);
        }
    }

    Ok(())
}
