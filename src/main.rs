use colored::Colorize;
use log_search::{BadRequest, SearchError};
use std::process::ExitCode;

fn main() -> ExitCode {
    match log_search::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            // Client mistakes in the filter get their own exit code
            let bad_request = err.downcast_ref::<BadRequest>().is_some()
                || matches!(
                    err.downcast_ref::<SearchError>(),
                    Some(SearchError::BadRequest(_))
                );
            if bad_request {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
