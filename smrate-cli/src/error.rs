//! CLI error handling with user-friendly messages.

use smrate::fetch::FetchError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Failed to create the HTTP fetcher
    Fetcher(FetchError),
}

impl CliError {
    /// Exits the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Fetcher(_) = self {
            eprintln!();
            eprintln!("The HTTP client could not be constructed; check your");
            eprintln!("TLS installation and the --timeout value.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "failed to initialize logging: {}", e),
            CliError::Fetcher(e) => write!(f, "failed to create HTTP fetcher: {}", e),
        }
    }
}

impl std::error::Error for CliError {}
