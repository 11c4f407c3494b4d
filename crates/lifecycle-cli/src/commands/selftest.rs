//! Self-test command implementation

use colored::Colorize;

use crate::error::{CliError, Result};

/// Run the embedded self-test suite.
pub fn run() -> Result<()> {
    println!("{} Running self-test suite...", "=>".blue().bold());

    if lifecycle_core::selftest::run() {
        println!("{} All self-tests passed.", "OK".green().bold());
        Ok(())
    } else {
        Err(CliError::user("Self-test suite failed"))
    }
}
