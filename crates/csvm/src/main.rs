//! csvm - Edit a CSV file interactively and get emailed about every change
//!
//! A thin CLI over `csv-mail-core`: prompts for records on stdin, applies
//! them to the CSV file, and sends a notification per change plus a summary
//! with the file attached when the session ends.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    csv_mail_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
