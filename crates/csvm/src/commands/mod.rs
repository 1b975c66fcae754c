//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Parser, Subcommand};

mod config_cmd;
mod run;

/// csvm - CSV editing with email notifications
#[derive(Parser, Debug)]
#[command(
    name = "csvm",
    version,
    about = "Edit a CSV file interactively and get emailed about every change",
    long_about = "Prompts for records to write, update or delete in a CSV file, \
                  emails a notification for each change and a summary with the \
                  file attached on exit"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive session (the default)
    Run(run::RunArgs),

    /// Show effective configuration
    Config(config_cmd::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Some(Commands::Run(args)) => run::execute(args),
            Some(Commands::Config(args)) => config_cmd::execute(args),
            None => run::execute(run::RunArgs::default()),
        }
    }
}
