//! Run command implementation

use anyhow::{Context, Result};
use clap::Args;
use csv_mail_core::config::{resolve_config, ConfigOverrides, TransportKind};
use csv_mail_core::home::get_home_dir;
use csv_mail_core::notify::{parse_address, Mailer};
use csv_mail_core::{Session, SessionOptions, SessionState};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Start an interactive session
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// CSV file to edit (skips the path prompt)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Your email address (skips the email prompt)
    #[arg(short, long)]
    email: Option<String>,

    /// Extra config file, applied over the discovered ones
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mail transport: smtp, file or disabled
    #[arg(long)]
    transport: Option<TransportKind>,

    /// Directory for .eml files when the transport is `file`
    #[arg(long)]
    outbox_dir: Option<PathBuf>,
}

/// Execute the run command
pub fn execute(args: RunArgs) -> Result<()> {
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;

    let overrides = ConfigOverrides {
        config_path: args.config,
        transport: args.transport,
        outbox_dir: args.outbox_dir,
    };
    let config = resolve_config(&overrides, &current_dir, &home_dir)?;

    let sender = config
        .sender()
        .map(parse_address)
        .transpose()
        .context("Configured sender is not a valid email address")?;
    let mailer = Mailer::from_config(&config)?;

    let options = SessionOptions {
        email: args.email,
        csv_path: args.file,
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let report = Session::new(stdin.lock(), &mut stdout, &mailer, sender)
        .with_options(options)
        .run()?;
    stdout.flush()?;

    debug!(
        state = ?report.state,
        operations = report.log.len(),
        "Session finished"
    );
    if report.state == SessionState::Terminated {
        if let Some(Err(e)) = report.summary {
            warn!("Summary email for {:?} was not sent: {e}", report.csv_path);
        }
    }

    Ok(())
}
