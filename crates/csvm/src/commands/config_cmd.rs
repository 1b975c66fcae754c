//! Config command implementation

use anyhow::Result;
use clap::Args;
use csv_mail_core::config::{resolve_config, Config, ConfigOverrides, ConfigSources};
use csv_mail_core::home::get_home_dir;
use serde_json::json;
use std::path::Path;

const MASK: &str = "********";

/// Show effective configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Extra config file, applied over the discovered ones
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

/// Execute the config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;

    let overrides = ConfigOverrides {
        config_path: args.config,
        ..Default::default()
    };
    let config = masked(resolve_config(&overrides, &current_dir, &home_dir)?);
    let sources = ConfigSources::discover(&overrides, &current_dir, &home_dir);

    if args.json {
        let output = json!({
            "smtp": config.smtp,
            "notify": config.notify,
            "sender": config.sender(),
            "configFiles": {
                "global": file_entry(&sources.global),
                "repo": sources.repo.as_deref().map(file_entry),
                "explicit": sources.explicit.as_deref().map(file_entry),
            },
            "appliedFiles": sources
                .existing()
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let smtp = &config.smtp;
    println!("Configuration:");
    println!("  smtp.host: {}", smtp.host);
    println!("  smtp.port: {}", smtp.port);
    println!("  smtp.username: {}", smtp.username.as_deref().unwrap_or("(not set)"));
    println!("  smtp.password: {}", smtp.password.as_deref().unwrap_or("(not set)"));
    println!("  smtp.security: {}", smtp.security);
    println!("  notify.transport: {}", config.notify.transport);
    if let Some(ref dir) = config.notify.outbox_dir {
        println!("  notify.outbox_dir: {}", dir.display());
    }
    println!("  sender: {}", config.sender().unwrap_or("(not set)"));
    println!();
    println!("Config files:");
    println!("  Global: {}", describe(&sources.global));
    match sources.repo {
        Some(ref repo) => println!("  Repo: {}", describe(repo)),
        None => println!("  Repo: (none)"),
    }
    if let Some(ref explicit) = sources.explicit {
        println!("  Explicit: {}", describe(explicit));
    }
    let applied = sources.existing();
    if applied.is_empty() {
        println!("  Applied: (defaults only)");
    } else {
        let applied: Vec<String> = applied.iter().map(|p| p.display().to_string()).collect();
        println!("  Applied: {}", applied.join(" -> "));
    }

    Ok(())
}

fn masked(mut config: Config) -> Config {
    if config.smtp.password.is_some() {
        config.smtp.password = Some(MASK.to_string());
    }
    config
}

fn file_entry(path: &Path) -> serde_json::Value {
    json!({
        "path": path.display().to_string(),
        "exists": path.exists(),
    })
}

fn describe(path: &Path) -> String {
    let status = if path.exists() { "(found)" } else { "(not found)" };
    format!("{} {status}", path.display())
}
