use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use serde_json::Value;
use std::env;
use tracing::debug;

use crate::cli::cli::{Cli, Commands, ConnectionArgs};
use crate::cli::output::{fetch_output, update_output};
use crate::config::config::{Config, ConfigOverrides};
use crate::core::reconciler;
use crate::core::record::DesiredState;
use crate::logging;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Fetch {
            id,
            list_id,
            redact_password,
        } => {
            let config = load_config(cli.connection)?;
            debug!(id, list_id, "fetch requested");
            let record = reconciler::fetch(&config, id).await?;
            print_json(&fetch_output(&record, redact_password))?;
        }
        Commands::Update {
            id,
            username,
            password,
            prompt_password,
            check,
        } => {
            let password = desired_password(password, prompt_password)?;
            let mut desired = DesiredState::new(id);
            desired.username = username;
            desired.password = password;
            // Reject an empty desired state before prompting for credentials or touching the network.
            desired.validate()?;

            let config = load_config(cli.connection)?;
            let result = reconciler::reconcile(&config, &desired, check).await?;
            print_json(&update_output(&result))?;
        }
    }

    Ok(())
}

fn load_config(args: ConnectionArgs) -> Result<Config> {
    let api_key = match args.api_key {
        Some(k) => Some(SecretString::from(k)),
        None if env::var("PWSTATE_API_KEY").is_ok() => None,
        None => Some(prompt_secret("Passwordstate API key")?),
    };
    let overrides = ConfigOverrides {
        url: args.url,
        api_key,
        header_style: args.header_style.map(Into::into),
        update_route: args.update_route.map(Into::into),
        timeout_secs: args.timeout,
        profile: args.profile,
    };
    Config::create(overrides).context("failed to resolve connection settings")
}

fn desired_password(flag: Option<String>, prompt: bool) -> Result<Option<SecretString>> {
    if let Some(p) = flag {
        return Ok(Some(SecretString::from(p)));
    }
    if prompt {
        let p = inquire::Password::new("Desired password")
            .prompt()
            .context("failed to read desired password")?;
        return Ok(Some(SecretString::from(p)));
    }
    Ok(env::var("PWSTATE_DESIRED_PASSWORD").ok().map(SecretString::from))
}

fn prompt_secret(label: &str) -> Result<SecretString> {
    let value = inquire::Password::new(label)
        .without_confirmation()
        .prompt()
        .with_context(|| format!("{label} not provided; set PWSTATE_API_KEY or pass --api-key"))?;
    Ok(SecretString::from(value))
}

fn print_json(value: &Value) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}
