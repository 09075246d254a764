//! frg-client - command line client for the PickMe Finance Reporting Gateway
//!
//! ## Usage
//!
//! ```bash
//! # Run a report against UAT
//! FRG_HMAC_SECRET=... frg-client fetch driver-trip-summary --driver-id 223
//!
//! # Filter transactions and export as CSV
//! frg-client -e staging fetch driver-trip-transaction --driver-id 223 \
//!     --from-date 2024-01-01 --to-date 2024-01-31 --format csv
//!
//! # Show the signed request without sending it
//! frg-client fetch taxi-profile --id 42 --dry-run
//!
//! # Check an environment end to end
//! frg-client -e production smoke
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Read};
use tracing::{debug, info};

mod cli;

use cli::{Args, Command, ConfigAction, FetchArgs, SignArgs};
use frg_client::config::{self, env::print_env_help, ConfigFile, EnvConfig, ProfileManager};
use frg_client::models::{ActionType, ReportRequest};
use frg_client::output::{OutputFormat, ReportFormatter};
use frg_client::smoke::run_smoke;
use frg_client::utils::{init_logger, LogLevel};
use frg_client::{GatewayClient, SignedRequest};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        args.log_level
            .as_deref()
            .or(env.log_level.as_deref())
            .map(|s| LogLevel::from_str(s).with_context(|| format!("Unknown log level: {s}")))
            .transpose()?
            .unwrap_or_default()
    };
    init_logger(level);
    debug!("Environment: {:?}", env);

    match &args.command {
        Command::Fetch(fetch_args) => {
            run_fetch(&args, &env, fetch_args).await?;
        }
        Command::Smoke(smoke_args) => {
            let client = build_client(&args, &env)?;
            let format = output_format(smoke_args.format.as_deref(), &env)?;
            let outcomes = run_smoke(&client, smoke_args.driver_id).await;

            let formatter =
                ReportFormatter::new(format).with_color(std::io::stdout().is_terminal());
            println!("{}", formatter.format_smoke(&outcomes));

            let failed = outcomes.iter().filter(|o| !o.is_success()).count();
            if failed > 0 {
                bail!("{} of {} smoke reports failed", failed, outcomes.len());
            }
        }
        Command::List => {
            list_actions();
        }
        Command::Sign(sign_args) => {
            sign_body(&args, &env, sign_args)?;
        }
        Command::Config(config_args) => {
            manage_config(&args, &env, &config_args.action)?;
        }
    }

    Ok(())
}

/// Resolve configuration and build the gateway client
fn build_client(args: &Args, env: &EnvConfig) -> Result<GatewayClient> {
    let overrides = args.overrides();
    let file = config::load_config_file(&overrides, env)?;
    let client_config = config::resolve(&overrides, env, &file)?;

    info!(
        "Using environment '{}' at {}",
        config::environment_name(&overrides, env, &file),
        client_config.service_endpoint
    );

    GatewayClient::new(client_config).context("Failed to create gateway client")
}

fn output_format(flag: Option<&str>, env: &EnvConfig) -> Result<OutputFormat> {
    match flag.or(env.format.as_deref()) {
        Some(name) => OutputFormat::from_str(name)
            .with_context(|| format!("Unknown output format: {name}")),
        None => Ok(OutputFormat::default()),
    }
}

/// Run one report from the fetch arguments
async fn run_fetch(args: &Args, env: &EnvConfig, fetch_args: &FetchArgs) -> Result<()> {
    fetch_args.check_filters()?;
    let client = build_client(args, env)?;
    let format = output_format(fetch_args.format.as_deref(), env)?;
    let action = fetch_args.report;

    match action {
        ActionType::PeopleProfile => {
            execute(&client, action, &fetch_args.people_profile(), fetch_args, format).await
        }
        ActionType::DriverProfile => {
            execute(&client, action, &fetch_args.driver_profile(), fetch_args, format).await
        }
        ActionType::TaxiProfile => {
            execute(&client, action, &fetch_args.taxi_profile(), fetch_args, format).await
        }
        ActionType::TaxiDriverMapping => {
            let request = fetch_args.taxi_driver_mapping();
            execute(&client, action, &request, fetch_args, format).await
        }
        ActionType::VehicleModelProfile => {
            let request = fetch_args.vehicle_model_profile();
            execute(&client, action, &request, fetch_args, format).await
        }
        ActionType::DriverTripTransaction => {
            let request = fetch_args.transaction_filters();
            execute(&client, action, &request, fetch_args, format).await
        }
        ActionType::DriverTripSummary => {
            execute(&client, action, &fetch_args.trip_summary(), fetch_args, format).await
        }
        ActionType::DriverRecentTripSummary => {
            let request = fetch_args.recent_trip_summary();
            execute(&client, action, &request, fetch_args, format).await
        }
        ActionType::DriverBlockReason => {
            execute(&client, action, &fetch_args.block_reason(), fetch_args, format).await
        }
        ActionType::DriverCancelReason => {
            execute(&client, action, &fetch_args.cancel_reason(), fetch_args, format).await
        }
        ActionType::DriverCreditDebit => {
            execute(&client, action, &fetch_args.credit_debit(), fetch_args, format).await
        }
    }
}

async fn execute<R: ReportRequest>(
    client: &GatewayClient,
    action: ActionType,
    request: &R,
    fetch_args: &FetchArgs,
    format: OutputFormat,
) -> Result<()> {
    if fetch_args.dry_run {
        let signed = client.prepare(action, request)?;
        print_signed(&signed);
        return Ok(());
    }

    if fetch_args.validate_only {
        let response = client.validate(action, request).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let data = client.fetch(action, request).await?;
    info!("{}: {} records", action, data.total_records());
    println!("{}", ReportFormatter::new(format).format_report(action, &data)?);
    Ok(())
}

fn print_signed(signed: &SignedRequest) {
    println!("POST {}", signed.url);
    for (name, value) in signed.redacted_headers() {
        println!("{name}: {value}");
    }
    println!();
    println!("{}", signed.body);
}

/// Print the report actions
fn list_actions() {
    println!("\nReport Actions:");
    println!("─────────────────────────────────────────────────────────────────────────");
    println!(
        "{:30} {:28} {:12} {}",
        "Action", "Name", "Category", "Collection"
    );
    println!("─────────────────────────────────────────────────────────────────────────");
    for action in ActionType::all() {
        println!(
            "{:30} {:28} {:12} {}",
            action.as_str(),
            action.name(),
            action.category().name(),
            action.collection()
        );
    }
    println!();
}

/// Print the HMAC of a body with the resolved secret
fn sign_body(args: &Args, env: &EnvConfig, sign_args: &SignArgs) -> Result<()> {
    let body = match (&sign_args.body, &sign_args.file) {
        (Some(body), _) => body.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read body from: {}", path.display()))?,
        (None, None) => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read body from stdin")?;
            body
        }
    };

    let overrides = args.overrides();
    let file = config::load_config_file(&overrides, env)?;
    let client_config = config::resolve(&overrides, env, &file)?;

    println!("{}", frg_client::sign(&client_config.hmac_secret, &body)?);
    Ok(())
}

fn manage_config(args: &Args, env: &EnvConfig, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                bail!(
                    "{} already exists, pass --force to overwrite it",
                    output.display()
                );
            }
            ConfigFile::example().save(output)?;
            println!("Wrote example configuration to {}", output.display());
            println!("Set hmac_secret for each environment before use.");
        }
        ConfigAction::Show { env_vars } => {
            let overrides = args.overrides();
            let file = config::load_config_file(&overrides, env)?;

            println!("Environments:");
            for profile in ProfileManager::with_file(&file).list() {
                println!(
                    "  {:12} {}",
                    profile.name,
                    profile.endpoint.as_deref().unwrap_or("(no endpoint)")
                );
            }
            println!();

            match config::resolve(&overrides, env, &file) {
                Ok(resolved) => {
                    println!(
                        "Active environment: {}",
                        config::environment_name(&overrides, env, &file)
                    );
                    println!("  endpoint:    {}", resolved.service_endpoint);
                    println!("  hmac_secret: {}", config::mask(&resolved.hmac_secret));
                    println!(
                        "  auth_token:  {}",
                        resolved.auth_token.as_deref().map(config::mask).unwrap_or_default()
                    );
                    println!(
                        "  csrf_token:  {}",
                        resolved.csrf_token.as_deref().map(config::mask).unwrap_or_default()
                    );
                    println!("  timeout:     {}s", resolved.timeout_secs);
                }
                Err(e) => println!("Active environment is incomplete: {e}"),
            }

            if *env_vars {
                println!();
                if env.has_any() {
                    env.print_summary();
                } else {
                    println!("No {}_* variables set.", config::env::ENV_PREFIX);
                }
            }
        }
        ConfigAction::Env => {
            print_env_help();
        }
    }
    Ok(())
}
