mod cli;
mod executor;

use std::{process::ExitCode, sync::Arc, time::Duration};

use clap::Parser;
use env_logger::Builder;
use log::{debug, error, info};
use tokio::{
    signal::unix::{signal, Signal, SignalKind},
    task,
    time::sleep,
};

use dyndns_helper::{
    ipsource::{FixedSource, HttpSource, HttpSourceConfig, IpSource, SourceError},
    provider::{CloudflareProvider, CloudflareProviderConfig, Provider, ProviderError},
};

use cli::Cli;
use executor::Executor;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    Builder::new().filter_level(cli.loglevel.into()).init();

    if cli.dry_run {
        info!("Running in dry-run mode, no changes to the DNS provider will be made");
    }

    // Anything that can only fail because of bad configuration or unusable
    // credentials fails here, before the update loop starts.
    let provider = match get_provider(&cli) {
        Ok(p) => {
            info!("Connected to provider");
            p
        }
        Err(e) => {
            error!("Unable to create provider: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let source = match get_source(&cli) {
        Ok(s) => {
            info!("Created IP address source");
            s
        }
        Err(e) => {
            error!("Unable to create address source: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let (mut interrupt, mut terminate) = match install_signals() {
        Ok(s) => s,
        Err(e) => {
            error!("Unable to install signal handlers: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let executor = Arc::new(Executor::new(
        source,
        provider,
        cli.hostname.clone(),
        cli.zone.clone(),
        cli.cnames.clone(),
        cli.record_ttl,
    ));

    loop {
        let ex = executor.clone();
        match task::spawn_blocking(move || ex.run_cycle()).await {
            Ok(Ok(result)) => {
                for (record, status) in &result.outcomes {
                    debug!("{}: {}", record, status);
                }
                if result.has_failures() {
                    error!("Last cycle completed with errors");
                }
            }
            // A failed cycle is logged and retried next interval, the
            // service itself keeps running
            Ok(Err(e)) => error!("Error during update cycle: {}", e),
            Err(_) => {
                error!("Update cycle panicked, aborting...");
                return ExitCode::FAILURE;
            }
        }

        if cli.run_once {
            break;
        }

        info!("Sleeping {} seconds", cli.interval);
        tokio::select! {
            _ = sleep(Duration::from_secs(cli.interval)) => {}
            _ = interrupt.recv() => {
                info!("Received shutdown signal, exiting.");
                break;
            }
            _ = terminate.recv() => {
                info!("Received shutdown signal, exiting.");
                break;
            }
        }
    }

    ExitCode::SUCCESS
}

fn install_signals() -> std::io::Result<(Signal, Signal)> {
    Ok((
        signal(SignalKind::interrupt())?,
        signal(SignalKind::terminate())?,
    ))
}

fn get_source(cli: &Cli) -> Result<Box<dyn IpSource>, SourceError> {
    match cli.source {
        cli::IpAddressSource::Http => {
            let mut config = HttpSourceConfig::default();
            if !cli.ipv4_endpoints.is_empty() {
                config.ipv4_endpoints = cli.ipv4_endpoints.to_owned();
            }
            if !cli.ipv6_endpoints.is_empty() {
                config.ipv6_endpoints = cli.ipv6_endpoints.to_owned();
            }
            HttpSource::from_config(&config)
        }
        cli::IpAddressSource::Fixed => Ok(FixedSource::create(
            cli.ipv4_fixed_address.unwrap(),
            cli.ipv6_fixed_address,
        )),
    }
}

fn get_provider(cli: &Cli) -> Result<Box<dyn Provider>, ProviderError> {
    match cli.provider {
        cli::Provider::Cloudflare => {
            CloudflareProvider::from_config(&CloudflareProviderConfig {
                api_token: cli.cloudflare_api_token.as_deref().unwrap(),
                zone: &cli.zone,
                dry_run: cli.dry_run,
            })
        }
    }
}
