//! Command handlers. Output goes to stdout; diagnostics go through `log`.

use crate::cli::{Cli, Command};
use crate::error::AppError;

use client_core::RemoteClient;
use client_core::config::{self, ClientConfig};
use client_core::events::ClientEvent;

use models::ConnectionState;

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;

/// Config directory from the command line, else the platform default.
pub fn config_dir(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .or_else(config::default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load `remote.toml` and apply environment overrides.
pub fn load_config(cli: &Cli) -> Result<ClientConfig, AppError> {
    config::try_load_dotenv();

    let mut config = ClientConfig::load(&config_dir(cli))?;
    config.apply_env_overrides()?;

    if let Command::Scan {
        timeout: Some(timeout),
    } = &cli.command
    {
        debug!("Scan timeout from command line: {timeout:?}");
        config.discovery.timeout = *timeout;
        config.validate()?;
    }

    Ok(config)
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config_dir = config_dir(&cli);
    let config = load_config(&cli)?;
    let client = RemoteClient::new(config)?;

    match cli.command {
        Command::Status => status(&client, &config_dir).await,
        Command::Connect { host, port } => connect(&client, &host, port.as_deref()).await,
        Command::Scan { .. } => scan(&client).await,
        Command::Forget => forget(&client).await,
        Command::Watch { host, port } => watch(&client, &host, port.as_deref()).await,
    }
}

async fn status(client: &RemoteClient, config_dir: &Path) -> Result<(), AppError> {
    let config = client.config();

    println!("{}", client.status_text().await);
    match client.saved_connection().await {
        Some(endpoint) => println!("Saved connection: {endpoint}"),
        None => println!("Saved connection: none"),
    }
    println!("Config directory: {}", config_dir.display());
    println!("Record file:      {}", client.store().path().display());
    println!("Default port:     {}", config.connection.default_port);
    println!(
        "Scan:             port {}, budget {}, {} concurrent probes",
        config.discovery.port,
        humantime::format_duration(config.discovery.timeout),
        config.discovery.concurrency
    );
    Ok(())
}

async fn connect(client: &RemoteClient, host: &str, port: Option<&str>) -> Result<(), AppError> {
    let endpoint = client.connect(host, port.unwrap_or_default()).await?;
    println!("{}", client.status_text().await);

    info!("Connected to {endpoint}");
    client.disconnect().await;
    Ok(())
}

async fn scan(client: &RemoteClient) -> Result<(), AppError> {
    println!("Scanning network...");

    let scan = client.scan();
    tokio::pin!(scan);

    let report = tokio::select! {
        report = &mut scan => report,
        _ = signal::ctrl_c() => {
            info!("Interrupted, cancelling scan");
            client.cancel_scan();
            scan.await
        }
    };

    for server in &report.servers {
        println!("  {}", server.display_name());
    }
    println!("{}", report.status_text());
    Ok(())
}

async fn forget(client: &RemoteClient) -> Result<(), AppError> {
    if client.forget_saved().await? {
        println!("Saved connection removed");
    } else {
        println!("No saved connection");
    }
    Ok(())
}

async fn watch(client: &RemoteClient, host: &str, port: Option<&str>) -> Result<(), AppError> {
    let mut events = client.subscribe();

    client.connect(host, port.unwrap_or_default()).await?;
    println!("{} (Ctrl-C to stop)", client.status_text().await);

    if client.config().connection.liveness_interval.is_none() {
        warn!("connection.liveness_interval is not set; a lost bridge will not be noticed");
    }

    let interrupted = signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                info!("Interrupted, disconnecting");
                client.disconnect().await;
                println!("{}", client.status_text().await);
                return Ok(());
            }
            event = events.recv() => match event {
                Ok(ClientEvent::StateChanged(state)) => {
                    println!("State: {state}");
                    if let ConnectionState::Failed(reason) = state {
                        return Err(AppError::app(format!("Connection failed: {reason}")));
                    }
                }
                Ok(ClientEvent::Status(text)) => debug!("Status: {text}"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Missed {skipped} event(s)");
                    println!("State: {}", client.state().await);
                }
                Err(RecvError::Closed) => return Ok(()),
            },
        }
    }
}
