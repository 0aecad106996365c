//! AppVerify terminal client
//!
//! Loads configuration, starts the verification session and reads commands
//! from stdin until `quit` or end of input.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{self, BufReader};

use av_app::{logging, Runner, TerminalView};
use av_core::{DeepLinkResolver, VerificationService, VerificationServiceConfig};
use av_infra::device::SystemDeviceInfo;
use av_shared::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        base_url = %config.base_url(),
        event = "client_starting",
        "Starting AppVerify client"
    );

    let backend = av_infra::create_backend(&config)
        .context("Failed to create verification backend")?
        .with_device_info(Arc::new(SystemDeviceInfo::new(
            "appverify",
            env!("CARGO_PKG_VERSION"),
        )));

    let (service, mut events) = VerificationService::new(
        backend.token_provider,
        backend.transport,
        VerificationServiceConfig::from_app_config(&config),
    );
    let handle = service.with_device_info(backend.device_info).spawn();

    let resolver = Arc::new(DeepLinkResolver::new(config.deep_link.clone()));
    resolver.register(handle.clone());

    let mut runner = Runner::new(handle, resolver.clone(), TerminalView::new(std::io::stdout()));
    runner
        .run(BufReader::new(io::stdin()), &mut events)
        .await
        .context("Failed to read input")?;

    resolver.unregister();
    tracing::info!(event = "client_stopped", "AppVerify client stopped");
    Ok(())
}
