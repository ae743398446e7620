// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use mirage_client::{
    api::router,
    attestation::SignProtocolClient,
    blockchain::{
        signing::{signer_from_hex, signer_from_pem_file},
        EvmWallet,
    },
    config::{AppConfig, KeySource, LogFormat, DEFAULT_LOG_FILTER},
    pinning::PinataClient,
    state::AppState,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let signer = match &config.key {
        KeySource::Hex(hex) => signer_from_hex(hex)?,
        KeySource::PemFile(path) => signer_from_pem_file(path)?,
    };
    let address = signer.address();

    let wallet = Arc::new(EvmWallet::new(
        signer,
        config.networks.clone(),
        config.contracts,
    ));

    let pinner = PinataClient::new(
        config.pinata.api_url.clone(),
        config.pinata.api_key.clone(),
        config.pinata.api_secret.clone(),
        config.pinata.gateway.clone(),
    )?;

    // The attestation contract lives on the verification chain regardless of
    // where the wallet is switched to.
    let attestor = SignProtocolClient::new(
        config.sign_protocol_api_url.clone(),
        config.sign_protocol_contract,
        address,
        wallet.provider_for(config.plan.verification_chain)?,
    )?;

    let state = AppState::new(
        config.environment_id.clone(),
        wallet,
        Arc::new(pinner),
        Arc::new(attestor),
        config.plan,
    );
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        wallet = %address,
        message_chain = config.plan.message_chain,
        payment_chain = config.plan.payment_chain,
        "Mirage client listening (docs at /docs)"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
