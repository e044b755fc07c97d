// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;

use cashcard_server::{
    api::router,
    auth::{DirectoryError, UserDirectory},
    config::{Config, ConfigError},
    demo,
    logging::{self, LogFormat},
    state::AppState,
    storage::{CashCardStore, InMemoryStore, RedbStore, StoreError},
};

/// Time in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("failed to install rustls crypto provider")]
    CryptoProvider,

    #[error("cannot load TLS certificate or key: {0}")]
    Tls(#[source] std::io::Error),

    #[error("server failed: {0}")]
    Server(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            logging::init(LogFormat::default());
            tracing::error!(error = %err, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Cash card server stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), StartupError> {
    let store = open_store(&config)?;
    let users = load_users(&config)?;

    if config.seed_demo_data {
        demo::seed_demo_cards(store.as_ref())?;
    }

    let state = AppState::new(store, users).with_paging(config.paging);
    let app = router(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|_| StartupError::BindAddress(config.bind_address()))?;

    let handle: Handle<SocketAddr> = Handle::new();
    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));
    tokio::spawn({
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        async move {
            shutdown.cancelled().await;
            tracing::info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Shutting down");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    match &config.tls {
        Some(tls) => {
            // Must be installed before any rustls config is built
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| StartupError::CryptoProvider)?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .map_err(StartupError::Tls)?;

            tracing::info!(%addr, "Cash card server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Server)?;
        }
        None => {
            tracing::info!(%addr, "Cash card server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Server)?;
        }
    }

    tracing::info!("Cash card server stopped");
    Ok(())
}

fn open_store(config: &Config) -> Result<Arc<dyn CashCardStore>, StoreError> {
    match &config.data_dir {
        Some(dir) => Ok(Arc::new(RedbStore::open_in_dir(dir)?)),
        None => {
            tracing::warn!("DATA_DIR not set; cash cards are kept in memory only");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

fn load_users(config: &Config) -> Result<UserDirectory, DirectoryError> {
    let mut users = match &config.users_file {
        Some(path) => {
            let users = UserDirectory::from_file(path)?;
            tracing::info!(path = %path.display(), count = users.len(), "Loaded user directory");
            users
        }
        None => UserDirectory::new(),
    };

    if config.seed_demo_data {
        for username in users.insert_missing(demo::demo_users()) {
            tracing::warn!(%username, "Demo user skipped; USERS_FILE entry kept");
        }
        tracing::info!("Added demo users");
    }

    if users.is_empty() {
        tracing::warn!("No users configured; every cash card request will be rejected");
    }
    Ok(users)
}

async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
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
    shutdown.cancel();
}
