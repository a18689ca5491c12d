use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use todo_server::config::{Config, StorageBackend};
use todo_server::{telemetry, MemoryStore, PgStore, TodoStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    telemetry::init(&config.log);
    telemetry::install_panic_hook();

    let pg = match config.storage {
        StorageBackend::Memory => None,
        StorageBackend::Postgres => {
            let store = PgStore::connect(&config.database).await?;
            store.ensure_schema().await?;
            Some(store)
        }
    };
    let store: Arc<dyn TodoStore> = match &pg {
        Some(store) => Arc::new(store.clone()),
        None => Arc::new(MemoryStore::new()),
    };

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        storage = store.backend(),
        db_host = %config.database.host,
        db_port = config.database.port,
        db_name = %config.database.name,
        db_user = %config.database.user,
        version = %config.version,
        trace_endpoint = %config.trace_endpoint,
        "backend server started"
    );

    todo_server::serve(listener, store, shutdown_signal()).await?;

    if let Some(store) = pg {
        store.close().await;
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
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
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        () = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
