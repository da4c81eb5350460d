use std::sync::Arc;

use tgr_core::{config::Config, session::TelegramSession, store::SessionStore};
use tgr_http::AppState;
use tgr_mtproto::{MtprotoClient, StdinPrompt};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tgr_core::config::load_dotenv();
    tgr_core::logging::init("tgr")?;

    let cfg = Config::load()?;

    let store = SessionStore::new(&cfg.session_dir, &cfg.phone);
    store.ensure_dir()?;

    let client = Arc::new(MtprotoClient::new(cfg.credentials()));
    let session = Arc::new(TelegramSession::new(client, store));

    if let Err(e) = session.initialize(&StdinPrompt).await {
        error!(error = %e, "failed to initialize Telegram session");
        return Err(e.into());
    }
    info!("Telegram session initialized");

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr()).await?;
    tgr_http::serve(listener, AppState::new(session.clone()), shutdown_signal()).await?;

    session.disconnect().await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!(error = %e, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
