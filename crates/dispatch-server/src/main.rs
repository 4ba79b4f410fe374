mod config;
mod identity;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use dispatch_api::AppStateInner;
use dispatch_crypto::Keypair;
use dispatch_db::Database;
use dispatch_relay::{Delegate, NullDelegate, RelayDelegate, SystemClock};
use dispatch_types::api::ServerInfo;

use crate::config::{Config, DelegateKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dispatch_server=debug,dispatch_relay=debug,dispatch_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let identity = identity::load_or_create(config.key_file.as_deref())?;
    info!("Loaded address {}", identity.identify());

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);
    let trackers = db.get_trackers()?;
    info!("{} tracker(s) configured", trackers.len());

    let delegate: Arc<dyn Delegate> = match config.delegate {
        DelegateKind::Relay => Arc::new(RelayDelegate::new(db, Arc::new(SystemClock))),
        DelegateKind::Null => {
            info!("Running with the null delegate: nothing is stored or served");
            Arc::new(NullDelegate)
        }
    };

    let state = Arc::new(AppStateInner {
        delegate,
        info: ServerInfo {
            location: config.location.clone(),
            address: identity.identify(),
            trackers,
        },
    });

    let app = dispatch_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Dispatch mail server for {} listening on {}", config.location, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
