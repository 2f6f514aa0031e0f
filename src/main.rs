//! `project-sync` - follows one project's event stream from the command line.
//!
//! Configuration comes from `PROJECT_SYNC__*` environment variables (see
//! [`project_sync::config::SyncConfig`]). Ctrl-C deactivates the session and
//! stops the health monitor before exiting.

use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use project_sync::adapters::{
    HttpProjectStore, ReqwestConnectivityProbe, ReqwestEventTransport, StaticCredentialProvider,
};
use project_sync::application::{EventRouter, HealthMonitor, HealthMonitorConfig, StreamSession};
use project_sync::config::{LogConfig, SyncConfig};
use project_sync::domain::foundation::ProjectId;
use project_sync::domain::stream::ResourceKind;
use project_sync::ports::{CredentialProvider, ProjectStore};

fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let fmt_layer = fmt::layer().with_target(true);

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::load()?;
    config.validate()?;
    init_logging(&config.log);

    let project_id = ProjectId::new(config.session.project_id.clone())?;
    let credentials = Arc::new(StaticCredentialProvider::new(config.session.token()));

    let store = Arc::new(
        HttpProjectStore::new(&config.api.base_url, config.api.timeout())?
            .with_credentials(credentials.clone()),
    );
    store.select_project(Some(project_id.clone())).await;
    for kind in [ResourceKind::Frames, ResourceKind::Creatives, ResourceKind::ProjectDetails] {
        if let Err(error) = store.refetch(kind).await {
            tracing::warn!(resource = kind.as_str(), %error, "initial fetch failed");
        }
    }

    let probe = Arc::new(ReqwestConnectivityProbe::new(
        &config.health.probe_url,
        config.health.probe_timeout(),
    )?);
    let monitor = HealthMonitor::spawn(probe, HealthMonitorConfig::from(&config.health));
    monitor.start();

    let router = Arc::new(EventRouter::new(store.clone()));
    let transport = Arc::new(ReqwestEventTransport::new(&config.stream.base_url)?);
    let session = StreamSession::builder(transport, router)
        .with_credentials(credentials.clone())
        .with_health_reporter(Arc::new(monitor.clone()))
        .with_reconnect_delay(config.stream.reconnect_delay())
        .spawn();

    session
        .update_target(project_id, credentials.current_credential(), true)
        .await;

    let mut session_updates = session.subscribe();
    let mut health_updates = monitor.subscribe();

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(error) = result {
                    tracing::error!(%error, "failed to listen for Ctrl-C");
                }
                break;
            }
            Ok(()) = session_updates.changed() => {
                let snapshot = session_updates.borrow_and_update().clone();
                tracing::info!(
                    state = %snapshot.state,
                    connected = snapshot.connected,
                    last_event = snapshot.last_event.as_deref().unwrap_or("-"),
                    last_error = snapshot.last_error.as_deref().unwrap_or("-"),
                    "session updated"
                );
            }
            Ok(()) = health_updates.changed() => {
                let status = *health_updates.borrow_and_update();
                tracing::info!(%status, offline = status.is_offline(), "health updated");
            }
        }
    }

    tracing::info!("shutting down");
    session.deactivate().await;
    monitor.stop().await;

    let frames = store.frames().await;
    let done = frames.iter().filter(|frame| frame.status.is_complete()).count();
    tracing::info!(frames = frames.len(), done, "final frame summary");

    Ok(())
}
