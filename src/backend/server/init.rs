/**
 * Server Initialization
 *
 * This module assembles the application from a [`ServerConfig`]: it
 * connects the stores, starts the realtime hub and the publish retry
 * worker, and wires everything into the router.
 *
 * # Initialization Process
 *
 * 1. Connect the configured store backend
 * 2. Create the channel hub and the retry worker publishing through it
 * 3. Build the messaging service and the application state
 * 4. Create the router
 * 5. Start the periodic cleanup of idle realtime channels
 */

use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::auth::JwtSessionResolver;
use crate::backend::error::BackendError;
use crate::backend::messaging::{MessagingService, PublishRetryQueue, UuidGenerator};
use crate::backend::realtime::{ChannelHub, Publisher};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;

/// How often channels without subscribers are dropped
const CHANNEL_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Build the application state from configuration
pub async fn build_state(config: &ServerConfig) -> Result<AppState, BackendError> {
    let stores = config.store.connect().await?;

    let hub = ChannelHub::new();
    let publisher: Arc<dyn Publisher> = Arc::new(hub.clone());
    let retry = PublishRetryQueue::spawn(publisher.clone(), config.retry);
    tracing::info!(
        "[Retry] Publish retry worker started ({} attempts, base {:?})",
        config.retry.max_attempts,
        config.retry.base_delay
    );

    let messaging = MessagingService::new(
        stores.kv,
        stores.log,
        publisher,
        Arc::new(UuidGenerator),
        retry,
    );

    Ok(AppState::new(
        Arc::new(JwtSessionResolver::new(config.jwt_secret.clone())),
        hub,
        messaging,
    ))
}

/// Create and configure the Axum application
///
/// Fails only when the configured store cannot be reached.
pub async fn create_app(config: &ServerConfig) -> Result<Router, BackendError> {
    tracing::info!("Initializing xfchat backend server");

    let app_state = build_state(config).await?;
    let app = create_router(app_state.clone());

    let hub = app_state.hub.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CHANNEL_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            hub.cleanup_inactive_channels();
            tracing::debug!(
                "[Realtime] Cleaned up idle channels, {} remain",
                hub.channel_count()
            );
        }
    });

    tracing::info!("Router configured with periodic cleanup task");
    Ok(app)
}
