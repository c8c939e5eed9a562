use std::time::Duration;

use agora_core::AgoraCore;
use axum::{
    http::{header, HeaderValue},
    Router,
};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

pub mod auth;
pub mod error;
pub mod render;
pub mod routes;
pub mod session_store;
pub mod state;
pub mod templates;


use auth::GithubOAuth;
use session_store::DbSessionStore;
use state::AppState;

pub const SESSION_COOKIE: &str = "agora-session";

const SESSION_CLEANUP_PERIOD: Duration = Duration::from_secs(60 * 60);

/// The whole application: routes, sessions and response headers.
pub fn router(state: AppState, secure_cookies: bool) -> Router {
    let session_layer = SessionManagerLayer::new(DbSessionStore::new(state.forum.sessions.clone()))
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        // Forms carry no token; cross-site POSTs arrive without the cookie
        .with_same_site(SameSite::Lax)
        .with_secure(secure_cookies)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(30),
        ));

    routes::routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

/// Serve until Ctrl+C or SIGTERM, then close the database.
pub async fn serve(core: AgoraCore) -> anyhow::Result<()> {
    let github = GithubOAuth::new(&core.credentials, &core.config.public_url)?;
    let state = AppState::new(core.forum.clone(), github);

    if !core.config.secure_cookies {
        warn!("Secure cookies disabled; set AGORA_SECURE_COOKIES=true behind HTTPS");
    }
    let app = router(state, core.config.secure_cookies);

    tokio::spawn(cleanup_sessions(DbSessionStore::new(
        core.forum.sessions.clone(),
    )));

    let listener = TcpListener::bind(core.config.bind_address.as_str()).await?;
    info!("Agora listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    core.shutdown().await?;
    Ok(())
}

async fn cleanup_sessions(store: DbSessionStore) {
    let mut interval = tokio::time::interval(SESSION_CLEANUP_PERIOD);
    loop {
        interval.tick().await;
        match store.delete_expired().await {
            Ok(removed) => debug!("Removed {removed} expired sessions"),
            Err(e) => warn!("Failed to remove expired sessions: {e}"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
