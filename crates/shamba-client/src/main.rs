//! Demo entry point.
//!
//! Resolves the profile for the session described by `SHAMBA_ACCESS_TOKEN`,
//! `SHAMBA_USER_ID` and `SHAMBA_USER_EMAIL` (when set), optionally watches the payment of
//! `SHAMBA_WATCH_ORDER`, then shuts the system down.

use shamba_actor::tracing::setup_tracing;
use shamba_client::api::HttpMarketApi;
use shamba_client::auth::LocalAuthProvider;
use shamba_client::config::MarketConfig;
use shamba_client::lifecycle::MarketSystem;
use shamba_client::model::{OrderId, Session};
use std::env;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

fn demo_session() -> Option<Session> {
    let access_token = env::var("SHAMBA_ACCESS_TOKEN").ok()?;
    let user_id = env::var("SHAMBA_USER_ID").ok()?;
    let email = env::var("SHAMBA_USER_EMAIL").unwrap_or_default();
    let mut session = Session::new(user_id, email, access_token);
    if let Ok(role) = env::var("SHAMBA_USER_ROLE") {
        session = session.with_role(role);
    }
    Some(session)
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = MarketConfig::from_env().map_err(|e| e.to_string())?;
    info!(base_url = %config.api.base_url, "Starting market client");

    let auth = Arc::new(match demo_session() {
        Some(session) => LocalAuthProvider::with_session(session),
        None => LocalAuthProvider::new(),
    });
    let api = Arc::new(HttpMarketApi::new(&config.api, auth.clone()).map_err(|e| e.to_string())?);
    let system = MarketSystem::start(&config, auth, api);

    let span = tracing::info_span!("session_resolution");
    let settled = async {
        system.session_client.initialize().await?;
        system.session_client.wait_until_settled().await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    match &settled.profile {
        Some(profile) => info!(
            name = %profile.display_name(),
            role = %profile.role,
            fallback = profile.fallback,
            "Profile resolved"
        ),
        None => info!("No active session"),
    }
    if let Some(advisory) = &settled.error {
        warn!(%advisory, "Session advisory");
    }

    if let Ok(order_id) = env::var("SHAMBA_WATCH_ORDER") {
        let span = tracing::info_span!("payment_watch", %order_id);
        let outcome = async {
            system
                .payment_client
                .start(OrderId::from(order_id.as_str()))
                .await?;
            system.payment_client.wait_for_outcome().await
        }
        .instrument(span)
        .await
        .map_err(|e| e.to_string())?;

        info!(state = ?outcome.state, attempts = outcome.attempts, "Payment poll finished");
        if let Some(advisory) = &outcome.advisory {
            warn!(%advisory, "Payment advisory");
        }
    }

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
