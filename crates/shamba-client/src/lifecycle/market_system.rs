use crate::api::MarketApi;
use crate::auth::{AuthProvider, AuthSubscription};
use crate::clients::{PaymentClient, PurchaseClient, SessionClient};
use crate::config::MarketConfig;
use crate::session_actor::SessionContext;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The running marketplace client: both actors plus the auth bridge.
///
/// # Example
///
/// ```ignore
/// let system = MarketSystem::start(&config, auth, api);
///
/// system.session_client.initialize().await?;
/// let session = system.session_client.wait_until_settled().await?;
///
/// let order = system.purchase_client.place_order("p9", 20).await?;
/// system.purchase_client.pay(&order, "254712345678").await?;
/// let outcome = system.payment_client.wait_for_outcome().await?;
///
/// system.shutdown().await?;
/// ```
pub struct MarketSystem {
    /// Client for the Session Resolver actor
    pub session_client: SessionClient,

    /// Client for the Payment Poller actor
    pub payment_client: PaymentClient,

    /// Checkout flow on top of the API and the payment poller
    pub purchase_client: PurchaseClient,

    auth_bridge: JoinHandle<()>,

    /// Task handles for both actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl MarketSystem {
    /// Spawns both actors and the auth bridge. Must be called inside a Tokio runtime.
    ///
    /// The resolver is not initialized here; call
    /// [`SessionClient::initialize`] once the system is up.
    pub fn start(
        config: &MarketConfig,
        auth: Arc<dyn AuthProvider>,
        api: Arc<dyn MarketApi>,
    ) -> Self {
        // 1. Create actors (no dependencies)
        let (session_actor, session_client) =
            crate::session_actor::new(config.session.profile_deadline);
        let (payment_actor, payment_client) = crate::payment_actor::new(config.payment.clone());

        // 2. Start actors with injected context
        let session_handle = tokio::spawn(session_actor.run(SessionContext {
            auth: auth.clone(),
            api: api.clone(),
        }));
        let payment_handle = tokio::spawn(payment_actor.run(api.clone()));

        // 3. Subscribe before returning so no event emitted after start is missed
        let auth_bridge = tokio::spawn(bridge_auth_events(
            auth.subscribe(),
            session_client.clone(),
        ));

        let purchase_client = PurchaseClient::new(api, payment_client.clone());
        info!("Market system started");

        Self {
            session_client,
            payment_client,
            purchase_client,
            auth_bridge,
            handles: vec![session_handle, payment_handle],
        }
    }

    /// Gracefully shuts down the system.
    ///
    /// Returns `Err` if any actor task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        // The bridge holds a session client clone; it has to go before the resolver can stop.
        self.auth_bridge.abort();
        if let Err(e) = self.auth_bridge.await {
            if !e.is_cancelled() {
                error!("Auth bridge failed: {:?}", e);
                return Err(format!("Auth bridge failed: {:?}", e));
            }
        }

        drop(self.purchase_client);
        drop(self.session_client);
        drop(self.payment_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

async fn bridge_auth_events(mut subscription: AuthSubscription, session_client: SessionClient) {
    while let Some(event) = subscription.recv().await {
        let name = event.name();
        let identity = event.session().map(|session| session.identity().to_string());
        match session_client.notify(event).await {
            Ok(resolution) => info!(event = name, ?identity, ?resolution, "Auth event handled"),
            Err(e) => {
                warn!(event = name, error = %e, "Session resolver unavailable, stopping auth bridge");
                break;
            }
        }
    }
}
