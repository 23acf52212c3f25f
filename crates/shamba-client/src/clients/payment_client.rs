//! # Payment Client
//!
//! Typed API over the Payment Poller actor.
use crate::model::OrderId;
use crate::payment_actor::{PaymentError, PaymentPoller, PollCommand, PollSnapshot, PollState};
use async_trait::async_trait;
use shamba_actor::{ActorClient, FrameworkError, MachineClient};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct PaymentClient {
    inner: MachineClient<PaymentPoller>,
}

impl PaymentClient {
    pub fn new(inner: MachineClient<PaymentPoller>) -> Self {
        Self { inner }
    }

    /// Starts polling `order_id`, replacing any poll already running.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn start(&self, order_id: OrderId) -> Result<PollState, PaymentError> {
        debug!("Sending request");
        self.inner
            .send(PollCommand::Start(order_id))
            .await
            .map_err(Self::map_error)
    }

    /// Stops the active poll. A finished poll keeps its outcome.
    #[instrument(skip(self))]
    pub async fn cancel(&self) -> Result<PollState, PaymentError> {
        debug!("Sending request");
        self.inner
            .send(PollCommand::Cancel)
            .await
            .map_err(Self::map_error)
    }

    /// Waits for the current poll to confirm, fail or time out.
    pub async fn wait_for_outcome(&self) -> Result<PollSnapshot, PaymentError> {
        self.inner
            .wait_for(|snapshot| snapshot.state.is_terminal())
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<PaymentPoller> for PaymentClient {
    type Error = PaymentError;

    fn inner(&self) -> &MachineClient<PaymentPoller> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::MachineError(source) => match source.downcast::<PaymentError>() {
                Ok(error) => *error,
                Err(source) => PaymentError::ActorCommunicationError(source.to_string()),
            },
            other => PaymentError::ActorCommunicationError(other.to_string()),
        }
    }
}
