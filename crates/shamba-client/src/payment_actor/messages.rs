use crate::api::ApiError;
use crate::model::{Order, OrderId, PaymentStatus};
use shamba_actor::Generation;

#[derive(Debug)]
pub enum PollCommand {
    Start(OrderId),
    Cancel,
}

#[derive(Debug)]
pub enum PollEvent {
    Tick(Generation),
    StatusChecked {
        generation: Generation,
        attempt: u32,
        result: Result<PaymentStatus, ApiError>,
    },
    RefreshDue(Generation),
    Refreshed {
        generation: Generation,
        result: Result<Vec<Order>, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Polling,
    Confirmed,
    Failed,
    TimedOut,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Confirmed | PollState::Failed | PollState::TimedOut
        )
    }
}

/// Published poller state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PollSnapshot {
    pub order_id: Option<OrderId>,
    pub state: PollState,
    /// Status checks attempted in the current poll.
    pub attempts: u32,
    /// User-facing text for a failed or timed-out poll.
    pub advisory: Option<String>,
    /// A post-confirmation refresh is scheduled or running.
    pub refresh_pending: bool,
    /// The order as reloaded after confirmation.
    pub refreshed_order: Option<Order>,
}
