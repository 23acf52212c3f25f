use crate::api::{ApiError, MarketApi};
use crate::config::PollerConfig;
use crate::model::{Order, OrderId, PaymentStatus};
use crate::payment_actor::{
    PaymentError, PollCommand, PollEvent, PollSnapshot, PollState, FAILED_ADVISORY,
    TIMEOUT_ADVISORY,
};
use async_trait::async_trait;
use shamba_actor::timer;
use shamba_actor::{Generation, Outbox, StateMachine, TaskHandle};
use std::sync::Arc;
use tracing::{debug, info, warn};

struct StatusCheck {
    attempt: u32,
    task: TaskHandle,
}

pub struct PaymentPoller {
    config: PollerConfig,
    order_id: Option<OrderId>,
    state: PollState,
    attempts: u32,
    advisory: Option<String>,
    refreshed_order: Option<Order>,
    generation: Generation,
    ticker: Option<TaskHandle>,
    check: Option<StatusCheck>,
    refresh: Option<TaskHandle>,
}

impl PaymentPoller {
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            order_id: None,
            state: PollState::Idle,
            attempts: 0,
            advisory: None,
            refreshed_order: None,
            generation: Generation::default(),
            ticker: None,
            check: None,
            refresh: None,
        }
    }

    /// Cancels the interval, any outstanding check and any scheduled refresh.
    fn stop_all(&mut self) -> bool {
        let had_work = self.ticker.is_some() || self.check.is_some() || self.refresh.is_some();
        self.ticker = None;
        self.check = None;
        self.refresh = None;
        had_work
    }

    fn finish(&mut self, state: PollState, advisory: Option<&str>) {
        self.ticker = None;
        self.check = None;
        self.state = state;
        self.advisory = advisory.map(str::to_string);
    }

    fn on_tick(
        &mut self,
        generation: Generation,
        api: &Arc<dyn MarketApi>,
        outbox: &Outbox<PollEvent>,
    ) {
        if self.state != PollState::Polling {
            return;
        }
        let Some(order_id) = self.order_id.clone() else {
            return;
        };

        if self.attempts >= self.config.max_attempts {
            warn!(%order_id, attempts = self.attempts, "Payment verification timed out");
            self.finish(PollState::TimedOut, Some(TIMEOUT_ADVISORY));
            return;
        }

        self.attempts += 1;
        let attempt = self.attempts;

        if self.check.as_ref().is_some_and(|check| !check.task.is_finished()) {
            debug!(%order_id, attempt, "Previous status check still outstanding, skipping");
            return;
        }

        debug!(
            %order_id,
            attempt,
            max_attempts = self.config.max_attempts,
            "Checking payment status"
        );
        let api = api.clone();
        let outbox = outbox.clone();
        let task = TaskHandle::spawn(async move {
            let result = api.payment_status(&order_id).await;
            outbox.post(PollEvent::StatusChecked {
                generation,
                attempt,
                result,
            });
        });
        self.check = Some(StatusCheck { attempt, task });
    }

    fn on_status(
        &mut self,
        generation: Generation,
        attempt: u32,
        result: Result<PaymentStatus, ApiError>,
        outbox: &Outbox<PollEvent>,
    ) {
        if self.check.as_ref().is_some_and(|check| check.attempt == attempt) {
            self.check = None;
        }
        if self.state != PollState::Polling {
            return;
        }
        let order_id = self.order_id.as_ref().map(OrderId::to_string).unwrap_or_default();

        match result {
            Ok(PaymentStatus::Paid) => {
                info!(%order_id, attempt, "Payment confirmed");
                self.finish(PollState::Confirmed, None);
                self.refresh = Some(timer::after(
                    self.config.refresh_delay,
                    outbox.clone(),
                    PollEvent::RefreshDue(generation),
                ));
            }
            Ok(PaymentStatus::Failed) => {
                warn!(%order_id, attempt, "Payment failed");
                self.finish(PollState::Failed, Some(FAILED_ADVISORY));
            }
            Ok(status) => {
                debug!(%order_id, attempt, %status, "Payment still pending");
            }
            Err(e) => {
                warn!(%order_id, attempt, error = %e, "Error checking payment status");
            }
        }
    }

    fn on_refresh_due(
        &mut self,
        generation: Generation,
        api: &Arc<dyn MarketApi>,
        outbox: &Outbox<PollEvent>,
    ) {
        let api = api.clone();
        let outbox = outbox.clone();
        self.refresh = Some(TaskHandle::spawn(async move {
            let result = api.my_orders().await;
            outbox.post(PollEvent::Refreshed { generation, result });
        }));
    }
}

#[async_trait]
impl StateMachine for PaymentPoller {
    type Command = PollCommand;
    type Reply = PollState;
    type Event = PollEvent;
    type Snapshot = PollSnapshot;
    type Context = Arc<dyn MarketApi>;
    type Error = PaymentError;

    async fn on_command(
        &mut self,
        command: PollCommand,
        _api: &Arc<dyn MarketApi>,
        outbox: &Outbox<PollEvent>,
    ) -> Result<PollState, PaymentError> {
        match command {
            PollCommand::Start(order_id) => {
                if order_id.as_str().trim().is_empty() {
                    return Err(PaymentError::MissingOrderId);
                }
                if self.stop_all() {
                    info!(previous = ?self.order_id, "Cancelling previous payment poll");
                }

                let generation = self.generation.advance();
                self.order_id = Some(order_id.clone());
                self.state = PollState::Polling;
                self.attempts = 0;
                self.advisory = None;
                self.refreshed_order = None;
                self.ticker = Some(timer::every(
                    self.config.interval,
                    outbox.clone(),
                    move || PollEvent::Tick(generation),
                ));

                info!(
                    %order_id,
                    %generation,
                    interval_ms = self.config.interval.as_millis() as u64,
                    "Payment polling started"
                );
                Ok(self.state)
            }
            PollCommand::Cancel => {
                let had_work = self.stop_all();
                self.generation.advance();
                if self.state == PollState::Polling {
                    self.state = PollState::Idle;
                }
                info!(order_id = ?self.order_id, had_work, "Payment poll cancelled");
                Ok(self.state)
            }
        }
    }

    async fn on_event(
        &mut self,
        event: PollEvent,
        api: &Arc<dyn MarketApi>,
        outbox: &Outbox<PollEvent>,
    ) {
        let generation = match &event {
            PollEvent::Tick(generation) | PollEvent::RefreshDue(generation) => *generation,
            PollEvent::StatusChecked { generation, .. } | PollEvent::Refreshed { generation, .. } => {
                *generation
            }
        };
        if !self.generation.is_current(generation) {
            debug!(%generation, "Discarding stale poll event");
            return;
        }

        match event {
            PollEvent::Tick(generation) => self.on_tick(generation, api, outbox),
            PollEvent::StatusChecked {
                generation,
                attempt,
                result,
            } => self.on_status(generation, attempt, result, outbox),
            PollEvent::RefreshDue(generation) => self.on_refresh_due(generation, api, outbox),
            PollEvent::Refreshed { result, .. } => {
                self.refresh = None;
                match result {
                    Ok(orders) => {
                        self.refreshed_order = orders
                            .into_iter()
                            .find(|order| Some(&order.id) == self.order_id.as_ref());
                        info!(
                            order_id = ?self.order_id,
                            status = ?self.refreshed_order.as_ref().map(|order| order.status.to_string()),
                            "Order list refreshed"
                        );
                    }
                    Err(e) => warn!(error = %e, "Order refresh failed"),
                }
            }
        }
    }

    fn snapshot(&self) -> PollSnapshot {
        PollSnapshot {
            order_id: self.order_id.clone(),
            state: self.state,
            attempts: self.attempts,
            advisory: self.advisory.clone(),
            refresh_pending: self.refresh.is_some(),
            refreshed_order: self.refreshed_order.clone(),
        }
    }

    async fn on_stop(&mut self, _api: &Arc<dyn MarketApi>) {
        self.stop_all();
    }
}
