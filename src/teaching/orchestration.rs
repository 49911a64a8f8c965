//! Food-delivery order orchestration.
//!
//! One client request fans out to three backend services in sequence:
//! ```text
//! Idle → Auth → Restaurant → Payment → Complete
//! ```

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPhase {
    Idle,
    Auth,
    Restaurant,
    Payment,
    Complete,
}

impl OrderPhase {
    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<OrderPhase> {
        match self {
            OrderPhase::Idle => Some(OrderPhase::Auth),
            OrderPhase::Auth => Some(OrderPhase::Restaurant),
            OrderPhase::Restaurant => Some(OrderPhase::Payment),
            OrderPhase::Payment => Some(OrderPhase::Complete),
            OrderPhase::Complete => None,
        }
    }

    /// Backend service the gateway is talking to during this phase.
    pub fn service(self) -> Option<&'static str> {
        match self {
            OrderPhase::Auth => Some("auth-service"),
            OrderPhase::Restaurant => Some("restaurant-service"),
            OrderPhase::Payment => Some("payment-service"),
            OrderPhase::Idle | OrderPhase::Complete => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseEvent {
    pub phase: OrderPhase,
    pub service: Option<&'static str>,
    pub elapsed_ms: u64,
}

/// Walk an order from Idle to Complete, pausing `step_delay` between phases.
///
/// `on_phase` sees every phase as it is entered. The full trace is returned.
pub async fn run<F>(step_delay: Duration, mut on_phase: F) -> Vec<PhaseEvent>
where
    F: FnMut(&PhaseEvent),
{
    let start = Instant::now();
    let mut trace = Vec::with_capacity(4);
    let mut phase = OrderPhase::Idle;

    while let Some(next) = phase.next() {
        if phase != OrderPhase::Idle {
            tokio::time::sleep(step_delay).await;
        }
        phase = next;

        let event = PhaseEvent {
            phase,
            service: phase.service(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        tracing::debug!(phase = ?event.phase, elapsed_ms = event.elapsed_ms, "Order phase");
        on_phase(&event);
        trace.push(event);
    }

    trace
}
