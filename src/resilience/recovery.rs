//! Recovery timer scheduling for a circuit breaker.
//!
//! # Responsibilities
//! - Own one breaker and its pending timer behind one mutex
//! - Schedule `on_timeout()` after the recovery period whenever the breaker opens
//! - Cancel pending timers on re-arm, reset and drop
//!
//! # Design Decisions
//! - Timer is a spawned tokio task; its handle lives next to the breaker,
//!   so evaluating and arming happen in one critical section
//! - Each timer remembers the open generation it was armed for and does
//!   nothing if the breaker has moved on
//! - Locks are never held across an await point

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::resilience::circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitState, Evaluation};

#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
struct Inner {
    breaker: CircuitBreaker,
    timer: Option<PendingTimer>,
}

impl Inner {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }
}

#[derive(Debug)]
pub struct BreakerDriver {
    inner: Arc<Mutex<Inner>>,
}

impl BreakerDriver {
    pub fn new(breaker: CircuitBreaker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { breaker, timer: None })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("circuit breaker mutex poisoned")
    }

    pub fn evaluate(&self, upstream_healthy: bool) -> Evaluation {
        let mut inner = self.lock();
        let evaluation = inner.breaker.evaluate(upstream_healthy);
        if evaluation.arm_timer {
            let recovery = inner.breaker.recovery();
            self.arm(&mut inner, evaluation.generation, recovery);
        }
        evaluation
    }

    /// Restart the breaker in Closed and drop any pending timer.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.cancel_timer();
        inner.breaker.reset();
    }

    pub fn state(&self) -> CircuitState {
        self.lock().breaker.state()
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        self.lock().breaker.snapshot()
    }

    /// True while a recovery timer is scheduled and has not fired.
    pub fn timer_pending(&self) -> bool {
        self.lock()
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.handle.is_finished())
    }

    /// Must be called with the lock held, in the same section that produced `generation`.
    fn arm(&self, inner: &mut Inner, generation: u64, recovery: Duration) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("No async runtime; recovery timer not scheduled");
            return;
        };

        let shared = Arc::clone(&self.inner);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(recovery).await;
            let mut inner = shared.lock().expect("circuit breaker mutex poisoned");
            if inner.breaker.generation() != generation {
                tracing::debug!(generation, "Stale recovery timer ignored");
                return;
            }
            inner.breaker.on_timeout();
        });

        inner.cancel_timer();
        inner.timer = Some(PendingTimer { generation, handle });
        tracing::debug!(generation, recovery_ms = recovery.as_millis() as u64, "Recovery timer armed");
    }
}

impl Drop for BreakerDriver {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.cancel_timer();
        }
    }
}
