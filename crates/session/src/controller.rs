//! Per-employee session view.
//!
//! The controller owns the last reconciled [`WorkSession`] and publishes it on
//! a watch channel. A [`SessionTicker`] recomputes progress from that view on
//! a fixed period; it never touches the network, so it neither waits on nor
//! holds up an in-flight intent.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use workday_core::{EmployeeId, SessionProgress, Time, WorkSession};

use crate::error::{IntentError, Result};
use crate::gateway::{IntentOutcome, SessionGateway, StartDayRequest};
use crate::notice::Notice;

/// Session view for one employee.
pub struct SessionController {
    gateway: Arc<SessionGateway>,
    employee: EmployeeId,
    view: watch::Sender<WorkSession>,
}

impl SessionController {
    /// Create a controller. The view is `NotStarted` until the first refresh.
    pub fn new(gateway: Arc<SessionGateway>, employee: EmployeeId) -> Self {
        let (view, _) = watch::channel(WorkSession::NotStarted);
        Self {
            gateway,
            employee,
            view,
        }
    }

    /// Employee this controller tracks.
    pub fn employee(&self) -> &EmployeeId {
        &self.employee
    }

    /// Last known session.
    pub fn session(&self) -> WorkSession {
        self.view.borrow().clone()
    }

    /// Watch the session view.
    pub fn subscribe(&self) -> watch::Receiver<WorkSession> {
        self.view.subscribe()
    }

    /// Progress of the last known session at `now`.
    pub fn progress(&self, now: Time) -> SessionProgress {
        self.view.borrow().progress(now)
    }

    /// Re-read the session from upstream and publish it.
    pub async fn refresh(&self) -> WorkSession {
        let session = self.gateway.reconcile(&self.employee).await;
        debug!("Session view for {}: {}", self.employee, session.status());
        self.view.send_replace(session.clone());
        session
    }

    /// Start the day.
    pub async fn start(&self, request: &StartDayRequest) -> Notice {
        let result = self.gateway.start(&self.employee, request).await;
        self.settle(result).await
    }

    /// Pause the day.
    pub async fn pause(&self) -> Notice {
        let result = self.gateway.pause(&self.employee).await;
        self.settle(result).await
    }

    /// Resume the day.
    pub async fn resume(&self) -> Notice {
        let result = self.gateway.resume(&self.employee).await;
        self.settle(result).await
    }

    /// End the day.
    pub async fn end(&self) -> Notice {
        let result = self.gateway.end(&self.employee).await;
        self.settle(result).await
    }

    /// Publish an intent's result and turn it into a notice.
    ///
    /// Failed intents leave the view as upstream sees it: anything that got
    /// past validation and the in-flight check triggers a refresh.
    async fn settle(&self, result: Result<IntentOutcome>) -> Notice {
        match result {
            Ok(outcome) => {
                self.view.send_replace(outcome.session);
                outcome.notice
            }
            Err(err) => {
                warn!("Intent failed for {}: {}", self.employee, err);
                if !matches!(err, IntentError::Validation(_) | IntentError::InFlight { .. }) {
                    self.refresh().await;
                }
                err.notice()
            }
        }
    }

    /// Recompute progress every `period` until the ticker or this controller
    /// is dropped. A zero period is treated as one millisecond.
    pub fn spawn_ticker(&self, period: Duration) -> SessionTicker {
        let mut session = self.view.subscribe();
        let (progress_tx, progress) = watch::channel(session.borrow().progress(Utc::now()));
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    changed = session.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                let current = session.borrow_and_update().progress(Utc::now());
                if progress_tx.send(current).is_err() {
                    break;
                }
            }
        });

        SessionTicker {
            handle: Some(handle),
            progress,
        }
    }
}

/// Background progress tick. Stops when dropped.
pub struct SessionTicker {
    handle: Option<JoinHandle<()>>,
    progress: watch::Receiver<SessionProgress>,
}

impl SessionTicker {
    /// Latest computed progress.
    pub fn progress(&self) -> SessionProgress {
        *self.progress.borrow()
    }

    /// Watch progress updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionProgress> {
        self.progress.clone()
    }

    /// Stop the tick and wait for the task to wind down.
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for SessionTicker {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}
