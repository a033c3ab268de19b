//! Measurement scheduling
//!
//! Drives the engine on a fixed cadence and on explicit manual
//! requests, appends each result to the history, and broadcasts
//! completion outcomes to subscribers. The cadence is anchored to the
//! end of the previous periodic run, so the period drifts by the run
//! duration (accepted).

use crate::error::MonitorError;
use crate::history::HistoryStore;
use crate::measurement::{MeasurementRecord, ServiceCategory};
use crate::probe::MeasurementEngine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

/// What initiated a measurement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Periodic,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Periodic => write!(f, "periodic"),
            Trigger::Manual => write!(f, "manual"),
        }
    }
}

/// Externally visible scheduler state.
///
/// A manual and a periodic run may be in flight at the same time; the
/// reported state then collapses to ManualRunning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunState {
    Idle,
    PeriodicRunning,
    ManualRunning,
}

/// Outcome broadcast to completion subscribers.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    Completed {
        trigger: Trigger,
        record: Arc<MeasurementRecord>,
    },
    Failed {
        trigger: Trigger,
        error: String,
    },
}

#[derive(Default)]
struct InFlight {
    periodic: bool,
    manual: bool,
}

pub struct Scheduler {
    engine: MeasurementEngine,
    history: Arc<HistoryStore>,
    catalogue: Vec<ServiceCategory>,
    interval: Duration,
    in_flight: Mutex<InFlight>,
    next_deadline: Mutex<Option<DateTime<Utc>>>,
    events: broadcast::Sender<SchedulerEvent>,
}

impl Scheduler {
    pub fn new(
        engine: MeasurementEngine,
        history: Arc<HistoryStore>,
        catalogue: Vec<ServiceCategory>,
        interval: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            engine,
            history,
            catalogue,
            interval,
            in_flight: Mutex::new(InFlight::default()),
            next_deadline: Mutex::new(None),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> RunState {
        let flight = self.in_flight.lock().await;
        if flight.manual {
            RunState::ManualRunning
        } else if flight.periodic {
            RunState::PeriodicRunning
        } else {
            RunState::Idle
        }
    }

    /// Time of the next scheduled periodic run; None before the first
    /// periodic completion.
    pub async fn next_deadline(&self) -> Option<DateTime<Utc>> {
        *self.next_deadline.lock().await
    }

    /// Runs one measurement, appends the record on success, and
    /// broadcasts the outcome.
    ///
    /// A manual request while a manual run is in flight is rejected; a
    /// periodic tick while a periodic run is in flight is rejected the
    /// same way (the drive loop logs it as a skipped tick). Rejection
    /// leaves the history and the deadline untouched. A failed run
    /// still consumes its periodic slot, so the deadline advances on
    /// any periodic outcome.
    pub async fn request_measurement(
        &self,
        trigger: Trigger,
    ) -> Result<Arc<MeasurementRecord>, MonitorError> {
        self.begin(trigger).await?;
        info!("starting {} measurement", trigger);

        let outcome = match self.engine.run_full_measurement(&self.catalogue).await {
            Ok(record) => {
                let record = self.history.append(record).await;
                let _ = self.events.send(SchedulerEvent::Completed {
                    trigger,
                    record: record.clone(),
                });
                Ok(record)
            }
            Err(e) => {
                let _ = self.events.send(SchedulerEvent::Failed {
                    trigger,
                    error: e.to_string(),
                });
                Err(e)
            }
        };

        self.finish(trigger).await;
        outcome
    }

    /// Drive loop: one immediate run, then one per interval, each
    /// anchored to the end of the previous one.
    pub async fn run(self: Arc<Self>) {
        loop {
            if let Err(MonitorError::MeasurementInProgress) =
                self.request_measurement(Trigger::Periodic).await
            {
                warn!("periodic run still in flight, skipping this tick");
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    async fn begin(&self, trigger: Trigger) -> Result<(), MonitorError> {
        let mut flight = self.in_flight.lock().await;
        let slot = match trigger {
            Trigger::Periodic => &mut flight.periodic,
            Trigger::Manual => &mut flight.manual,
        };
        if *slot {
            return Err(MonitorError::MeasurementInProgress);
        }
        *slot = true;
        Ok(())
    }

    async fn finish(&self, trigger: Trigger) {
        {
            let mut flight = self.in_flight.lock().await;
            match trigger {
                Trigger::Periodic => flight.periodic = false,
                Trigger::Manual => flight.manual = false,
            }
        }
        if trigger == Trigger::Periodic {
            *self.next_deadline.lock().await = Some(Utc::now() + self.interval);
        }
    }
}
