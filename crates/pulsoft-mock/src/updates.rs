//! Periodic update simulator.
//!
//! A subscription is a tokio task that ticks at a fixed interval, draws a
//! fresh reading from the generator, and hands it to the caller's callback.
//! The returned `UpdateSubscription` owns the task: cancelling it or dropping
//! it stops delivery.
//!
//! Cancellation waits on the delivery lock, so once `cancel()` returns no
//! callback is running and none will start. A callback may cancel or drop its
//! own subscription; that call returns without waiting and the reading being
//! delivered is the last one.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use pulsoft_contracts::{metrics::MetricReading, subscription::SubscriptionId};

use crate::generator::MockDataGenerator;

/// Interval between simulated readings when none is configured.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

thread_local! {
    /// The subscription whose callback is running on this thread.
    static DELIVERING: Cell<Option<SubscriptionId>> = Cell::new(None);
}

/// Marks `id` as delivering on the current thread until dropped.
struct Delivering {
    previous: Option<SubscriptionId>,
}

impl Delivering {
    fn enter(id: SubscriptionId) -> Self {
        let previous = DELIVERING.with(|d| d.replace(Some(id)));
        Self { previous }
    }

    fn is_current(id: SubscriptionId) -> bool {
        DELIVERING.with(|d| d.get() == Some(id))
    }
}

impl Drop for Delivering {
    fn drop(&mut self) {
        DELIVERING.with(|d| d.set(self.previous));
    }
}

/// Handle to one running periodic-update task.
#[must_use = "dropping the subscription stops the updates immediately"]
pub struct UpdateSubscription {
    id: SubscriptionId,
    patient_id: String,
    cancelled: Arc<AtomicBool>,
    /// Held while a callback runs.
    delivery: Arc<Mutex<()>>,
    task: Option<JoinHandle<()>>,
}

impl UpdateSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// True until the subscription is cancelled or its task ends.
    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst) && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop delivering readings.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        self.cancelled.store(true, Ordering::SeqCst);
        if !Delivering::is_current(self.id) {
            drop(self.delivery.lock().unwrap_or_else(|e| e.into_inner()));
        }
        task.abort();
        info!(
            subscription_id = %self.id,
            patient_id = %self.patient_id,
            "periodic updates stopped"
        );
    }
}

impl Drop for UpdateSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for UpdateSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateSubscription")
            .field("id", &self.id)
            .field("patient_id", &self.patient_id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl MockDataGenerator {
    /// Deliver a fresh reading for `patient_id` every five seconds.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_periodic_updates<F>(
        self: &Arc<Self>,
        patient_id: &str,
        callback: F,
    ) -> UpdateSubscription
    where
        F: FnMut(MetricReading) + Send + 'static,
    {
        self.start_periodic_updates_every(patient_id, DEFAULT_UPDATE_INTERVAL, callback)
    }

    /// Deliver a fresh reading for `patient_id` every `period`.
    ///
    /// The first reading arrives one full `period` after the call. Late ticks
    /// are delayed rather than bursted. A zero `period` is raised to one
    /// millisecond.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_periodic_updates_every<F>(
        self: &Arc<Self>,
        patient_id: &str,
        period: Duration,
        mut callback: F,
    ) -> UpdateSubscription
    where
        F: FnMut(MetricReading) + Send + 'static,
    {
        let id = SubscriptionId::new();
        let period = period.max(Duration::from_millis(1));
        let cancelled = Arc::new(AtomicBool::new(false));
        let delivery = Arc::new(Mutex::new(()));

        let generator = Arc::clone(self);
        let flag = Arc::clone(&cancelled);
        let lock = Arc::clone(&delivery);
        let task_patient = patient_id.to_string();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u64 = 0;

            loop {
                ticker.tick().await;
                ticks += 1;

                let reading = generator.current_metrics(&task_patient);
                let _delivery = lock.lock().unwrap_or_else(|e| e.into_inner());
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                debug!(
                    subscription_id = %id,
                    patient_id = %task_patient,
                    tick = ticks,
                    status = ?reading.status,
                    "delivering periodic reading"
                );
                let _delivering = Delivering::enter(id);
                callback(reading);
            }
        });

        info!(
            subscription_id = %id,
            patient_id = %patient_id,
            period_ms = period.as_millis() as u64,
            "periodic updates started"
        );

        UpdateSubscription {
            id,
            patient_id: patient_id.to_string(),
            cancelled,
            delivery,
            task: Some(task),
        }
    }
}
