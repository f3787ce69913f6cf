use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

const ONE_MINUTE_NANOS: u64 = 60_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSettings {
    /// Interval used until a quota has been observed.
    pub default_interval: Duration,
    /// Lower bound for any calibrated interval.
    pub floor: Duration,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            default_interval: Duration::from_millis(2400),
            floor: Duration::from_millis(20),
        }
    }
}

/// Result of one calibration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calibration {
    Applied(Duration),
    Retained(Duration),
}

impl Calibration {
    pub fn interval(&self) -> Duration {
        match self {
            Calibration::Applied(d) | Calibration::Retained(d) => *d,
        }
    }
}

/// Process-wide request pacing.
///
/// `acquire` waits until the minimum interval has passed since the last
/// permitted request. Waiters queue on a fair mutex, so permits are handed
/// out in arrival order. The timestamp is only recorded once the wait
/// completes: dropping a pending `acquire` consumes nothing.
#[derive(Debug)]
pub struct RateController {
    interval_nanos: AtomicU64,
    floor: Duration,
    last_permit: Mutex<Option<Instant>>,
    permits: AtomicU64,
}

impl RateController {
    pub fn new(settings: RateSettings) -> Self {
        let floor = settings.floor.max(Duration::from_millis(1));
        let initial = settings.default_interval.max(floor);
        Self {
            interval_nanos: AtomicU64::new(duration_nanos(initial)),
            floor,
            last_permit: Mutex::new(None),
            permits: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_nanos(self.interval_nanos.load(Ordering::SeqCst))
    }

    pub fn floor(&self) -> Duration {
        self.floor
    }

    /// Number of permits handed out so far.
    pub fn permits_granted(&self) -> u64 {
        self.permits.load(Ordering::SeqCst)
    }

    /// Computed interval for a per-minute quota, or `None` if the quota is unusable.
    pub fn interval_for_quota(&self, quota_per_minute: u32) -> Option<Duration> {
        if quota_per_minute == 0 {
            return None;
        }
        let nanos = ONE_MINUTE_NANOS / u64::from(quota_per_minute);
        Some(Duration::from_nanos(nanos).max(self.floor))
    }

    /// Recomputes the interval as `60s / quota`, clamped to the floor.
    ///
    /// A missing or zero quota leaves the current interval in place. Waits
    /// already in progress keep the interval they started with.
    pub fn calibrate(&self, quota_per_minute: Option<u32>) -> Calibration {
        match quota_per_minute.and_then(|q| self.interval_for_quota(q)) {
            Some(interval) => {
                let previous = self
                    .interval_nanos
                    .swap(duration_nanos(interval), Ordering::SeqCst);
                if previous != duration_nanos(interval) {
                    tracing::info!(
                        quota = quota_per_minute.unwrap_or_default(),
                        interval_ms = interval.as_millis() as u64,
                        "Request interval calibrated"
                    );
                }
                Calibration::Applied(interval)
            }
            None => {
                let current = self.interval();
                tracing::warn!(
                    quota = ?quota_per_minute,
                    interval_ms = current.as_millis() as u64,
                    "No usable request quota reported, keeping current interval"
                );
                Calibration::Retained(current)
            }
        }
    }

    /// Suspends until the caller may issue its request.
    pub async fn acquire(&self) {
        // Read before queueing: a calibration finishing later applies to later callers.
        let interval = self.interval();
        let mut last = self.last_permit.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + interval;
            if ready_at > Instant::now() {
                sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
        self.permits.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for RateController {
    fn default() -> Self {
        Self::new(RateSettings::default())
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
