use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Max samples kept in the rate window, older ones are dropped first
const MAX_SAMPLES: usize = 256;

/// Throughput estimation over a sliding time window
///
/// Samples are `(time, amount)` pairs. [`rate`](Self::rate) only considers
/// samples within `interval` of the time it is read at, while
/// [`mean_rate`](Self::mean_rate) is cumulative since [`start`](Self::start).
/// Both go down while no progress is made.
///
/// The meter never reads the clock itself. All times are passed in by the
/// caller, which keeps the computation deterministic.
#[derive(Debug, Clone)]
pub struct RateMeter {
    /// Width of the live window
    interval: Duration,
    /// Anchor of the measurement, set by `start`
    started: Option<Instant>,
    /// Samples in the live window, oldest first
    samples: VecDeque<(Instant, u64)>,
    /// Time of the newest sample dropped because of the capacity cap.
    /// The window cannot reach further back than this
    floor: Option<Instant>,
    /// Sum of all amounts since start
    total_amount: u64,
    /// Time of the latest sample
    latest: Option<Instant>,
}

impl RateMeter {
    /// Create a meter with the sampling window. A zero interval is bumped to 1ms
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            started: None,
            samples: VecDeque::new(),
            floor: None,
            total_amount: 0,
            latest: None,
        }
    }

    /// The live window width
    #[inline(always)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the live window width. Samples are re-pruned on the next `sample`
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(Duration::from_millis(1));
    }

    /// Reset the meter and anchor it at `at`
    pub fn start(&mut self, at: Instant) {
        self.clear();
        self.started = Some(at);
    }

    /// Record `amount` units of progress made at `at`
    ///
    /// A meter that was never started is anchored at its first sample.
    pub fn sample(&mut self, at: Instant, amount: u64) {
        let started = *self.started.get_or_insert(at);
        // clock readings from different threads can arrive slightly out of order
        let at = at.max(started).max(self.latest.unwrap_or(started));
        self.latest = Some(at);
        self.total_amount = self.total_amount.saturating_add(amount);
        self.samples.push_back((at, amount));
        self.prune(at);
    }

    fn prune(&mut self, now: Instant) {
        let cutoff = now.checked_sub(self.interval);
        while let Some(&(time, _)) = self.samples.front() {
            let expired = cutoff.is_some_and(|cutoff| time <= cutoff);
            if !expired && self.samples.len() <= MAX_SAMPLES {
                break;
            }
            if !expired {
                self.floor = Some(time);
            }
            self.samples.pop_front();
        }
    }

    /// The start anchor and the reading time, never before the latest sample
    fn span(&self, at: Instant) -> Option<(Instant, Instant)> {
        let started = self.started?;
        Some((started, at.max(self.latest.unwrap_or(started)).max(started)))
    }

    /// Throughput in units per second over the live window ending at `at`
    ///
    /// The window spans `interval` back from `at`, but not further than the
    /// start of the measurement. Returns 0 if no sample falls in the window
    /// or the window has no duration.
    pub fn rate(&self, at: Instant) -> f64 {
        let Some((started, end)) = self.span(at) else {
            return 0f64;
        };
        let cutoff = end.checked_sub(self.interval);
        let amount = self
            .samples
            .iter()
            .filter(|(time, _)| cutoff.is_none_or(|cutoff| *time > cutoff))
            .fold(0u64, |sum, (_, amount)| sum.saturating_add(*amount));
        if amount == 0 {
            return 0f64;
        }
        let mut window_start = cutoff.unwrap_or(started).max(started);
        if let Some(floor) = self.floor {
            window_start = window_start.max(floor);
        }
        let elapsed = end.duration_since(window_start).as_secs_f64();
        if elapsed <= 0f64 {
            return 0f64;
        }
        amount as f64 / elapsed
    }

    /// Throughput in units per second from start to `at`
    pub fn mean_rate(&self, at: Instant) -> f64 {
        let Some((started, end)) = self.span(at) else {
            return 0f64;
        };
        let elapsed = end.duration_since(started).as_secs_f64();
        if elapsed <= 0f64 {
            return 0f64;
        }
        self.total_amount as f64 / elapsed
    }

    /// Sum of every sample since start
    #[inline(always)]
    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    /// Drop all samples and the anchor
    pub fn clear(&mut self) {
        self.started = None;
        self.samples.clear();
        self.floor = None;
        self.total_amount = 0;
        self.latest = None;
    }
}

impl Default for RateMeter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(x: u64) -> Duration {
        Duration::from_millis(x)
    }

    #[test]
    fn zero_before_any_sample() {
        let now = Instant::now();
        let mut meter = RateMeter::default();
        assert_eq!(meter.rate(now), 0f64);
        assert_eq!(meter.mean_rate(now), 0f64);
        meter.start(now);
        assert_eq!(meter.rate(now + ms(500)), 0f64);
        assert_eq!(meter.mean_rate(now + ms(500)), 0f64);
    }

    #[test]
    fn zero_elapsed_is_zero() {
        let now = Instant::now();
        let mut meter = RateMeter::default();
        meter.start(now);
        meter.sample(now, 100);
        assert_eq!(meter.rate(now), 0f64);
        assert_eq!(meter.mean_rate(now), 0f64);
    }

    #[test]
    fn steady_rate() {
        let t0 = Instant::now();
        let mut meter = RateMeter::new(Duration::from_secs(1));
        meter.start(t0);
        for i in 1..=20 {
            meter.sample(t0 + ms(100 * i), 1);
        }
        let at = t0 + ms(2000);
        assert!((meter.rate(at) - 10f64).abs() < 1e-6, "{}", meter.rate(at));
        assert!((meter.mean_rate(at) - 10f64).abs() < 1e-6);
    }

    #[test]
    fn window_forgets_burst_but_mean_does_not() {
        let t0 = Instant::now();
        let mut meter = RateMeter::new(Duration::from_secs(1));
        meter.start(t0);
        meter.sample(t0 + ms(500), 1000);
        // slow phase, one unit every 500ms for 5s
        for i in 1..=10 {
            meter.sample(t0 + ms(500 + 500 * i), 1);
        }
        let at = t0 + ms(5500);
        // window is the last 1s: 2 units
        assert!((meter.rate(at) - 2f64).abs() < 1e-6, "{}", meter.rate(at));
        // 1010 units over 5.5s
        assert!((meter.mean_rate(at) - 1010f64 / 5.5).abs() < 1e-6);
    }

    #[test]
    fn capacity_is_bounded() {
        let t0 = Instant::now();
        let mut meter = RateMeter::new(Duration::from_secs(60));
        meter.start(t0);
        for i in 1..=1000u64 {
            meter.sample(t0 + ms(i), 1);
        }
        assert!(meter.samples.len() <= MAX_SAMPLES);
        assert_eq!(meter.total_amount(), 1000);
        assert!(meter.rate(t0 + ms(1000)) > 0f64);
    }

    #[test]
    fn stall_drains_window() {
        let t0 = Instant::now();
        let mut meter = RateMeter::new(ms(200));
        meter.start(t0);
        meter.sample(t0 + ms(100), 100);
        assert!((meter.rate(t0 + ms(100)) - 1000f64).abs() < 1e-6);
        // nothing happened for 1.5s
        let at = t0 + ms(1600);
        assert_eq!(meter.rate(at), 0f64);
        assert!((meter.mean_rate(at) - 62.5).abs() < 1e-6);
        // reading before the latest sample reads at the sample
        assert!((meter.mean_rate(t0) - 1000f64).abs() < 1e-6);
    }

    #[test]
    fn clear_resets() {
        let t0 = Instant::now();
        let mut meter = RateMeter::default();
        meter.start(t0);
        meter.sample(t0 + ms(200), 50);
        assert!(meter.rate(t0 + ms(200)) > 0f64);
        meter.clear();
        meter.clear();
        assert_eq!(meter.rate(t0 + ms(200)), 0f64);
        assert_eq!(meter.mean_rate(t0 + ms(200)), 0f64);
        assert_eq!(meter.total_amount(), 0);
    }
}
