//! Timing and outcome knobs for simulated runs

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;

/// Controls how long simulated runs wait in each state and how often they fail
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Time a run stays `queued`, in milliseconds
    pub queue_delay_ms: RangeInclusive<u64>,
    /// Time a run stays `in_progress`, in milliseconds
    pub processing_delay_ms: RangeInclusive<u64>,
    /// Probability in `[0, 1]` that a run ends `failed`
    pub failure_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            queue_delay_ms: 500..=1500,
            processing_delay_ms: 2000..=4000,
            failure_rate: 0.1,
        }
    }
}

/// One draw of the simulation dice for a single run
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimulatedTimeline {
    pub queue_delay: Duration,
    pub processing_delay: Duration,
    pub fails: bool,
}

impl SimulationConfig {
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate;
        self
    }

    pub fn with_delays(
        mut self,
        queue_delay_ms: RangeInclusive<u64>,
        processing_delay_ms: RangeInclusive<u64>,
    ) -> Self {
        self.queue_delay_ms = queue_delay_ms;
        self.processing_delay_ms = processing_delay_ms;
        self
    }

    pub(crate) fn sample(&self) -> SimulatedTimeline {
        let mut rng = rand::thread_rng();
        SimulatedTimeline {
            queue_delay: Duration::from_millis(sample_range(&mut rng, &self.queue_delay_ms)),
            processing_delay: Duration::from_millis(sample_range(
                &mut rng,
                &self.processing_delay_ms,
            )),
            fails: rng.gen_bool(self.effective_failure_rate()),
        }
    }

    /// `failure_rate` clamped to `[0, 1]`; NaN counts as never failing
    fn effective_failure_rate(&self) -> f64 {
        if self.failure_rate.is_nan() {
            0.0
        } else {
            self.failure_rate.clamp(0.0, 1.0)
        }
    }
}

fn sample_range(rng: &mut impl Rng, range: &RangeInclusive<u64>) -> u64 {
    if range.is_empty() {
        return *range.start();
    }
    rng.gen_range(range.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_stays_in_range() {
        let config = SimulationConfig::default();
        for _ in 0..50 {
            let timeline = config.sample();
            assert!(timeline.queue_delay >= Duration::from_millis(500));
            assert!(timeline.queue_delay <= Duration::from_millis(1500));
            assert!(timeline.processing_delay >= Duration::from_millis(2000));
            assert!(timeline.processing_delay <= Duration::from_millis(4000));
        }
    }

    #[test]
    fn test_failure_rate_extremes() {
        let never = SimulationConfig::default().with_failure_rate(0.0);
        let always = SimulationConfig::default().with_failure_rate(1.0);
        for _ in 0..20 {
            assert!(!never.sample().fails);
            assert!(always.sample().fails);
        }
    }

    #[test]
    fn test_out_of_bounds_failure_rate_is_clamped() {
        let config = SimulationConfig::default().with_failure_rate(7.5);
        assert!(config.sample().fails);
    }

    #[test]
    fn test_nan_failure_rate_never_fails() {
        let config = SimulationConfig::default().with_failure_rate(f64::NAN);
        for _ in 0..20 {
            assert!(!config.sample().fails);
        }
    }

    #[test]
    fn test_zero_delays() {
        let config = SimulationConfig::default().with_delays(0..=0, 0..=0);
        let timeline = config.sample();
        assert_eq!(timeline.queue_delay, Duration::ZERO);
        assert_eq!(timeline.processing_delay, Duration::ZERO);
    }
}
