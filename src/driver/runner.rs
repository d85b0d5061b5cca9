//! Step execution engine.
//!
//! [`StepsRun`] advances a [`Driver`] a fixed number of times and publishes
//! every resulting [`Proxy`] to the subscribers of the job before asking
//! for the next step:
//!
//! step → publish to all subscribers → next step → …
//!
//! Wall-clock limits and cancellation are checked only between steps; a
//! step in progress is never interrupted.

use super::types::{Driver, Proxy};
use crate::error::Result;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a job stopped requesting steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// All requested steps were published.
    Completed,
    /// The driver ran out of work before the requested count.
    Exhausted,
    /// The wall-clock limit elapsed between two steps.
    TimeLimit,
    /// The cancellation flag was raised between two steps.
    Cancelled,
}

/// Everything a job published, in generation order.
#[derive(Debug, Clone)]
pub struct RunOutcome<G> {
    pub proxies: Vec<Proxy<G>>,
    pub stop_reason: StopReason,
}

impl<G> RunOutcome<G> {
    /// Number of published proxies.
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Whether the driver exhausted before the requested step count.
    pub fn exhausted(&self) -> bool {
        self.stop_reason == StopReason::Exhausted
    }

    /// The last published proxy, if any.
    pub fn last(&self) -> Option<&Proxy<G>> {
        self.proxies.last()
    }
}

/// Runs drivers for a fixed number of steps.
///
/// # Usage
///
/// ```ignore
/// let mut seen = Vec::new();
/// let outcome = StepsRun::new(3)
///     .create_job(&mut driver)
///     .subscribe(|proxy| seen.push(proxy.budget()))
///     .run()?;
/// assert_eq!(outcome.len(), seen.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StepsRun {
    steps: usize,
    time_limit: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl StepsRun {
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            time_limit: None,
            cancel: None,
        }
    }

    /// Stops requesting steps once `limit` has elapsed since the job started.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Stops requesting steps once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Binds this run to a driver. Nothing happens until [`Job::run`].
    pub fn create_job<'a, D: Driver>(&self, driver: &'a mut D) -> Job<'a, D> {
        Job {
            driver,
            steps: self.steps,
            time_limit: self.time_limit,
            cancel: self.cancel.clone(),
            subscribers: Vec::new(),
        }
    }

    /// Shorthand for a job without subscribers.
    pub fn run<D: Driver>(&self, driver: &mut D) -> Result<RunOutcome<D::Genome>> {
        self.create_job(driver).run()
    }
}

type Subscriber<'a, G> = Box<dyn FnMut(&Proxy<G>) + 'a>;

/// One execution of a [`StepsRun`] over a borrowed driver.
pub struct Job<'a, D: Driver> {
    driver: &'a mut D,
    steps: usize,
    time_limit: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
    subscribers: Vec<Subscriber<'a, D::Genome>>,
}

impl<'a, D: Driver> Job<'a, D> {
    /// Registers a callback invoked synchronously with every proxy, in
    /// registration order.
    pub fn subscribe<F>(mut self, subscriber: F) -> Self
    where
        F: FnMut(&Proxy<D::Genome>) + 'a,
    {
        self.subscribers.push(Box::new(subscriber));
        self
    }

    /// Executes the job.
    ///
    /// Errors from the driver abort the job; proxies published before the
    /// error have already reached the subscribers.
    pub fn run(mut self) -> Result<RunOutcome<D::Genome>> {
        let started = Instant::now();
        let mut proxies = Vec::new();
        let mut stop_reason = StopReason::Completed;

        for _ in 0..self.steps {
            if let Some(ref flag) = self.cancel {
                if flag.load(Ordering::Relaxed) {
                    stop_reason = StopReason::Cancelled;
                    break;
                }
            }
            if let Some(limit) = self.time_limit {
                if started.elapsed() >= limit {
                    stop_reason = StopReason::TimeLimit;
                    break;
                }
            }
            if self.driver.is_exhausted() {
                stop_reason = StopReason::Exhausted;
                break;
            }

            let proxy = self.driver.step()?;
            debug!("step {} published at budget {}", proxy.step(), proxy.budget());
            for subscriber in self.subscribers.iter_mut() {
                subscriber(&proxy);
            }
            proxies.push(proxy);
        }

        Ok(RunOutcome {
            proxies,
            stop_reason,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::driver::types::{Candidate, Population, Replacement};
    use crate::error::BenchError;
    use crate::metrics::MetricSet;

    /// Deterministic driver: each step adds `increment` to the budget; runs
    /// out after `capacity` steps. Records immigrant deliveries by step.
    #[derive(Debug)]
    pub(crate) struct CountingDriver {
        pub increment: u64,
        pub capacity: usize,
        pub steps_done: usize,
        pub budget: u64,
        pub population: Population<u32>,
        pub received: Vec<(usize, usize)>,
        pub metrics: Arc<MetricSet>,
    }

    impl CountingDriver {
        pub(crate) fn new(increment: u64, capacity: usize) -> Self {
            Self::with_population(increment, capacity, vec![Candidate::new(0, vec![1.0, 1.0])])
        }

        pub(crate) fn with_population(
            increment: u64,
            capacity: usize,
            population: Vec<Candidate<u32>>,
        ) -> Self {
            Self {
                increment,
                capacity,
                steps_done: 0,
                budget: 0,
                population: Arc::new(population),
                received: Vec::new(),
                metrics: Arc::new(MetricSet::new()),
            }
        }
    }

    impl Driver for CountingDriver {
        type Genome = u32;

        fn step(&mut self) -> Result<Proxy<u32>> {
            if self.is_exhausted() {
                return Err(BenchError::InvalidState("counting driver exhausted".into()));
            }
            self.steps_done += 1;
            self.budget += self.increment;
            Ok(Proxy::new(
                self.steps_done,
                self.budget,
                self.population.clone(),
                self.metrics.clone(),
            ))
        }

        fn is_exhausted(&self) -> bool {
            self.steps_done >= self.capacity
        }

        fn budget(&self) -> u64 {
            self.budget
        }

        fn population(&self) -> Population<u32> {
            self.population.clone()
        }

        fn receive_immigrants(
            &mut self,
            immigrants: Vec<Candidate<u32>>,
            _replacement: Replacement,
        ) {
            self.received.push((self.steps_done, immigrants.len()));
            let mut pop = self.population.to_vec();
            let keep = pop.len().saturating_sub(immigrants.len());
            pop.truncate(keep);
            pop.extend(immigrants);
            self.population = Arc::new(pop);
        }
    }

    #[test]
    fn test_zero_steps_publishes_nothing() {
        let mut driver = CountingDriver::new(10, 5);
        let mut seen = 0;
        let outcome = StepsRun::new(0)
            .create_job(&mut driver)
            .subscribe(|_| seen += 1)
            .run()
            .unwrap();
        assert!(outcome.is_empty());
        assert_eq!(outcome.stop_reason, StopReason::Completed);
        assert_eq!(seen, 0);
        assert_eq!(driver.steps_done, 0);
    }

    #[test]
    fn test_exact_step_count() {
        for steps in [1usize, 3] {
            let mut driver = CountingDriver::new(10, 5);
            let mut results = Vec::new();
            let outcome = StepsRun::new(steps)
                .create_job(&mut driver)
                .subscribe(|p| results.push(p.budget()))
                .run()
                .unwrap();
            assert_eq!(results.len(), steps);
            assert_eq!(outcome.len(), steps);
            assert!(!outcome.exhausted());
        }
    }

    #[test]
    fn test_short_sequence_on_exhaustion() {
        let mut driver = CountingDriver::new(5, 2);
        let outcome = StepsRun::new(4).run(&mut driver).unwrap();
        assert_eq!(outcome.len(), 2);
        assert!(outcome.exhausted());
        assert_eq!(outcome.last().unwrap().budget(), 10);
    }

    #[test]
    fn test_unbounded_request_stops_at_exhaustion() {
        let mut driver = CountingDriver::new(10, 3);
        let outcome = StepsRun::new(usize::MAX).run(&mut driver).unwrap();
        assert_eq!(outcome.len(), 3);
        assert_eq!(outcome.stop_reason, StopReason::Exhausted);
        assert_eq!(outcome.last().unwrap().budget(), 30);
    }

    #[test]
    fn test_capacity_equal_to_request_is_not_exhaustion() {
        let mut driver = CountingDriver::new(5, 3);
        let outcome = StepsRun::new(3).run(&mut driver).unwrap();
        assert_eq!(outcome.len(), 3);
        assert_eq!(outcome.stop_reason, StopReason::Completed);
    }

    #[test]
    fn test_publish_before_next_step() {
        let mut driver = CountingDriver::new(1, 10);
        let order = std::cell::RefCell::new(Vec::new());
        StepsRun::new(3)
            .create_job(&mut driver)
            .subscribe(|p| order.borrow_mut().push(("a", p.step())))
            .subscribe(|p| order.borrow_mut().push(("b", p.step())))
            .run()
            .unwrap();
        assert_eq!(
            order.into_inner(),
            vec![("a", 1), ("b", 1), ("a", 2), ("b", 2), ("a", 3), ("b", 3)]
        );
    }

    #[test]
    fn test_stepping_exhausted_driver_is_invalid() {
        let mut driver = CountingDriver::new(1, 1);
        driver.step().unwrap();
        assert!(matches!(driver.step(), Err(BenchError::InvalidState(_))));
    }

    #[test]
    fn test_cancelled_before_first_step() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut driver = CountingDriver::new(1, 10);
        let outcome = StepsRun::new(5).with_cancel(flag).run(&mut driver).unwrap();
        assert!(outcome.is_empty());
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
    }

    #[test]
    fn test_zero_time_limit_stops_between_steps() {
        let mut driver = CountingDriver::new(1, 10);
        let outcome = StepsRun::new(5)
            .with_time_limit(Duration::ZERO)
            .run(&mut driver)
            .unwrap();
        assert!(outcome.is_empty());
        assert_eq!(outcome.stop_reason, StopReason::TimeLimit);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn published_count_matches_exhaustion(
                requested in 0usize..20,
                capacity in 0usize..20,
                increment in 0u64..50,
            ) {
                let mut driver = CountingDriver::new(increment, capacity);
                let outcome = StepsRun::new(requested).run(&mut driver).unwrap();
                prop_assert!(outcome.len() <= requested);
                prop_assert_eq!(outcome.len() < requested, outcome.exhausted());
                for w in outcome.proxies.windows(2) {
                    prop_assert!(w[0].budget() <= w[1].budget());
                    prop_assert_eq!(w[0].step() + 1, w[1].step());
                }
            }
        }
    }
}
