use crate::config::{Config, PollingConfig, WidgetConfig};
use crate::domain::time::{compute_remaining, Clock, SystemClock};
use crate::domain::{RemainingTime, Target};
use crate::logging::{log_mode_change, log_render_failure, log_start, log_stop, log_tick};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// At least one target expires within the urgent window
    Urgent,
    Relaxed,
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub mode: PollMode,
    pub next_interval: Duration,
    /// Targets whose text was replaced, in input order
    pub rendered: Vec<(String, RemainingTime)>,
    pub failed: Vec<String>,
}

/// Rewrites every target's text on each tick and decides how long to wait
/// before the next one.
///
/// The target list is fixed at construction. Urgency is recomputed from
/// scratch every tick: one urgent target speeds up polling for all of them,
/// and polling relaxes again as soon as no target is urgent.
pub struct CountdownMonitor<T> {
    targets: Vec<T>,
    widget: WidgetConfig,
    polling: PollingConfig,
    clock: Arc<dyn Clock>,
    // only used to log mode switches
    last_mode: Option<PollMode>,
}

impl<T: Target> CountdownMonitor<T> {
    pub fn new(targets: Vec<T>, config: &Config) -> Self {
        Self {
            targets,
            widget: config.widget.clone(),
            polling: config.polling.clone(),
            clock: Arc::new(SystemClock),
            last_mode: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    pub fn tick(&mut self) -> TickReport {
        let mut urgent = false;
        let mut rendered = Vec::with_capacity(self.targets.len());
        let mut failed = Vec::new();

        for target in self.targets.iter_mut() {
            let time = compute_remaining(target.expiration(), &self.widget, self.clock.as_ref());

            if time.is_urgent(self.polling.urgent_window_secs) {
                urgent = true;
            }

            match target.render(&time.human_readable) {
                Ok(()) => rendered.push((target.id().to_string(), time)),
                Err(e) => {
                    log_render_failure(&e);
                    failed.push(target.id().to_string());
                }
            }
        }

        let (mode, next_interval) = if urgent {
            (
                PollMode::Urgent,
                Duration::from_millis(self.polling.urgent_interval_ms),
            )
        } else {
            (
                PollMode::Relaxed,
                Duration::from_millis(self.polling.relaxed_interval_ms),
            )
        };

        if self.last_mode != Some(mode) {
            log_mode_change(mode, next_interval);
            self.last_mode = Some(mode);
        }

        let expired = rendered.iter().filter(|(_, t)| t.is_expired()).count();
        log_tick(rendered.len(), expired, next_interval);

        TickReport {
            mode,
            next_interval,
            rendered,
            failed,
        }
    }
}

impl<T: Target + Send + 'static> CountdownMonitor<T> {
    /// Spawn the polling loop on the current tokio runtime.
    ///
    /// `on_tick` sees every report right after the targets were updated. The
    /// loop runs until the returned handle is stopped, aborted or dropped.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start<F>(mut self, mut on_tick: F) -> MonitorHandle<T>
    where
        F: FnMut(&TickReport) + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            log_start(self.targets.len());

            loop {
                let report = self.tick();
                on_tick(&report);

                tokio::select! {
                    _ = sleep(report.next_interval) => {}
                    // also fires when the handle is dropped
                    _ = stop_rx.changed() => break,
                }
            }

            log_stop();
            self.targets
        });

        MonitorHandle { stop_tx, task }
    }
}

pub struct MonitorHandle<T> {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<Vec<T>>,
}

impl<T> MonitorHandle<T> {
    /// Stop after the current tick and hand the targets back.
    pub async fn stop(self) -> Result<Vec<T>> {
        // the loop may already be gone if it was aborted
        let _ = self.stop_tx.send(true);
        self.task
            .await
            .map_err(|e| anyhow!("Countdown monitor task failed: {}", e))
    }

    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Label, TargetError};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    const NOW: i64 = 1_700_000_000;

    struct SharedClock(AtomicI64);

    impl SharedClock {
        fn new(seconds: i64) -> Arc<Self> {
            Arc::new(Self(AtomicI64::new(seconds * 1000)))
        }

        fn advance_secs(&self, seconds: i64) {
            self.0.fetch_add(seconds * 1000, Ordering::SeqCst);
        }
    }

    impl Clock for SharedClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Follows tokio's clock so paused-time tests see time move.
    struct TokioClock {
        base_ms: i64,
        start: tokio::time::Instant,
    }

    impl Clock for TokioClock {
        fn now_millis(&self) -> i64 {
            self.base_ms + self.start.elapsed().as_millis() as i64
        }
    }

    struct BrokenTarget;

    impl Target for BrokenTarget {
        fn id(&self) -> &str {
            "broken"
        }

        fn expiration(&self) -> Option<i64> {
            Some(NOW + 30)
        }

        fn render(&mut self, _text: &str) -> Result<(), TargetError> {
            Err(TargetError::RenderFailed {
                id: "broken".to_string(),
                reason: "detached".to_string(),
            })
        }
    }

    fn monitor(labels: &[Label], clock: Arc<dyn Clock>) -> CountdownMonitor<Label> {
        CountdownMonitor::new(labels.to_vec(), &Config::default()).with_clock(clock)
    }

    #[test]
    fn test_one_urgent_target_speeds_up_all() {
        let labels = [
            Label::new("soon", Some(NOW + 30)),
            Label::new("later", Some(NOW + 600)),
        ];
        let mut monitor = monitor(&labels, SharedClock::new(NOW));

        let report = monitor.tick();
        assert_eq!(report.mode, PollMode::Urgent);
        assert_eq!(report.next_interval, Duration::from_millis(1000));
        assert_eq!(labels[0].text(), "In 30 seconds");
        assert_eq!(labels[1].text(), "In 10 minutes");
    }

    #[test]
    fn test_relaxed_when_nothing_within_a_minute() {
        let labels = [
            Label::new("expired", Some(NOW - 5)),
            Label::new("later", Some(NOW + 600)),
            Label::new("garbage", None),
        ];
        let mut monitor = monitor(&labels, SharedClock::new(NOW));

        let report = monitor.tick();
        assert_eq!(report.mode, PollMode::Relaxed);
        assert_eq!(report.next_interval, Duration::from_millis(5000));
        assert_eq!(labels[0].text(), "This has expired");
        assert_eq!(labels[2].text(), "This has expired");
        assert_eq!(report.rendered.len(), 3);
    }

    #[test]
    fn test_urgency_is_reevaluated_every_tick() {
        let clock = SharedClock::new(NOW);
        let labels = [Label::new("soon", Some(NOW + 61))];
        let mut monitor = monitor(&labels, clock.clone());

        assert_eq!(monitor.tick().mode, PollMode::Relaxed);

        clock.advance_secs(5);
        assert_eq!(monitor.tick().mode, PollMode::Urgent);

        clock.advance_secs(60);
        let report = monitor.tick();
        assert_eq!(report.mode, PollMode::Relaxed);
        assert_eq!(labels[0].text(), "This has expired");
    }

    #[test]
    fn test_render_failure_does_not_stop_the_tick() {
        let config = Config::default();
        let mut monitor = CountdownMonitor::new(vec![BrokenTarget], &config)
            .with_clock(SharedClock::new(NOW));

        let report = monitor.tick();
        assert!(report.rendered.is_empty());
        assert_eq!(report.failed, vec!["broken".to_string()]);
        // still counts toward urgency
        assert_eq!(report.mode, PollMode::Urgent);
    }

    #[test]
    fn test_custom_intervals() {
        let mut config = Config::default();
        config.polling.relaxed_interval_ms = 250;
        config.polling.urgent_interval_ms = 50;
        let labels = vec![Label::new("later", Some(NOW + 600))];

        let mut monitor = CountdownMonitor::new(labels, &config).with_clock(SharedClock::new(NOW));
        assert_eq!(monitor.tick().next_interval, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_reschedules_with_computed_interval() {
        let clock = Arc::new(TokioClock {
            base_ms: NOW * 1000,
            start: tokio::time::Instant::now(),
        });
        let label = Label::new("soon", Some(NOW + 66));
        let intervals = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let intervals = intervals.clone();
            CountdownMonitor::new(vec![label.clone()], &Config::default())
                .with_clock(clock)
                .start(move |report| {
                    intervals.lock().unwrap().push(report.next_interval.as_millis());
                })
        };

        // ticks at 0s (66 left), 5s (60 or 61 left), 10s (under a minute)
        sleep(Duration::from_millis(10_500)).await;

        let targets = handle.stop().await.unwrap();
        let intervals = intervals.lock().unwrap().clone();
        assert_eq!(&intervals[..3], &[5000, 5000, 1000]);
        assert_eq!(targets.len(), 1);
        assert!(label.text().ends_with("seconds"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_loop() {
        let label = Label::new("later", Some(NOW + 600));
        let ticks = Arc::new(Mutex::new(0usize));

        let handle = {
            let ticks = ticks.clone();
            CountdownMonitor::new(vec![label.clone()], &Config::default())
                .with_clock(SharedClock::new(NOW))
                .start(move |_| *ticks.lock().unwrap() += 1)
        };

        sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());

        handle.stop().await.unwrap();
        let seen = *ticks.lock().unwrap();
        assert_eq!(seen, 1);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(*ticks.lock().unwrap(), seen);
        assert_eq!(label.text(), "In 10 minutes");
    }

    #[test]
    #[should_panic]
    fn test_start_outside_runtime_panics() {
        let _handle = CountdownMonitor::new(vec![Label::new("x", None)], &Config::default())
            .start(|_| {});
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_loop_reports_error_on_stop() {
        let handle = CountdownMonitor::new(vec![Label::new("x", None)], &Config::default())
            .start(|_| {});

        handle.abort();
        sleep(Duration::from_millis(1)).await;
        assert!(handle.is_finished());
        assert!(handle.stop().await.is_err());
    }
}
