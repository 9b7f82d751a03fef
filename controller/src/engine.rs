//! The control loop.
//!
//! Each tick:
//!   1. Samples usage, then pressure (fatal if either read fails).
//!   2. Gates on `min_size` (parking in `Phase::Idle`) and on the
//!      pressure threshold.
//!   3. Estimates a proposal, dampens it against the counter deltas,
//!      and clamps/aligns it with the policy.
//!   4. Issues at most one reclaim request (failures are not fatal).
//!
//! Between ticks the loop sleeps for `interval`. A stop request is honoured
//! at the top of the next tick; it cuts the sleep short but never an
//! in-flight read or reclaim.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use cgroup::{CounterSnapshot, ReclaimSink, StatSource};
use common::logger::{TraceId, child_span, root_span};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, error, info, instrument, warn};

use crate::config::ControllerConfig;
use crate::damper;
use crate::error::ControllerError;
use crate::estimator::estimate;
use crate::metrics::Counters;
use crate::policy::finalize;
use crate::state::{ControllerState, Phase};
use crate::types::{Decision, TickOutcome};

pub struct ControlLoop<S: StatSource, R: ReclaimSink> {
    /// Human readable name of the managed domain (its cgroup path).
    domain: String,
    cfg: ControllerConfig,
    source: Arc<S>,
    sink: Arc<R>,
    state: ControllerState,

    /// Observability counters (does not affect behavior).
    counters: Counters,
}

impl<S: StatSource, R: ReclaimSink> ControlLoop<S, R> {
    pub fn new(
        domain: impl Into<String>,
        cfg: ControllerConfig,
        source: Arc<S>,
        sink: Arc<R>,
    ) -> Self {
        Self {
            domain: domain.into(),
            cfg,
            source,
            sink,
            state: ControllerState::new(),
            counters: Counters::default(),
        }
    }

    /// Share externally owned counters instead of private ones.
    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.counters = counters;
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.cfg
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Tick until `stop` is cancelled or a read fails.
    ///
    /// Returns `Ok(())` after a requested stop and the fatal error otherwise.
    /// The state ends in [`Phase::Stopped`] either way. An invalid
    /// configuration is rejected before the first tick.
    pub async fn run(&mut self, stop: &CancellationToken) -> Result<(), ControllerError> {
        let trace_id = TraceId::default();
        let span = root_span("control_loop", &trace_id, &self.domain);

        async {
            if let Err(e) = self.cfg.validate() {
                return Err(self.fatal(e.into()));
            }

            info!(interval_s = self.cfg.interval.as_secs(), "control loop started");

            let result = loop {
                if stop.is_cancelled() {
                    info!("stop requested, leaving control loop");
                    break Ok(());
                }

                if let Err(e) = self.tick().await {
                    break Err(e);
                }

                tokio::select! {
                    _ = stop.cancelled() => {}
                    _ = tokio::time::sleep(self.cfg.interval) => {}
                }
            };

            self.state.enter(Phase::Stopped);
            Span::current().record("ticks", self.state.ticks());
            result
        }
        .instrument(span)
        .await
    }

    /// Run exactly one sample -> decide -> execute pass.
    #[instrument(skip(self), target = "controller", fields(tick = self.state.ticks() + 1))]
    pub async fn tick(&mut self) -> Result<TickOutcome, ControllerError> {
        self.state.begin_tick();
        self.counters.ticks.fetch_add(1, Ordering::Relaxed);

        let usage = match self.source.current_usage().await {
            Ok(v) => v,
            Err(source) => {
                return Err(self.fatal(ControllerError::ReadFailure {
                    what: "memory usage",
                    source,
                }));
            }
        };

        if usage < self.cfg.min_size {
            self.counters.below_min_size.fetch_add(1, Ordering::Relaxed);
            debug!(usage, min_size = self.cfg.min_size, "usage below min_size, idle");
            self.state.enter(Phase::Idle);
            return Ok(TickOutcome::BelowMinSize { usage });
        }

        let psi_some = match self.source.pressure_some().await {
            Ok(v) => v,
            Err(source) => {
                return Err(self.fatal(ControllerError::ReadFailure {
                    what: "memory pressure",
                    source,
                }));
            }
        };

        if psi_some >= self.cfg.psi_threshold {
            // Keep the baseline fresh so the next decision measures one interval.
            if let Some(curr) = self.observe_counters().await {
                self.state.advance(curr);
            }
            self.counters.saturated.fetch_add(1, Ordering::Relaxed);
            debug!(
                usage_kb = usage >> 10,
                psi_some,
                psi_threshold = self.cfg.psi_threshold,
                "pressure at or above threshold, no reclaim"
            );
            self.state.enter(Phase::Sleeping);
            return Ok(TickOutcome::Saturated { usage, psi_some });
        }

        self.state.enter(Phase::Deciding);
        let decision = self.decide(usage, psi_some).await;

        if decision.request == 0 {
            self.counters.suppressed.fetch_add(1, Ordering::Relaxed);
            self.state.enter(Phase::Sleeping);
            return Ok(TickOutcome::Suppressed(decision));
        }

        self.state.enter(Phase::Executing);
        let outcome = match self.sink.request_reclaim(decision.request).await {
            Ok(()) => {
                self.counters.reclaim_requests.fetch_add(1, Ordering::Relaxed);
                self.counters
                    .reclaimed_bytes
                    .fetch_add(decision.request, Ordering::Relaxed);
                debug!(
                    reclaim_kb = decision.request >> 10,
                    psi_some,
                    usage_kb = usage >> 10,
                    "reclaim requested"
                );
                TickOutcome::Reclaimed(decision)
            }
            Err(source) => {
                let err = ControllerError::ReclaimFailure {
                    bytes: decision.request,
                    source,
                };
                self.counters.reclaim_requests.fetch_add(1, Ordering::Relaxed);
                self.counters.reclaim_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "reclaim request failed, continuing");
                TickOutcome::ReclaimFailed(decision)
            }
        };

        self.state.enter(Phase::Sleeping);
        Ok(outcome)
    }

    /// Estimator -> damper -> policy. The only IO is the counter read.
    async fn decide(&mut self, usage: u64, psi_some: f64) -> Decision {
        let proposal = estimate(
            usage,
            psi_some,
            self.cfg.psi_threshold,
            self.cfg.reclaim_ratio,
        );

        let (prev, curr) = match self.observe_counters().await {
            Some(curr) => (self.state.advance(curr), curr),
            None => {
                let prev = *self.state.previous();
                (prev, prev)
            }
        };

        let _guard = child_span("decide").entered();

        let dampening = damper::evaluate(
            proposal,
            &prev,
            &curr,
            self.cfg.reclaim_accuracy_target,
            self.cfg.scan_efficiency_target,
        );
        let request = finalize(
            dampening.size,
            self.cfg.iterate_min_size,
            self.cfg.iterate_max_size,
        );

        debug!(
            usage,
            psi_some,
            proposal,
            dampened = dampening.size,
            request,
            scan_delta = dampening.delta.scan,
            steal_delta = dampening.delta.steal,
            refault_delta = dampening.delta.refault,
            signal = ?dampening.signal,
            "reclaim decision"
        );

        Decision {
            usage,
            psi_some,
            proposal,
            dampening,
            request,
        }
    }

    /// Counter snapshot, or `None` after logging when it cannot be read.
    async fn observe_counters(&mut self) -> Option<CounterSnapshot> {
        match self.source.counter_snapshot().await {
            Ok(snap) => {
                debug!(
                    pgscan = snap.pgscan,
                    pgsteal = snap.pgsteal,
                    refault_anon = snap.refault_anon,
                    refault_file = snap.refault_file,
                    pswpin = snap.pswpin,
                    pswpout = snap.pswpout,
                    "counters sampled"
                );
                Some(snap)
            }
            Err(e) => {
                self.counters
                    .counter_read_failures
                    .fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "counter snapshot unavailable, assuming no reclaim activity");
                None
            }
        }
    }

    fn fatal(&mut self, err: ControllerError) -> ControllerError {
        error!(error = %err, "fatal error, stopping");
        self.state.enter(Phase::Stopped);
        err
    }
}
