//! Scoped stage instrumentation.
//!
//! A [`TraceScope`] brackets a unit of work: creating it reports the start of
//! the stage, [`TraceScope::update`] reports interim progress and dropping it
//! reports the end, including when the stage returns an error or unwinds.
//! Notifications go to a [`StageObserver`] injected through the [`Tracer`],
//! so the pipeline never reaches for a global logger directly.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{info, warn};

/// Key/value parameter attached to a stage notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageParam {
    key: &'static str,
    value: String,
}

impl StageParam {
    /// Returns the parameter name.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the rendered parameter value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for StageParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Builds a [`StageParam`] from any displayable value.
///
/// # Examples
/// ```
/// use graphprep_core::param;
///
/// let vertices = param("vertices", 128);
/// assert_eq!(vertices.to_string(), "vertices=128");
/// ```
#[must_use]
pub fn param(key: &'static str, value: impl fmt::Display) -> StageParam {
    StageParam {
        key,
        value: value.to_string(),
    }
}

/// How a traced stage ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
    /// The stage returned normally.
    Completed,
    /// The stage returned an error.
    Failed,
    /// The scope was dropped while the thread was panicking.
    Aborted,
}

impl StageOutcome {
    /// Returns the lowercase name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives stage lifecycle notifications.
pub trait StageObserver: Send + Sync {
    /// Called when a scope opens.
    fn on_start(&self, stage: &str, params: &[StageParam]);

    /// Called for every [`TraceScope::update`].
    ///
    /// `since_start` is measured from the scope opening and `since_last` from
    /// the previous update (or the opening, for the first update).
    fn on_update(
        &self,
        stage: &str,
        params: &[StageParam],
        since_start: Duration,
        since_last: Duration,
    );

    /// Called exactly once when a scope closes.
    fn on_end(&self, stage: &str, outcome: StageOutcome, total: Duration);
}

/// Observer that forwards stage notifications to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn on_start(&self, stage: &str, params: &[StageParam]) {
        info!(stage, params = %DisplayParams(params), "stage started");
    }

    fn on_update(
        &self,
        stage: &str,
        params: &[StageParam],
        since_start: Duration,
        since_last: Duration,
    ) {
        info!(
            stage,
            params = %DisplayParams(params),
            delta_ms = millis(since_last),
            total_ms = millis(since_start),
            "stage progress"
        );
    }

    fn on_end(&self, stage: &str, outcome: StageOutcome, total: Duration) {
        match outcome {
            StageOutcome::Completed => info!(
                stage,
                outcome = outcome.as_str(),
                duration_ms = millis(total),
                "stage finished"
            ),
            StageOutcome::Failed | StageOutcome::Aborted => warn!(
                stage,
                outcome = outcome.as_str(),
                duration_ms = millis(total),
                "stage finished"
            ),
        }
    }
}

struct DisplayParams<'a>(&'a [StageParam]);

impl fmt::Display for DisplayParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Hands out [`TraceScope`]s bound to a shared observer.
///
/// # Examples
/// ```
/// use graphprep_core::{Tracer, param};
///
/// let tracer = Tracer::default();
/// let total: Result<usize, std::convert::Infallible> =
///     tracer.trace("sum", &[param("items", 3)], |scope| {
///         scope.update(&[param("partial", 1)]);
///         Ok(1 + 2 + 3)
///     });
/// assert_eq!(total, Ok(6));
/// ```
#[derive(Clone)]
pub struct Tracer {
    observer: Arc<dyn StageObserver>,
}

impl Tracer {
    /// Creates a tracer that notifies `observer`.
    #[must_use]
    pub fn new(observer: Arc<dyn StageObserver>) -> Self {
        Self { observer }
    }

    /// Opens a scope for `stage`, notifying the observer immediately.
    #[must_use = "dropping the scope ends the stage immediately"]
    pub fn scope(&self, stage: impl Into<String>, params: &[StageParam]) -> TraceScope<'_> {
        let stage = stage.into();
        self.observer.on_start(&stage, params);
        let now = Instant::now();
        TraceScope {
            observer: self.observer.as_ref(),
            stage,
            started: now,
            last_update: now,
            outcome: None,
        }
    }

    /// Runs `body` inside a scope and records its outcome.
    ///
    /// # Errors
    /// Returns whatever `body` returns; the scope is marked
    /// [`StageOutcome::Failed`] in that case.
    pub fn trace<T, E, F>(
        &self,
        stage: impl Into<String>,
        params: &[StageParam],
        body: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut TraceScope<'_>) -> Result<T, E>,
    {
        let mut scope = self.scope(stage, params);
        let result = body(&mut scope);
        scope.outcome = Some(if result.is_ok() {
            StageOutcome::Completed
        } else {
            StageOutcome::Failed
        });
        result
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new(Arc::new(TracingObserver))
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Live instrumentation scope for one stage.
///
/// The end notification is sent from `Drop`. A scope that is neither
/// [`completed`](Self::complete) nor [`failed`](Self::fail) reports
/// [`StageOutcome::Completed`], or [`StageOutcome::Aborted`] when dropped
/// during a panic.
pub struct TraceScope<'a> {
    observer: &'a dyn StageObserver,
    stage: String,
    started: Instant,
    last_update: Instant,
    outcome: Option<StageOutcome>,
}

impl TraceScope<'_> {
    /// Returns the stage description.
    #[must_use]
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Returns the time elapsed since the scope opened.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Reports progress with elapsed-since-start and elapsed-since-last-update.
    pub fn update(&mut self, params: &[StageParam]) {
        let now = Instant::now();
        let since_start = now.saturating_duration_since(self.started);
        let since_last = now.saturating_duration_since(self.last_update);
        self.last_update = now;
        self.observer
            .on_update(&self.stage, params, since_start, since_last);
    }

    /// Ends the scope as [`StageOutcome::Completed`].
    pub fn complete(mut self) {
        self.outcome = Some(StageOutcome::Completed);
    }

    /// Ends the scope as [`StageOutcome::Failed`].
    pub fn fail(mut self) {
        self.outcome = Some(StageOutcome::Failed);
    }
}

impl Drop for TraceScope<'_> {
    fn drop(&mut self) {
        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None if std::thread::panicking() => StageOutcome::Aborted,
            None => StageOutcome::Completed,
        };
        self.observer
            .on_end(&self.stage, outcome, self.started.elapsed());
    }
}

impl fmt::Debug for TraceScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceScope")
            .field("stage", &self.stage)
            .field("started", &self.started)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}
