use std::time::Duration;

pub const FETCH_TIMEOUT_ENV: &str = "REPORTGRID_FETCH_TIMEOUT_MS";
pub const SEQUENTIAL_FETCH_ENV: &str = "REPORTGRID_SEQUENTIAL_FETCH";

/// How the per-kind fetch tasks of one aggregation are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchExecution {
    /// One blocking task per fetcher in a task group, joined before the union.
    #[default]
    Concurrent,
    /// Fetchers run one after another on a single blocking task.
    Sequential,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationConfig {
    pub execution: FetchExecution,
    /// Upper bound for all fetches of one aggregation (default: none).
    ///
    /// Only applies to the async entry points.
    pub fetch_timeout: Option<Duration>,
}

impl AggregationConfig {
    /// Defaults overridden by `REPORTGRID_FETCH_TIMEOUT_MS` and `REPORTGRID_SEQUENTIAL_FETCH`.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(ms) = lookup(FETCH_TIMEOUT_ENV)
            .and_then(|v| v.replace('_', "").trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0)
        {
            config.fetch_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(flag) = lookup(SEQUENTIAL_FETCH_ENV) {
            if matches!(flag.trim(), "1" | "true" | "yes") {
                config.execution = FetchExecution::Sequential;
            }
        }
        config
    }

    pub fn with_execution(mut self, execution: FetchExecution) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }
}
