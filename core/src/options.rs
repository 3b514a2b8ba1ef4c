//! Optional-parameter bags for operations that take them.
//!
//! Every field toggles one query parameter or body field. Unset fields are
//! never sent; empty strings, empty lists and a zero parallelism count as
//! unset because the server has no use for them.

use serde::{Deserialize, Serialize};

/// Options for running an uploaded jar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOpts {
    /// Savepoint to restore the job from.
    pub savepoint_path: Option<String>,
    /// Whether state that cannot be mapped back to the job may be skipped.
    /// Only sent together with `savepoint_path`.
    pub allow_non_restored_state: bool,
    pub program_args: Vec<String>,
    /// Fully qualified entry point class, overriding the jar manifest.
    pub entry_class: Option<String>,
    pub parallelism: Option<u32>,
}

impl RunOpts {
    /// Query parameters in the order the server documents them.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(path) = non_empty(&self.savepoint_path) {
            query.push(("savepointPath".to_string(), path.to_string()));
            query.push((
                "allowNonRestoredState".to_string(),
                self.allow_non_restored_state.to_string(),
            ));
        }
        if !self.program_args.is_empty() {
            query.push(("programArg".to_string(), self.program_args.join(",")));
        }
        if let Some(class) = non_empty(&self.entry_class) {
            query.push(("entry-class".to_string(), class.to_string()));
        }
        if let Some(parallelism) = self.parallelism.filter(|p| *p > 0) {
            query.push(("parallelism".to_string(), parallelism.to_string()));
        }
        query
    }
}

/// Aggregation modes for job metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Min,
    Max,
    Sum,
    Avg,
}

impl Aggregation {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
        }
    }
}

/// Selection for aggregated job metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobMetricsOpts {
    pub metrics: Vec<String>,
    pub agg: Vec<Aggregation>,
    /// 32-character hexadecimal job ids.
    pub jobs: Vec<String>,
}

impl JobMetricsOpts {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if !self.metrics.is_empty() {
            query.push(("get".to_string(), self.metrics.join(",")));
        }
        if !self.agg.is_empty() {
            let agg: Vec<&str> = self.agg.iter().map(|a| a.as_str()).collect();
            query.push(("agg".to_string(), agg.join(",")));
        }
        if !self.jobs.is_empty() {
            query.push(("jobs".to_string(), self.jobs.join(",")));
        }
        query
    }
}

/// Body of a savepoint trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavepointOptions {
    /// Falls back to the cluster's default savepoint directory when unset.
    #[serde(
        rename = "target-directory",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub target_directory: Option<String>,
    #[serde(rename = "cancel-job")]
    pub cancel_job: bool,
}

/// Body of a stop-with-savepoint request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopOptions {
    #[serde(
        rename = "targetDirectory",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub target_directory: Option<String>,
    /// Emit MAX_WATERMARK before the savepoint so pending timers fire.
    pub drain: bool,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
