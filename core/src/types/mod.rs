//! Response models for the cluster REST API.
//!
//! # Design
//! Each struct mirrors the server's JSON exactly: field names are renamed to
//! the wire keys, missing keys take their default value and unknown keys are
//! ignored (`#[serde(default)]` on every container). The models carry no
//! behavior.

mod checkpoint;
mod cluster;
mod jar;
mod job;

pub use checkpoint::{
    CheckpointCounts, CheckpointDetail, CheckpointStatistics, CheckpointSummary,
    LatestCheckpoints, MinMaxAvg, RestoredCheckpoint, TaskCheckpointStatistics,
};
pub use cluster::{ClusterConfig, ConfigEntry, Features, MetricValue};
pub use jar::{
    JarEntry, JarFile, JarList, JarPlan, Plan, PlanInput, PlanNode, RunJarResponse, UploadResponse,
};
pub use job::{
    JobDetail, JobIdStatus, JobList, JobMetrics, JobOverview, JobsOverview, TaskCounts,
    TriggerResponse, Vertex,
};
