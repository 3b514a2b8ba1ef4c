use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Checkpointing statistics of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointStatistics {
    pub counts: CheckpointCounts,
    pub summary: CheckpointSummary,
    pub latest: LatestCheckpoints,
    pub history: Vec<CheckpointDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointCounts {
    pub restored: u64,
    pub total: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointSummary {
    pub state_size: MinMaxAvg,
    pub end_to_end_duration: MinMaxAvg,
    pub alignment_buffered: MinMaxAvg,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinMaxAvg {
    pub min: i64,
    pub max: i64,
    pub avg: f64,
}

/// Most recent checkpoint of each kind; absent (or `null`) when none exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatestCheckpoints {
    pub completed: Option<CheckpointDetail>,
    pub savepoint: Option<CheckpointDetail>,
    pub failed: Option<CheckpointDetail>,
    pub restored: Option<RestoredCheckpoint>,
}

/// Statistics of a single checkpoint or savepoint, whatever its status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointDetail {
    pub id: i64,
    pub status: String,
    pub is_savepoint: bool,
    pub trigger_timestamp: i64,
    pub latest_ack_timestamp: i64,
    pub state_size: i64,
    pub end_to_end_duration: i64,
    pub alignment_buffered: i64,
    pub num_subtasks: u32,
    pub num_acknowledged_subtasks: u32,
    pub tasks: HashMap<String, TaskCheckpointStatistics>,
    pub external_path: Option<String>,
    pub discarded: bool,
    pub failure_timestamp: i64,
    pub failure_message: Option<String>,
}

/// Per-vertex statistics of one checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskCheckpointStatistics {
    pub id: i64,
    pub status: String,
    pub latest_ack_timestamp: i64,
    pub state_size: i64,
    pub end_to_end_duration: i64,
    pub alignment_buffered: i64,
    pub num_subtasks: u32,
    pub num_acknowledged_subtasks: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoredCheckpoint {
    pub id: i64,
    pub restore_timestamp: i64,
    pub is_savepoint: bool,
    pub external_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "counts": {"restored": 1, "total": 3, "in_progress": 0, "completed": 2, "failed": 1},
        "summary": {
            "state_size": {"min": 10, "max": 30, "avg": 20},
            "end_to_end_duration": {"min": 5, "max": 9, "avg": 7.5},
            "alignment_buffered": {"min": 0, "max": 0, "avg": 0}
        },
        "latest": {
            "completed": {"@class": "completed", "id": 3, "status": "COMPLETED",
                "is_savepoint": false, "trigger_timestamp": 300, "latest_ack_timestamp": 305,
                "state_size": 30, "end_to_end_duration": 5, "alignment_buffered": 0,
                "num_subtasks": 2, "num_acknowledged_subtasks": 2,
                "tasks": {"v1": {"id": 3, "status": "COMPLETED", "latest_ack_timestamp": 305,
                    "state_size": 30, "end_to_end_duration": 5, "alignment_buffered": 0,
                    "num_subtasks": 2, "num_acknowledged_subtasks": 2}},
                "external_path": "file:/tmp/chk-3", "discarded": false},
            "savepoint": null,
            "failed": {"id": 2, "status": "FAILED", "failure_timestamp": 250,
                "failure_message": "timeout"},
            "restored": {"id": 1, "restore_timestamp": 90, "is_savepoint": true,
                "external_path": "file:/tmp/sp-1"}
        },
        "history": [
            {"id": 3, "status": "COMPLETED", "is_savepoint": false},
            {"id": 2, "status": "FAILED", "is_savepoint": false},
            {"id": 1, "status": "COMPLETED", "is_savepoint": true}
        ]
    }"#;

    #[test]
    fn history_length_and_entries_match_input() {
        let stats: CheckpointStatistics = serde_json::from_str(BODY).unwrap();
        assert_eq!(stats.history.len(), 3);
        let ids: Vec<i64> = stats.history.iter().map(|c| c.id).collect();
        let statuses: Vec<&str> = stats.history.iter().map(|c| c.status.as_str()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(statuses, vec!["COMPLETED", "FAILED", "COMPLETED"]);
    }

    #[test]
    fn latest_handles_null_and_partial_entries() {
        let stats: CheckpointStatistics = serde_json::from_str(BODY).unwrap();
        let completed = stats.latest.completed.unwrap();
        assert_eq!(completed.external_path.as_deref(), Some("file:/tmp/chk-3"));
        assert_eq!(completed.tasks["v1"].num_acknowledged_subtasks, 2);
        assert!(stats.latest.savepoint.is_none());
        let failed = stats.latest.failed.unwrap();
        assert_eq!(failed.failure_message.as_deref(), Some("timeout"));
        assert_eq!(stats.latest.restored.unwrap().restore_timestamp, 90);
    }

    #[test]
    fn counts_and_summary() {
        let stats: CheckpointStatistics = serde_json::from_str(BODY).unwrap();
        assert_eq!(stats.counts.total, 3);
        assert_eq!(stats.counts.in_progress, 0);
        assert_eq!(stats.summary.state_size.max, 30);
        assert_eq!(stats.summary.end_to_end_duration.avg, 7.5);
    }
}
