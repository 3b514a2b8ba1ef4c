use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::jar::Plan;

/// Aggregated job metrics. The server does not fix a schema, so values are
/// left as raw JSON.
pub type JobMetrics = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobList {
    pub jobs: Vec<JobIdStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobIdStatus {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsOverview {
    pub jobs: Vec<JobOverview>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOverview {
    pub jid: String,
    pub name: String,
    pub state: String,
    #[serde(rename = "start-time")]
    pub start_time: i64,
    #[serde(rename = "end-time")]
    pub end_time: i64,
    pub duration: i64,
    #[serde(rename = "last-modification")]
    pub last_modification: i64,
    pub tasks: TaskCounts,
}

/// Number of tasks per execution state.
///
/// The overview keys counts in lower case while job details use the
/// execution state names; both spellings decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskCounts {
    pub total: u32,
    #[serde(alias = "CREATED")]
    pub created: u32,
    #[serde(alias = "SCHEDULED")]
    pub scheduled: u32,
    #[serde(alias = "DEPLOYING")]
    pub deploying: u32,
    #[serde(alias = "RUNNING")]
    pub running: u32,
    #[serde(alias = "FINISHED")]
    pub finished: u32,
    #[serde(alias = "CANCELING")]
    pub canceling: u32,
    #[serde(alias = "CANCELED")]
    pub canceled: u32,
    #[serde(alias = "FAILED")]
    pub failed: u32,
    #[serde(alias = "RECONCILING")]
    pub reconciling: u32,
    #[serde(alias = "INITIALIZING")]
    pub initializing: u32,
}

/// Full detail of one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDetail {
    pub jid: String,
    pub name: String,
    #[serde(rename = "isStoppable")]
    pub is_stoppable: bool,
    pub state: String,
    #[serde(rename = "start-time")]
    pub start_time: i64,
    #[serde(rename = "end-time")]
    pub end_time: i64,
    pub duration: i64,
    pub now: i64,
    /// Millisecond timestamp of each job state transition, keyed by state name.
    pub timestamps: BTreeMap<String, i64>,
    pub vertices: Vec<Vertex>,
    #[serde(rename = "status-counts")]
    pub status_counts: TaskCounts,
    pub plan: Plan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vertex {
    pub id: String,
    pub name: String,
    pub status: String,
    pub parallelism: u32,
    #[serde(rename = "start-time")]
    pub start_time: i64,
    #[serde(rename = "end-time")]
    pub end_time: i64,
    pub duration: i64,
    pub tasks: TaskCounts,
    pub metrics: HashMap<String, serde_json::Value>,
}

/// Id of an asynchronous operation (savepoint, stop) for later polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerResponse {
    #[serde(rename = "request-id")]
    pub request_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_uses_lower_case_task_counts() {
        let body = r#"{"jobs":[{"jid":"j1","name":"wc","state":"RUNNING","start-time":10,
            "end-time":-1,"duration":5,"last-modification":12,
            "tasks":{"total":3,"running":2,"finished":1,"created":0}}]}"#;
        let overview: JobsOverview = serde_json::from_str(body).unwrap();
        let job = &overview.jobs[0];
        assert_eq!(job.end_time, -1);
        assert_eq!(job.tasks.total, 3);
        assert_eq!(job.tasks.running, 2);
        assert_eq!(job.tasks.finished, 1);
    }

    #[test]
    fn job_detail_decodes_state_named_counts_and_timestamps() {
        let body = r#"{
            "jid":"j1","name":"wc","isStoppable":false,"state":"RUNNING",
            "start-time":100,"end-time":-1,"duration":50,"now":150,
            "timestamps":{"CREATED":90,"RUNNING":100,"FAILED":0},
            "vertices":[{"id":"v1","name":"Source","status":"RUNNING","parallelism":2,
                "start-time":100,"end-time":-1,"duration":50,
                "tasks":{"RUNNING":2,"CANCELED":0},
                "metrics":{"read-bytes":0,"read-bytes-complete":true}}],
            "status-counts":{"RUNNING":1,"FINISHED":0},
            "plan":{"jid":"j1","name":"wc","nodes":[]}
        }"#;
        let job: JobDetail = serde_json::from_str(body).unwrap();
        assert_eq!(job.timestamps.get("RUNNING"), Some(&100));
        assert_eq!(job.timestamps.len(), 3);
        assert_eq!(job.status_counts.running, 1);
        assert_eq!(job.vertices[0].tasks.running, 2);
        assert_eq!(
            job.vertices[0].metrics.get("read-bytes-complete"),
            Some(&serde_json::Value::Bool(true))
        );
        assert_eq!(job.plan.jid, "j1");
    }

    #[test]
    fn trigger_response_reads_request_id() {
        let resp: TriggerResponse = serde_json::from_str(r#"{"request-id":"t-1"}"#).unwrap();
        assert_eq!(resp.request_id, "t-1");
    }
}
