//! In-process imitation of the cluster manager's REST API.
//!
//! Jars and jobs live in memory. Running a jar starts a job with a single
//! vertex that stays RUNNING until it is cancelled or stopped; savepoints
//! complete immediately. Unknown ids answer 404 with `{"errors": [...]}`.

pub mod state;

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

pub use state::{Cluster, Job, JobState, SharedCluster};
use state::{now_millis, UPLOAD_DIR};

pub const FLINK_VERSION: &str = "1.14.0";

/// Error payload in the shape the real server uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

type Reply<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            errors: vec![message.into()],
        }),
    )
}

fn not_found(what: &str, id: &str) -> (StatusCode, Json<ErrorBody>) {
    error(StatusCode::NOT_FOUND, format!("{what} {id} not found"))
}

#[derive(Deserialize)]
pub struct SavepointRequest {
    #[serde(rename = "target-directory")]
    pub target_directory: Option<String>,
    #[serde(rename = "cancel-job", default)]
    pub cancel_job: bool,
}

#[derive(Deserialize)]
pub struct StopRequest {
    #[serde(rename = "targetDirectory")]
    pub target_directory: Option<String>,
    #[serde(default)]
    pub drain: bool,
}

pub fn app() -> Router {
    app_with_state(Cluster::shared())
}

pub fn app_with_state(cluster: SharedCluster) -> Router {
    Router::new()
        .route("/cluster", delete(shutdown))
        .route("/config", get(config))
        .route("/jars", get(list_jars))
        .route("/jars/upload", post(upload_jar))
        .route("/jars/{id}", delete(delete_jar))
        .route("/jars/{id}/plan", get(plan_jar))
        .route("/jars/{id}/run", post(run_jar))
        .route("/jobmanager/config", get(job_manager_config))
        .route("/jobmanager/metrics", get(job_manager_metrics))
        .route("/jobs", get(list_jobs))
        .route("/jobs/overview", get(jobs_overview))
        .route("/jobs/metrics", get(job_metrics))
        .route("/jobs/{id}", get(job_detail).patch(cancel_job))
        .route("/jobs/{id}/checkpoints", get(checkpoints))
        .route("/jobs/{id}/savepoints", post(trigger_savepoint))
        .route("/jobs/{id}/stop", post(stop_with_savepoint))
        .with_state(cluster)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn shutdown(State(cluster): State<SharedCluster>) -> StatusCode {
    cluster.write().await.shut_down = true;
    tracing::info!("cluster shutdown requested");
    StatusCode::ACCEPTED
}

async fn config() -> Json<Value> {
    Json(json!({
        "refresh-interval": 3000,
        "timezone-name": "Coordinated Universal Time",
        "timezone-offset": 0,
        "flink-version": FLINK_VERSION,
        "flink-revision": "98997ea @ 2021-09-24T22:31:40+02:00",
        "features": {"web-submit": true}
    }))
}

async fn upload_jar(
    State(cluster): State<SharedCluster>,
    mut multipart: Multipart,
) -> Reply<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("jarfile") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| error(StatusCode::BAD_REQUEST, "jarfile part has no file name"))?;
        if !file_name.ends_with(".jar") {
            return Err(error(StatusCode::BAD_REQUEST, "Only Jar files are allowed."));
        }
        let content = field
            .bytes()
            .await
            .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?;

        let jar = cluster.write().await.add_jar(&file_name, content.len());
        tracing::info!(jar_id = %jar.id, bytes = jar.size, "jar uploaded");
        return Ok(Json(json!({
            "filename": format!("{UPLOAD_DIR}/{}", jar.id),
            "status": "success"
        })));
    }
    Err(error(StatusCode::BAD_REQUEST, "missing jarfile part"))
}

async fn list_jars(State(cluster): State<SharedCluster>) -> Json<Value> {
    let cluster = cluster.read().await;
    let mut jars: Vec<_> = cluster.jars.values().collect();
    jars.sort_by_key(|jar| jar.uploaded);
    let files: Vec<Value> = jars
        .iter()
        .map(|jar| {
            json!({
                "id": jar.id,
                "name": jar.name,
                "uploaded": jar.uploaded,
                "entry": []
            })
        })
        .collect();
    Json(json!({"address": "http://localhost:8081", "files": files}))
}

async fn delete_jar(
    State(cluster): State<SharedCluster>,
    Path(id): Path<String>,
) -> Reply<Json<Value>> {
    cluster
        .write()
        .await
        .jars
        .remove(&id)
        .ok_or_else(|| not_found("jar", &id))?;
    tracing::info!(jar_id = %id, "jar deleted");
    Ok(Json(json!({})))
}

fn plan_json(jid: &str, name: &str, vertex_id: &str, parallelism: u32, description: &str) -> Value {
    json!({
        "jid": jid,
        "name": name,
        "nodes": [{
            "id": vertex_id,
            "parallelism": parallelism,
            "operator": "",
            "operator_strategy": "",
            "description": description,
            "optimizer_properties": {}
        }]
    })
}

async fn plan_jar(
    State(cluster): State<SharedCluster>,
    Path(id): Path<String>,
) -> Reply<Json<Value>> {
    let cluster = cluster.read().await;
    let jar = cluster.jars.get(&id).ok_or_else(|| not_found("jar", &id))?;
    let plan = plan_json(
        &Uuid::new_v4().simple().to_string(),
        &jar.name,
        &Uuid::new_v4().simple().to_string(),
        1,
        &format!("Source: {}", jar.name),
    );
    Ok(Json(json!({ "plan": plan })))
}

async fn run_jar(
    State(cluster): State<SharedCluster>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply<Json<Value>> {
    let parallelism = match params.get("parallelism") {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| error(StatusCode::BAD_REQUEST, format!("invalid parallelism {raw}")))?,
        None => 1,
    };
    let program_args = params
        .get("programArg")
        .map(|args| args.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let mut cluster = cluster.write().await;
    let jar = cluster
        .jars
        .get(&id)
        .cloned()
        .ok_or_else(|| not_found("jar", &id))?;
    let job = cluster.start_job(
        &jar,
        params.get("entry-class").cloned(),
        parallelism,
        program_args,
        params.get("savepointPath").cloned(),
    );
    tracing::info!(job_id = %job.id, jar_id = %id, parallelism, "job started");
    Ok(Json(json!({ "jobid": job.id })))
}

async fn job_manager_config() -> Json<Value> {
    Json(json!([
        {"key": "jobmanager.rpc.address", "value": "localhost"},
        {"key": "jobmanager.rpc.port", "value": "6123"},
        {"key": "rest.port", "value": "8081"},
        {"key": "parallelism.default", "value": "1"},
        {"key": "taskmanager.numberOfTaskSlots", "value": "4"}
    ]))
}

async fn job_manager_metrics(
    State(cluster): State<SharedCluster>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let running = cluster.read().await.running_jobs();
    let known = [
        ("numRegisteredTaskManagers", "1".to_string()),
        ("taskSlotsTotal", "4".to_string()),
        ("numRunningJobs", running.to_string()),
    ];
    let metrics: Vec<Value> = match params.get("get") {
        Some(ids) => ids
            .split(',')
            .filter_map(|id| known.iter().find(|(k, _)| *k == id))
            .map(|(id, value)| json!({"id": id, "value": value}))
            .collect(),
        None => known.iter().map(|(id, _)| json!({ "id": id })).collect(),
    };
    Json(Value::Array(metrics))
}

async fn list_jobs(State(cluster): State<SharedCluster>) -> Json<Value> {
    let cluster = cluster.read().await;
    let jobs: Vec<Value> = cluster
        .jobs
        .values()
        .map(|job| json!({"id": job.id, "status": job.state.as_str()}))
        .collect();
    Json(json!({ "jobs": jobs }))
}

const EXECUTION_STATES: [&str; 10] = [
    "created",
    "scheduled",
    "deploying",
    "running",
    "finished",
    "canceling",
    "canceled",
    "failed",
    "reconciling",
    "initializing",
];

/// Per-state task counts for a job's single vertex.
fn task_counts(job: &Job, upper_case: bool) -> Value {
    let mut counts = serde_json::Map::new();
    for state in EXECUTION_STATES {
        let key = if upper_case {
            state.to_uppercase()
        } else {
            state.to_string()
        };
        let count = if job.state.as_str().eq_ignore_ascii_case(state) {
            job.parallelism
        } else {
            0
        };
        counts.insert(key, json!(count));
    }
    if !upper_case {
        counts.insert("total".to_string(), json!(job.parallelism));
    }
    Value::Object(counts)
}

async fn jobs_overview(State(cluster): State<SharedCluster>) -> Json<Value> {
    let cluster = cluster.read().await;
    let jobs: Vec<Value> = cluster
        .jobs
        .values()
        .map(|job| {
            json!({
                "jid": job.id,
                "name": job.name,
                "state": job.state.as_str(),
                "start-time": job.start_time,
                "end-time": job.end_time.unwrap_or(-1),
                "duration": job.duration(),
                "last-modification": job.end_time.unwrap_or(job.start_time),
                "tasks": task_counts(job, false)
            })
        })
        .collect();
    Json(json!({ "jobs": jobs }))
}

fn aggregate(values: &[i64], agg: &str) -> Option<Value> {
    let sum: i64 = values.iter().sum();
    match agg {
        "min" => Some(json!(values.iter().min().copied().unwrap_or(0))),
        "max" => Some(json!(values.iter().max().copied().unwrap_or(0))),
        "sum" => Some(json!(sum)),
        "avg" if values.is_empty() => Some(json!(0.0)),
        "avg" => Some(json!(sum as f64 / values.len() as f64)),
        _ => None,
    }
}

async fn job_metrics(
    State(cluster): State<SharedCluster>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let cluster = cluster.read().await;
    let selected: Vec<&Job> = match params.get("jobs") {
        Some(ids) => ids.split(',').filter_map(|id| cluster.jobs.get(id)).collect(),
        None => cluster.jobs.values().collect(),
    };
    let metric_ids: Vec<&str> = match params.get("get") {
        Some(ids) => ids.split(',').collect(),
        None => vec!["numRestarts", "uptime"],
    };
    let aggs: Vec<&str> = match params.get("agg") {
        Some(aggs) => aggs.split(',').collect(),
        None => vec!["min", "max", "sum", "avg"],
    };

    let mut result = serde_json::Map::new();
    for metric in metric_ids {
        let values: Vec<i64> = match metric {
            "numRestarts" => selected.iter().map(|_| 0).collect(),
            "uptime" => selected.iter().map(|job| job.duration()).collect(),
            _ => continue,
        };
        let mut aggregated = serde_json::Map::new();
        for agg in &aggs {
            if let Some(value) = aggregate(&values, agg) {
                aggregated.insert(agg.to_string(), value);
            }
        }
        result.insert(metric.to_string(), Value::Object(aggregated));
    }
    Json(Value::Object(result))
}

async fn job_detail(
    State(cluster): State<SharedCluster>,
    Path(id): Path<String>,
) -> Reply<Json<Value>> {
    let cluster = cluster.read().await;
    let job = cluster.jobs.get(&id).ok_or_else(|| not_found("job", &id))?;

    let mut timestamps = serde_json::Map::new();
    timestamps.insert("CREATED".to_string(), json!(job.start_time));
    timestamps.insert("RUNNING".to_string(), json!(job.start_time));
    if let Some(end) = job.end_time {
        timestamps.insert(job.state.as_str().to_string(), json!(end));
    }

    let mut status_counts = serde_json::Map::new();
    status_counts.insert(job.state.as_str().to_string(), json!(1));

    let description = if job.program_args.is_empty() {
        format!("Source: {}", job.name)
    } else {
        format!("Source: {} {}", job.name, job.program_args.join(" "))
    };

    Ok(Json(json!({
        "jid": job.id,
        "name": job.name,
        "isStoppable": false,
        "state": job.state.as_str(),
        "start-time": job.start_time,
        "end-time": job.end_time.unwrap_or(-1),
        "duration": job.duration(),
        "now": now_millis(),
        "timestamps": timestamps,
        "vertices": [{
            "id": job.vertex_id,
            "name": format!("Source: {}", job.name),
            "status": job.state.as_str(),
            "parallelism": job.parallelism,
            "start-time": job.start_time,
            "end-time": job.end_time.unwrap_or(-1),
            "duration": job.duration(),
            "tasks": task_counts(job, true),
            "metrics": {
                "read-bytes": 0,
                "read-bytes-complete": true,
                "write-records": 0,
                "write-records-complete": true
            }
        }],
        "status-counts": status_counts,
        "plan": plan_json(&job.id, &job.name, &job.vertex_id, job.parallelism, &description)
    })))
}

async fn cancel_job(
    State(cluster): State<SharedCluster>,
    Path(id): Path<String>,
) -> Reply<StatusCode> {
    let mut cluster = cluster.write().await;
    let job = cluster.jobs.get_mut(&id).ok_or_else(|| not_found("job", &id))?;
    job.terminate(JobState::Canceled);
    tracing::info!(job_id = %id, "job cancelled");
    Ok(StatusCode::ACCEPTED)
}

async fn checkpoints(
    State(cluster): State<SharedCluster>,
    Path(id): Path<String>,
) -> Reply<Json<Value>> {
    let cluster = cluster.read().await;
    let job = cluster.jobs.get(&id).ok_or_else(|| not_found("job", &id))?;

    let history: Vec<Value> = job
        .savepoints
        .iter()
        .rev()
        .map(|sp| {
            json!({
                "@class": "completed",
                "id": sp.id,
                "status": "COMPLETED",
                "is_savepoint": true,
                "trigger_timestamp": sp.trigger_timestamp,
                "latest_ack_timestamp": sp.trigger_timestamp,
                "state_size": 0,
                "end_to_end_duration": 0,
                "alignment_buffered": 0,
                "num_subtasks": job.parallelism,
                "num_acknowledged_subtasks": job.parallelism,
                "tasks": {},
                "external_path": sp.external_path,
                "discarded": false
            })
        })
        .collect();
    let restored = job.restored_from.as_ref().map(|path| {
        json!({
            "id": 0,
            "restore_timestamp": job.start_time,
            "is_savepoint": true,
            "external_path": path
        })
    });
    let zero = json!({"min": 0, "max": 0, "avg": 0});

    Ok(Json(json!({
        "counts": {
            "restored": u32::from(restored.is_some()),
            "total": history.len(),
            "in_progress": 0,
            "completed": history.len(),
            "failed": 0
        },
        "summary": {
            "state_size": zero,
            "end_to_end_duration": zero,
            "alignment_buffered": zero
        },
        "latest": {
            "completed": null,
            "savepoint": history.first(),
            "failed": null,
            "restored": restored
        },
        "history": history
    })))
}

async fn trigger_savepoint(
    State(cluster): State<SharedCluster>,
    Path(id): Path<String>,
    Json(request): Json<SavepointRequest>,
) -> Reply<(StatusCode, Json<Value>)> {
    let mut cluster = cluster.write().await;
    let job = cluster.jobs.get_mut(&id).ok_or_else(|| not_found("job", &id))?;
    if job.state != JobState::Running {
        return Err(error(StatusCode::CONFLICT, format!("job {id} is not running")));
    }
    let savepoint = job.take_savepoint(request.target_directory.as_deref());
    if request.cancel_job {
        job.terminate(JobState::Canceled);
    }
    tracing::info!(job_id = %id, savepoint, cancel = request.cancel_job, "savepoint triggered");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "request-id": Uuid::new_v4().simple().to_string() })),
    ))
}

async fn stop_with_savepoint(
    State(cluster): State<SharedCluster>,
    Path(id): Path<String>,
    Json(request): Json<StopRequest>,
) -> Reply<(StatusCode, Json<Value>)> {
    let mut cluster = cluster.write().await;
    let job = cluster.jobs.get_mut(&id).ok_or_else(|| not_found("job", &id))?;
    if job.state != JobState::Running {
        return Err(error(StatusCode::CONFLICT, format!("job {id} is not running")));
    }
    let savepoint = job.take_savepoint(request.target_directory.as_deref());
    job.terminate(JobState::Finished);
    tracing::info!(job_id = %id, savepoint, drain = request.drain, "job stopped with savepoint");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "request-id": Uuid::new_v4().simple().to_string() })),
    ))
}
