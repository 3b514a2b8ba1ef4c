//! Typed operations against the cluster's REST API.
//!
//! # Design
//! `FlinkClient` holds only the configured address and a transport, and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and an operation method
//! that executes it through the transport and decodes the body. Errors are
//! returned unchanged; nothing is retried.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::address;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::multipart::FilePart;
use crate::options::{JobMetricsOpts, RunOpts, SavepointOptions, StopOptions};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    CheckpointStatistics, ClusterConfig, ConfigEntry, JarList, JarPlan, JobDetail, JobList,
    JobMetrics, JobsOverview, MetricValue, RunJarResponse, TriggerResponse, UploadResponse,
};

/// Form field the server reads uploaded jars from.
const JAR_FIELD: &str = "jarfile";

/// Client bound to one cluster address.
#[derive(Debug, Clone)]
pub struct FlinkClient<T = UreqTransport> {
    addr: String,
    transport: T,
}

impl FlinkClient {
    /// A client for `addr` (`host:port` or an `http`/`https` URL) using the
    /// default ureq transport.
    pub fn new(addr: &str) -> Self {
        Self::with_transport(addr, UreqTransport::new())
    }
}

impl<T> FlinkClient<T> {
    pub fn with_transport(addr: &str, transport: T) -> Self {
        Self {
            addr: addr.to_string(),
            transport,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, address::resolve(&self.addr, path))
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_vec(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    pub fn build_shutdown(&self) -> HttpRequest {
        self.request(HttpMethod::Delete, "/cluster")
    }

    pub fn build_config(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/config")
    }

    /// Read `path` and wrap it in a multipart body under the `jarfile` field.
    pub fn build_upload_jar(&self, path: &Path) -> Result<HttpRequest, ApiError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ApiError::InvalidPath(path.to_path_buf()))?;
        let content = std::fs::read(path).map_err(|source| ApiError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let form = FilePart {
            field: JAR_FIELD,
            file_name,
            content: &content,
        }
        .encode();

        let mut req = self.request(HttpMethod::Post, "/jars/upload");
        req.headers
            .push(("content-type".to_string(), form.content_type));
        req.body = Some(form.body);
        Ok(req)
    }

    pub fn build_jars(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/jars")
    }

    pub fn build_delete_jar(&self, jar_id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/jars/{jar_id}"))
    }

    pub fn build_plan_jar(&self, jar_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/jars/{jar_id}/plan"))
    }

    pub fn build_run_jar(&self, jar_id: &str, opts: &RunOpts) -> HttpRequest {
        let mut req = self.request(HttpMethod::Post, &format!("/jars/{jar_id}/run"));
        req.query = opts.query_pairs();
        req
    }

    pub fn build_job_manager_config(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/jobmanager/config")
    }

    pub fn build_job_manager_metrics<S: AsRef<str>>(&self, ids: &[S]) -> HttpRequest {
        let mut req = self.request(HttpMethod::Get, "/jobmanager/metrics");
        if !ids.is_empty() {
            let ids: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
            req.query.push(("get".to_string(), ids.join(",")));
        }
        req
    }

    pub fn build_jobs(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/jobs")
    }

    pub fn build_jobs_overview(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/jobs/overview")
    }

    pub fn build_job_metrics(&self, opts: &JobMetricsOpts) -> HttpRequest {
        let mut req = self.request(HttpMethod::Get, "/jobs/metrics");
        req.query = opts.query_pairs();
        req
    }

    pub fn build_job(&self, job_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/jobs/{job_id}"))
    }

    pub fn build_stop_job(&self, job_id: &str) -> HttpRequest {
        self.request(HttpMethod::Patch, &format!("/jobs/{job_id}"))
    }

    pub fn build_checkpoints(&self, job_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/jobs/{job_id}/checkpoints"))
    }

    pub fn build_trigger_savepoint(
        &self,
        job_id: &str,
        opts: &SavepointOptions,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, &format!("/jobs/{job_id}/savepoints"), opts)
    }

    pub fn build_stop_job_with_savepoint(
        &self,
        job_id: &str,
        opts: &StopOptions,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, &format!("/jobs/{job_id}/stop"), opts)
    }
}

impl<T: Transport> FlinkClient<T> {
    fn execute<R: DeserializeOwned>(&self, req: &HttpRequest) -> Result<R, ApiError> {
        let body = self.transport.perform(req)?;
        decode(&body)
    }

    fn execute_empty(&self, req: &HttpRequest) -> Result<(), ApiError> {
        self.transport.perform(req).map(|_| ())
    }

    /// Shut the cluster down.
    pub fn shutdown(&self) -> Result<(), ApiError> {
        self.execute_empty(&self.build_shutdown())
    }

    /// Configuration of the web UI.
    pub fn config(&self) -> Result<ClusterConfig, ApiError> {
        self.execute(&self.build_config())
    }

    /// Upload a local jar. The jar id is the last segment of the returned
    /// `filename`.
    pub fn upload_jar(&self, path: impl AsRef<Path>) -> Result<UploadResponse, ApiError> {
        let req = self.build_upload_jar(path.as_ref())?;
        self.execute(&req)
    }

    /// All jars previously uploaded.
    pub fn jars(&self) -> Result<JarList, ApiError> {
        self.execute(&self.build_jars())
    }

    pub fn delete_jar(&self, jar_id: &str) -> Result<(), ApiError> {
        self.execute_empty(&self.build_delete_jar(jar_id))
    }

    /// Dataflow plan of the job contained in an uploaded jar.
    pub fn plan_jar(&self, jar_id: &str) -> Result<JarPlan, ApiError> {
        self.execute(&self.build_plan_jar(jar_id))
    }

    /// Submit a job by running an uploaded jar.
    pub fn run_jar(&self, jar_id: &str, opts: &RunOpts) -> Result<RunJarResponse, ApiError> {
        self.execute(&self.build_run_jar(jar_id, opts))
    }

    pub fn job_manager_config(&self) -> Result<Vec<ConfigEntry>, ApiError> {
        self.execute(&self.build_job_manager_config())
    }

    /// Job manager metrics. With no ids the server lists available metric ids
    /// without values.
    pub fn job_manager_metrics<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<MetricValue>, ApiError> {
        self.execute(&self.build_job_manager_metrics(ids))
    }

    /// Id and status of every job.
    pub fn jobs(&self) -> Result<JobList, ApiError> {
        self.execute(&self.build_jobs())
    }

    pub fn jobs_overview(&self) -> Result<JobsOverview, ApiError> {
        self.execute(&self.build_jobs_overview())
    }

    /// Aggregated metrics across jobs.
    pub fn job_metrics(&self, opts: &JobMetricsOpts) -> Result<JobMetrics, ApiError> {
        self.execute(&self.build_job_metrics(opts))
    }

    pub fn job(&self, job_id: &str) -> Result<JobDetail, ApiError> {
        self.execute(&self.build_job(job_id))
    }

    /// Cancel a job.
    pub fn stop_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.execute_empty(&self.build_stop_job(job_id))
    }

    pub fn checkpoints(&self, job_id: &str) -> Result<CheckpointStatistics, ApiError> {
        self.execute(&self.build_checkpoints(job_id))
    }

    /// Trigger a savepoint, optionally cancelling the job afterwards.
    ///
    /// The operation is asynchronous on the server; the returned request id
    /// identifies it.
    pub fn trigger_savepoint(
        &self,
        job_id: &str,
        opts: &SavepointOptions,
    ) -> Result<TriggerResponse, ApiError> {
        let req = self.build_trigger_savepoint(job_id, opts)?;
        self.execute(&req)
    }

    /// Stop a job after taking a savepoint.
    pub fn stop_job_with_savepoint(
        &self,
        job_id: &str,
        opts: &StopOptions,
    ) -> Result<TriggerResponse, ApiError> {
        let req = self.build_stop_job_with_savepoint(job_id, opts)?;
        self.execute(&req)
    }

    /// Generic job submission. Not supported; use `upload_jar` and `run_jar`.
    pub fn submit_job(&self) -> Result<(), ApiError> {
        Err(ApiError::NotImplemented("submit_job"))
    }
}

fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
