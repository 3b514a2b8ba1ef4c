//! Blocking client for a stream-processing cluster manager's REST API.
//!
//! # Overview
//! `FlinkClient` maps each control-plane operation (cluster config, jar
//! upload/run/delete, job status, metrics, checkpoints, savepoints, shutdown)
//! to a single request/response exchange and decodes the JSON answer into a
//! typed model.
//!
//! # Design
//! - `FlinkClient` is stateless: it holds the configured address and a
//!   `Transport`, so one handle can be shared across threads.
//! - Each operation has a pure `build_*` counterpart producing an
//!   `HttpRequest`, keeping the I/O boundary explicit and testable.
//! - `Transport::perform` applies the only status policy: anything outside
//!   200..=299 becomes `ApiError::HttpError` with the status and body.
//! - Models are defined independently from the mock-server crate;
//!   integration tests catch schema drift.
//!
//! ```no_run
//! use flink_rest::{FlinkClient, RunOpts};
//!
//! let client = FlinkClient::new("localhost:8081");
//! let upload = client.upload_jar("./wordcount.jar")?;
//! let run = client.run_jar(upload.jar_id(), &RunOpts::default())?;
//! println!("started {}", run.job_id);
//! # Ok::<(), flink_rest::ApiError>(())
//! ```

pub mod address;
pub mod client;
pub mod error;
pub mod http;
pub mod multipart;
pub mod options;
pub mod transport;
pub mod types;

pub use client::FlinkClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{Aggregation, JobMetricsOpts, RunOpts, SavepointOptions, StopOptions};
pub use transport::{Transport, UreqTransport};
pub use types::*;
