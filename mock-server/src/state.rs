//! In-memory cluster state behind the mock REST API.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::RwLock;
use uuid::Uuid;

pub type SharedCluster = Arc<RwLock<Cluster>>;

pub const UPLOAD_DIR: &str = "/tmp/flink-web-upload";
pub const DEFAULT_SAVEPOINT_DIR: &str = "file:/tmp/flink-savepoints";

#[derive(Debug, Default)]
pub struct Cluster {
    pub jars: HashMap<String, Jar>,
    pub jobs: HashMap<String, Job>,
    pub shut_down: bool,
}

#[derive(Debug, Clone)]
pub struct Jar {
    pub id: String,
    pub name: String,
    pub uploaded: i64,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Canceled,
    Finished,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Running => "RUNNING",
            JobState::Canceled => "CANCELED",
            JobState::Finished => "FINISHED",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub state: JobState,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub parallelism: u32,
    pub program_args: Vec<String>,
    pub vertex_id: String,
    pub restored_from: Option<String>,
    pub savepoints: Vec<Savepoint>,
}

#[derive(Debug, Clone)]
pub struct Savepoint {
    pub id: i64,
    pub trigger_timestamp: i64,
    pub external_path: String,
}

impl Cluster {
    pub fn shared() -> SharedCluster {
        Arc::new(RwLock::new(Cluster::default()))
    }

    pub fn add_jar(&mut self, file_name: &str, size: usize) -> Jar {
        let jar = Jar {
            id: format!("{}_{file_name}", Uuid::new_v4()),
            name: file_name.to_string(),
            uploaded: now_millis(),
            size,
        };
        self.jars.insert(jar.id.clone(), jar.clone());
        jar
    }

    pub fn start_job(
        &mut self,
        jar: &Jar,
        entry_class: Option<String>,
        parallelism: u32,
        program_args: Vec<String>,
        restored_from: Option<String>,
    ) -> Job {
        let job = Job {
            id: Uuid::new_v4().simple().to_string(),
            name: entry_class.unwrap_or_else(|| jar.name.clone()),
            state: JobState::Running,
            start_time: now_millis(),
            end_time: None,
            parallelism,
            program_args,
            vertex_id: Uuid::new_v4().simple().to_string(),
            restored_from,
            savepoints: Vec::new(),
        };
        self.jobs.insert(job.id.clone(), job.clone());
        job
    }

    pub fn running_jobs(&self) -> usize {
        self.jobs
            .values()
            .filter(|job| job.state == JobState::Running)
            .count()
    }
}

impl Job {
    /// Move to a terminal state. Jobs already terminal keep their state.
    pub fn terminate(&mut self, state: JobState) {
        if self.state == JobState::Running {
            self.state = state;
            self.end_time = Some(now_millis());
        }
    }

    pub fn duration(&self) -> i64 {
        self.end_time.unwrap_or_else(now_millis) - self.start_time
    }

    /// Record a completed savepoint under `directory` and return its id.
    pub fn take_savepoint(&mut self, directory: Option<&str>) -> i64 {
        let id = self.savepoints.len() as i64 + 1;
        let directory = directory.unwrap_or(DEFAULT_SAVEPOINT_DIR);
        let short_id = &self.id[..6.min(self.id.len())];
        self.savepoints.push(Savepoint {
            id,
            trigger_timestamp: now_millis(),
            external_path: format!("{directory}/savepoint-{short_id}-{id}"),
        });
        id
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jar_id_embeds_file_name() {
        let mut cluster = Cluster::default();
        let jar = cluster.add_jar("wordcount.jar", 10);
        assert!(jar.id.ends_with("_wordcount.jar"));
        assert!(cluster.jars.contains_key(&jar.id));
    }

    #[test]
    fn job_name_defaults_to_jar_name() {
        let mut cluster = Cluster::default();
        let jar = cluster.add_jar("wc.jar", 1);
        let job = cluster.start_job(&jar, None, 1, Vec::new(), None);
        assert_eq!(job.name, "wc.jar");
        assert_eq!(job.id.len(), 32);

        let job = cluster.start_job(
            &jar,
            Some("org.example.Main".to_string()),
            2,
            Vec::new(),
            None,
        );
        assert_eq!(job.name, "org.example.Main");
        assert_eq!(cluster.running_jobs(), 2);
    }

    #[test]
    fn terminal_state_is_sticky() {
        let mut cluster = Cluster::default();
        let jar = cluster.add_jar("wc.jar", 1);
        let mut job = cluster.start_job(&jar, None, 1, Vec::new(), None);
        job.terminate(JobState::Canceled);
        let ended = job.end_time;
        job.terminate(JobState::Finished);
        assert_eq!(job.state, JobState::Canceled);
        assert_eq!(job.end_time, ended);
    }

    #[test]
    fn savepoints_are_numbered() {
        let mut cluster = Cluster::default();
        let jar = cluster.add_jar("wc.jar", 1);
        let mut job = cluster.start_job(&jar, None, 1, Vec::new(), None);
        assert_eq!(job.take_savepoint(Some("/sp")), 1);
        assert_eq!(job.take_savepoint(None), 2);
        assert!(job.savepoints[0].external_path.starts_with("/sp/savepoint-"));
        assert!(job.savepoints[1]
            .external_path
            .starts_with(DEFAULT_SAVEPOINT_DIR));
    }
}
