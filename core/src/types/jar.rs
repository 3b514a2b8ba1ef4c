use serde::{Deserialize, Serialize};

/// Answer to a jar upload. `filename` is the server-side path; its last
/// segment is the jar id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadResponse {
    pub filename: String,
    pub status: String,
}

impl UploadResponse {
    /// The jar id assigned by the server.
    pub fn jar_id(&self) -> &str {
        self.filename.rsplit('/').next().unwrap_or(&self.filename)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JarList {
    pub address: String,
    pub files: Vec<JarFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JarFile {
    pub id: String,
    pub name: String,
    pub uploaded: i64,
    #[serde(rename = "entry")]
    pub entries: Vec<JarEntry>,
}

/// An entry point class found in a jar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JarEntry {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JarPlan {
    pub plan: Plan,
}

/// Dataflow plan graph of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    pub jid: String,
    pub name: String,
    pub nodes: Vec<PlanNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanNode {
    pub id: String,
    pub parallelism: u32,
    pub operator: String,
    pub operator_strategy: String,
    pub description: String,
    pub inputs: Vec<PlanInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanInput {
    pub num: u32,
    pub id: String,
    pub ship_strategy: String,
    pub exchange: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunJarResponse {
    #[serde(rename = "jobid", alias = "id")]
    pub job_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jar_id_is_last_path_segment() {
        let resp = UploadResponse {
            filename: "/tmp/flink-web-upload/8c0c2226_test.jar".to_string(),
            status: "success".to_string(),
        };
        assert_eq!(resp.jar_id(), "8c0c2226_test.jar");

        let bare = UploadResponse {
            filename: "plain.jar".to_string(),
            status: String::new(),
        };
        assert_eq!(bare.jar_id(), "plain.jar");
    }

    #[test]
    fn decodes_jar_list_entries() {
        let body = r#"{
            "address": "http://localhost:8081",
            "files": [{
                "id": "abc_wordcount.jar",
                "name": "wordcount.jar",
                "uploaded": 1634567890000,
                "entry": [{"name": "org.example.WordCount", "description": null}]
            }]
        }"#;
        let jars: JarList = serde_json::from_str(body).unwrap();
        assert_eq!(jars.address, "http://localhost:8081");
        assert_eq!(jars.files.len(), 1);
        assert_eq!(jars.files[0].uploaded, 1634567890000);
        assert_eq!(jars.files[0].entries[0].name, "org.example.WordCount");
        assert_eq!(jars.files[0].entries[0].description, None);
    }

    #[test]
    fn decodes_plan_nodes_and_inputs() {
        let body = r#"{"plan":{"jid":"j1","name":"WordCount","nodes":[
            {"id":"n2","parallelism":4,"operator":"","operator_strategy":"","description":"Sink",
             "inputs":[{"num":0,"id":"n1","ship_strategy":"HASH","exchange":"pipelined_bounded"}]},
            {"id":"n1","parallelism":4,"operator":"","operator_strategy":"","description":"Source"}
        ]}}"#;
        let plan: JarPlan = serde_json::from_str(body).unwrap();
        assert_eq!(plan.plan.name, "WordCount");
        assert_eq!(plan.plan.nodes.len(), 2);
        assert_eq!(plan.plan.nodes[0].inputs[0].ship_strategy, "HASH");
        assert!(plan.plan.nodes[1].inputs.is_empty());
    }

    #[test]
    fn run_response_accepts_jobid_key() {
        let resp: RunJarResponse =
            serde_json::from_str(r#"{"jobid":"ae6c3d7fd3b9c8f1f0ad6ab3d5c0a1b2"}"#).unwrap();
        assert_eq!(resp.job_id, "ae6c3d7fd3b9c8f1f0ad6ab3d5c0a1b2");
    }
}
