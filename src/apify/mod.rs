pub mod client;
pub mod error;
pub mod mock;

pub use error::UpstreamError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An actor as it appears in the upstream listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub username: Option<String>,
    pub is_public: Option<bool>,
}

/// Full actor metadata from `GET /acts/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDetail {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default_run_options: Option<DefaultRunOptions>,
    pub example_run_input: Option<Value>,
    pub input_schema: Option<Value>,
    pub versions: Option<Vec<ActorVersion>>,
}

impl ActorDetail {
    /// The newest version, listed first upstream.
    pub fn latest_version(&self) -> Option<&ActorVersion> {
        self.versions.as_deref().and_then(<[ActorVersion]>::first)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DefaultRunOptions {
    pub input: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorVersion {
    pub version_number: Option<String>,
    pub input_schema: Option<Value>,
}

/// Lifecycle status of a run. Unknown upstream values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    TimingOut,
    TimedOut,
    Aborting,
    Aborted,
    Other(String),
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Ready => "READY",
            RunStatus::Running => "RUNNING",
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
            RunStatus::TimingOut => "TIMING-OUT",
            RunStatus::TimedOut => "TIMED-OUT",
            RunStatus::Aborting => "ABORTING",
            RunStatus::Aborted => "ABORTED",
            RunStatus::Other(s) => s,
        }
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "READY" => RunStatus::Ready,
            "RUNNING" => RunStatus::Running,
            "SUCCEEDED" => RunStatus::Succeeded,
            "FAILED" => RunStatus::Failed,
            "TIMING-OUT" => RunStatus::TimingOut,
            "TIMED-OUT" => RunStatus::TimedOut,
            "ABORTING" => RunStatus::Aborting,
            "ABORTED" => RunStatus::Aborted,
            _ => RunStatus::Other(s),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution of an actor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: Option<String>,
    pub status: Option<RunStatus>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub stats: Option<Value>,
    pub default_dataset_id: Option<String>,
    pub error_message: Option<String>,
}

impl Run {
    pub fn is_running(&self) -> bool {
        self.status == Some(RunStatus::Running)
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == Some(RunStatus::Succeeded)
    }

    /// Dataset to preview, if the run has a non-empty one.
    pub fn dataset_id(&self) -> Option<&str> {
        self.default_dataset_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}

/// Browser-style truthiness for JSON values: `null`, `false`, `0` and `""`
/// count as absent, any object or array counts as present.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Pick the display title, falling back to the internal name. Absent when
/// both are.
pub fn display_title(title: Option<&str>, name: Option<&str>) -> Option<String> {
    match title {
        Some(t) if !t.is_empty() => Some(t.to_string()),
        _ => name.map(str::to_string),
    }
}

/// The actor-execution platform the relay forwards to.
///
/// Every call carries the caller's token; implementations must not keep it.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn list_actors(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ActorRecord>, UpstreamError>;

    async fn get_actor(&self, token: &str, actor_id: &str) -> Result<ActorDetail, UpstreamError>;

    /// Fetch the input schema document declared by an actor version.
    async fn get_version_input_schema(
        &self,
        token: &str,
        actor_id: &str,
        version: &str,
    ) -> Result<Value, UpstreamError>;

    /// Submit a run, letting the upstream hold the call for up to `wait_secs`.
    async fn start_run(
        &self,
        token: &str,
        actor_id: &str,
        input: &Value,
        wait_secs: u64,
    ) -> Result<Run, UpstreamError>;

    async fn get_run(&self, token: &str, actor_id: &str, run_id: &str)
    -> Result<Run, UpstreamError>;

    async fn dataset_items(
        &self,
        token: &str,
        dataset_id: &str,
        limit: u32,
    ) -> Result<Value, UpstreamError>;
}
