use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

use super::{ActorDetail, ActorRecord, Platform, Run, UpstreamError};

/// Scripted outcome: the value, or the HTTP status the upstream fails with.
pub type Scripted<T> = Result<T, u16>;

/// An upstream call as seen by [`MockPlatform`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListActors { limit: u32, offset: u32 },
    GetActor { actor_id: String },
    GetVersionInputSchema { actor_id: String, version: String },
    StartRun { actor_id: String, input: Value, wait_secs: u64 },
    GetRun { actor_id: String, run_id: String },
    DatasetItems { dataset_id: String, limit: u32 },
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: Call,
    pub token: String,
    pub at: Instant,
}

/// A scripted platform for tests. Returns pre-defined outcomes and records
/// every call it receives.
///
/// Run polls are consumed in order; every other call repeats its script.
#[derive(Default)]
pub struct MockPlatform {
    actors: Option<Scripted<Vec<ActorRecord>>>,
    actor: Option<Scripted<ActorDetail>>,
    version_schema: Option<Scripted<Value>>,
    start: Option<Scripted<Run>>,
    polls: Mutex<VecDeque<Scripted<Run>>>,
    dataset: Option<Scripted<Value>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actors(mut self, actors: Scripted<Vec<ActorRecord>>) -> Self {
        self.actors = Some(actors);
        self
    }

    pub fn with_actor(mut self, actor: Scripted<ActorDetail>) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_version_schema(mut self, schema: Scripted<Value>) -> Self {
        self.version_schema = Some(schema);
        self
    }

    pub fn with_start(mut self, run: Scripted<Run>) -> Self {
        self.start = Some(run);
        self
    }

    pub fn with_polls(self, polls: Vec<Scripted<Run>>) -> Self {
        self.polls.lock().unwrap().extend(polls);
        self
    }

    pub fn with_dataset(mut self, items: Scripted<Value>) -> Self {
        self.dataset = Some(items);
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.call.clone())
            .collect()
    }

    /// Calls with the token and the (tokio) instant they arrived.
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, token: &str, call: Call) {
        self.calls.lock().unwrap().push(RecordedCall {
            call,
            token: token.to_string(),
            at: Instant::now(),
        });
    }
}

fn unscripted(what: &str) -> UpstreamError {
    UpstreamError::Status {
        status: 500,
        body: format!("MockPlatform: no {what} scripted"),
    }
}

fn outcome<T: Clone>(script: &Option<Scripted<T>>, what: &str) -> Result<T, UpstreamError> {
    match script {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(status)) => Err(UpstreamError::Status {
            status: *status,
            body: format!("MockPlatform: scripted {what} failure"),
        }),
        None => Err(unscripted(what)),
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn list_actors(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ActorRecord>, UpstreamError> {
        self.record(token, Call::ListActors { limit, offset });
        outcome(&self.actors, "actor list")
    }

    async fn get_actor(&self, token: &str, actor_id: &str) -> Result<ActorDetail, UpstreamError> {
        self.record(
            token,
            Call::GetActor {
                actor_id: actor_id.to_string(),
            },
        );
        outcome(&self.actor, "actor")
    }

    async fn get_version_input_schema(
        &self,
        token: &str,
        actor_id: &str,
        version: &str,
    ) -> Result<Value, UpstreamError> {
        self.record(
            token,
            Call::GetVersionInputSchema {
                actor_id: actor_id.to_string(),
                version: version.to_string(),
            },
        );
        outcome(&self.version_schema, "version input schema")
    }

    async fn start_run(
        &self,
        token: &str,
        actor_id: &str,
        input: &Value,
        wait_secs: u64,
    ) -> Result<Run, UpstreamError> {
        self.record(
            token,
            Call::StartRun {
                actor_id: actor_id.to_string(),
                input: input.clone(),
                wait_secs,
            },
        );
        outcome(&self.start, "run start")
    }

    async fn get_run(
        &self,
        token: &str,
        actor_id: &str,
        run_id: &str,
    ) -> Result<Run, UpstreamError> {
        self.record(
            token,
            Call::GetRun {
                actor_id: actor_id.to_string(),
                run_id: run_id.to_string(),
            },
        );
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(scripted) => outcome(&Some(scripted), "run poll"),
            None => Err(unscripted("further run poll")),
        }
    }

    async fn dataset_items(
        &self,
        token: &str,
        dataset_id: &str,
        limit: u32,
    ) -> Result<Value, UpstreamError> {
        self.record(
            token,
            Call::DatasetItems {
                dataset_id: dataset_id.to_string(),
                limit,
            },
        );
        outcome(&self.dataset, "dataset items")
    }
}
