use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::AppState;
use super::error::{ApiError, Operation};
use crate::apify::{ActorRecord, RunStatus, display_title};
use crate::auth::ApiToken;
use crate::consts::{ACTOR_PAGE_LIMIT, HEALTH_OK};
use crate::engine::Termination;
use crate::engine::run::{RunEngine, RunOutcome};
use crate::schema::{ActorInfo, fetch_schema};

// --- Response shapes ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub username: Option<String>,
    pub is_public: Option<bool>,
}

impl From<ActorRecord> for ActorSummary {
    fn from(record: ActorRecord) -> Self {
        Self {
            title: display_title(record.title.as_deref(), record.name.as_deref()),
            id: record.id,
            name: record.name,
            description: record.description,
            username: record.username,
            is_public: record.is_public,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActorsResponse {
    pub actors: Vec<ActorSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaResponse {
    pub schema: Value,
    pub actor_info: ActorInfo,
}

#[derive(Debug, Default)]
pub struct RunRequest {
    pub input: Option<Value>,
}

impl RunRequest {
    /// Parse a run request body.
    ///
    /// Only `application/json` bodies are read; anything else, or an empty
    /// body, means "no input". `input` is taken from a top-level object only.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Result<Self, ApiError> {
        if !content_type.is_some_and(is_json) || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| ApiError::BadRequest("Invalid input data"))?;
        let input = match value {
            Value::Object(mut fields) => fields.remove("input"),
            _ => None,
        };
        Ok(Self { input })
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub run_id: Option<String>,
    pub status: Option<RunStatus>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub stats: Option<Value>,
    pub output: Option<Value>,
    pub error_message: Option<String>,
    /// The poll cap ran out while the run was still running upstream.
    pub polling_exhausted: bool,
}

impl From<RunOutcome> for RunResponse {
    fn from(outcome: RunOutcome) -> Self {
        let run = outcome.run;
        Self {
            run_id: run.id,
            status: run.status,
            started_at: run.started_at,
            finished_at: run.finished_at,
            stats: run.stats,
            output: outcome.output.into_items(),
            error_message: run.error_message,
            polling_exhausted: outcome.termination == Termination::Exhausted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

// --- Handlers ---

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_OK,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn list_actors(
    State(st): State<AppState>,
    token: ApiToken,
) -> Result<Json<ActorsResponse>, ApiError> {
    let records = st
        .platform
        .list_actors(token.as_str(), ACTOR_PAGE_LIMIT, 0)
        .await
        .map_err(|e| ApiError::upstream(Operation::ListActors, &e))?;

    let actors = records.into_iter().map(ActorSummary::from).collect();
    Ok(Json(ActorsResponse { actors }))
}

pub async fn actor_schema(
    State(st): State<AppState>,
    Path(actor_id): Path<String>,
    token: ApiToken,
) -> Result<Json<SchemaResponse>, ApiError> {
    let resolved = fetch_schema(st.platform.as_ref(), token.as_str(), &actor_id)
        .await
        .map_err(|e| ApiError::upstream(Operation::FetchSchema, &e))?;

    Ok(Json(SchemaResponse {
        schema: resolved.schema,
        actor_info: resolved.actor,
    }))
}

pub async fn run_actor(
    State(st): State<AppState>,
    Path(actor_id): Path<String>,
    token: ApiToken,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RunResponse>, ApiError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let request = RunRequest::from_body(content_type, &body)?;

    let engine = RunEngine::new(st.platform.as_ref(), &st.run);
    let outcome = engine
        .execute(token.as_str(), &actor_id, request.input)
        .await
        .map_err(|e| ApiError::upstream(Operation::ExecuteRun, &e))?;

    info!(
        actor_id = %actor_id,
        run_id = outcome.run.id.as_deref(),
        status = outcome.run.status.as_ref().map(RunStatus::as_str),
        polls = outcome.polls,
        "run finished"
    );
    Ok(Json(RunResponse::from(outcome)))
}
