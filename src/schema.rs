//! Input-schema resolution for a single actor.
//!
//! The heuristic sources on the actor record are tried in order, first
//! truthy one wins. A schema declared on the first version then replaces
//! whatever the heuristic found, provided that version has a number to fetch
//! it by.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::apify::{ActorDetail, Platform, UpstreamError, display_title, is_truthy};

/// Where the resolved schema comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// Found inline on the actor record.
    Inline(Value),
    /// Must be fetched from `versions/{version}/input-schema`.
    Versioned { version: String },
    /// Nothing usable; the relay answers with `{}`.
    Empty,
}

/// Actor identity shown next to the schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorInfo {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl From<&ActorDetail> for ActorInfo {
    fn from(actor: &ActorDetail) -> Self {
        Self {
            name: actor.name.clone(),
            title: display_title(actor.title.as_deref(), actor.name.as_deref()),
            description: actor.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub schema: Value,
    pub actor: ActorInfo,
}

/// Decide where the schema comes from without doing any I/O.
pub fn resolve_schema(actor: &ActorDetail) -> SchemaSource {
    if let Some(version) = actor.latest_version()
        && version.input_schema.as_ref().is_some_and(is_truthy)
        && let Some(number) = version.version_number.as_deref().filter(|n| !n.is_empty())
    {
        return SchemaSource::Versioned {
            version: number.to_string(),
        };
    }

    let inline = [
        actor
            .default_run_options
            .as_ref()
            .and_then(|o| o.input.as_ref()),
        actor.example_run_input.as_ref(),
        actor.input_schema.as_ref(),
    ];

    inline
        .into_iter()
        .flatten()
        .find(|v| is_truthy(v))
        .map(|v| SchemaSource::Inline(v.clone()))
        .unwrap_or(SchemaSource::Empty)
}

/// Fetch an actor and its input schema.
pub async fn fetch_schema(
    platform: &dyn Platform,
    token: &str,
    actor_id: &str,
) -> Result<ResolvedSchema, UpstreamError> {
    let actor = platform.get_actor(token, actor_id).await?;

    let schema = match resolve_schema(&actor) {
        SchemaSource::Inline(value) => value,
        SchemaSource::Versioned { version } => {
            debug!(actor_id, version = %version, "fetching versioned input schema");
            platform
                .get_version_input_schema(token, actor_id, &version)
                .await?
        }
        SchemaSource::Empty => json!({}),
    };

    Ok(ResolvedSchema {
        schema,
        actor: ActorInfo::from(&actor),
    })
}
