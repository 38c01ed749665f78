use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{ActorDetail, ActorRecord, Platform, Run, UpstreamError};

/// A [`Platform`] backed by the Apify REST API (v2).
///
/// Holds one connection pool for the whole process. The token is supplied
/// per call and sent as a bearer credential.
#[derive(Debug, Clone)]
pub struct ApifyClient {
    http: reqwest::Client,
    base: Url,
}

impl ApifyClient {
    /// Build a client rooted at `base_url`, e.g. `https://api.apify.com/v2`.
    pub fn new(base_url: &str) -> Result<Self, UpstreamError> {
        let base = Url::parse(base_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append path segments (percent-encoded) and query pairs to the base.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, UpstreamError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, UpstreamError> {
        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, url: Url) -> Result<T, UpstreamError> {
        debug!(%url, "GET upstream");
        self.send(self.http.get(url).bearer_auth(token)).await
    }
}

#[async_trait]
impl Platform for ApifyClient {
    async fn list_actors(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ActorRecord>, UpstreamError> {
        let url = self.endpoint(
            &["acts"],
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )?;
        let envelope: Envelope<Page<ActorRecord>> = self.get(token, url).await?;
        Ok(envelope.data.items)
    }

    async fn get_actor(&self, token: &str, actor_id: &str) -> Result<ActorDetail, UpstreamError> {
        let url = self.endpoint(&["acts", actor_id], &[])?;
        let envelope: Envelope<ActorDetail> = self.get(token, url).await?;
        Ok(envelope.data)
    }

    async fn get_version_input_schema(
        &self,
        token: &str,
        actor_id: &str,
        version: &str,
    ) -> Result<Value, UpstreamError> {
        // Not enveloped: the body is the schema document itself
        let url = self.endpoint(&["acts", actor_id, "versions", version, "input-schema"], &[])?;
        self.get(token, url).await
    }

    async fn start_run(
        &self,
        token: &str,
        actor_id: &str,
        input: &Value,
        wait_secs: u64,
    ) -> Result<Run, UpstreamError> {
        let url = self.endpoint(
            &["acts", actor_id, "runs"],
            &[("waitForFinish", wait_secs.to_string())],
        )?;
        debug!(%url, "POST upstream");
        let req = self.http.post(url).bearer_auth(token).json(input);
        let envelope: Envelope<Run> = self.send(req).await?;
        Ok(envelope.data)
    }

    async fn get_run(
        &self,
        token: &str,
        actor_id: &str,
        run_id: &str,
    ) -> Result<Run, UpstreamError> {
        let url = self.endpoint(&["acts", actor_id, "runs", run_id], &[])?;
        let envelope: Envelope<Run> = self.get(token, url).await?;
        Ok(envelope.data)
    }

    async fn dataset_items(
        &self,
        token: &str,
        dataset_id: &str,
        limit: u32,
    ) -> Result<Value, UpstreamError> {
        let url = self.endpoint(
            &["datasets", dataset_id, "items"],
            &[("limit", limit.to_string())],
        )?;
        self.get(token, url).await
    }
}

// --- API types ---

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct Page<T> {
    items: Vec<T>,
}
