use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::{PollAction, PollState, Termination};
use crate::apify::{Platform, Run, RunStatus, UpstreamError, is_truthy};
use crate::config::RunConfig;

/// Dataset preview attached to a finished run.
#[derive(Debug)]
pub enum DatasetOutput {
    /// The run did not succeed or has no dataset.
    NotRequested,
    Items(Value),
    /// The fetch failed. Does not fail the run.
    Unavailable(UpstreamError),
}

impl DatasetOutput {
    /// Items for the response, dropping the failure detail.
    pub fn into_items(self) -> Option<Value> {
        match self {
            DatasetOutput::Items(items) => Some(items),
            DatasetOutput::NotRequested | DatasetOutput::Unavailable(_) => None,
        }
    }
}

/// Final state of an executed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub run: Run,
    pub polls: u32,
    pub termination: Termination,
    pub output: DatasetOutput,
}

/// Drives one run through submit, bounded polling and dataset preview.
pub struct RunEngine<'a> {
    platform: &'a dyn Platform,
    config: &'a RunConfig,
}

impl<'a> RunEngine<'a> {
    pub fn new(platform: &'a dyn Platform, config: &'a RunConfig) -> Self {
        Self { platform, config }
    }

    /// Execute `actor_id` with `input` on behalf of `token`.
    ///
    /// Any failed upstream call aborts the whole run, except the dataset
    /// fetch, which is recorded in [`RunOutcome::output`].
    pub async fn execute(
        &self,
        token: &str,
        actor_id: &str,
        input: Option<Value>,
    ) -> Result<RunOutcome, UpstreamError> {
        let input = input.filter(is_truthy).unwrap_or_else(|| json!({}));

        let submitted = self
            .platform
            .start_run(token, actor_id, &input, self.config.wait_for_finish_secs)
            .await?;
        info!(
            actor_id,
            run_id = submitted.id.as_deref(),
            status = submitted.status.as_ref().map(RunStatus::as_str),
            "run submitted"
        );

        let (run, polls, termination) = self.await_settled(token, actor_id, submitted).await?;

        if termination == Termination::Exhausted {
            warn!(
                actor_id,
                run_id = run.id.as_deref(),
                polls,
                "poll cap reached while run is still running"
            );
        }

        let output = self.preview_dataset(token, &run).await;

        Ok(RunOutcome {
            run,
            polls,
            termination,
            output,
        })
    }

    async fn await_settled(
        &self,
        token: &str,
        actor_id: &str,
        mut run: Run,
    ) -> Result<(Run, u32, Termination), UpstreamError> {
        // Polls always target the submitted run, whatever later responses say.
        let run_id = run.id.clone();
        let mut state = PollState::Submitted;

        loop {
            let (next, action) = state.advance(run.status.as_ref(), self.config.max_polls);
            state = next;
            match action {
                PollAction::Stop(termination) => return Ok((run, state.polls(), termination)),
                PollAction::Poll => {
                    let run_id = run_id
                        .as_deref()
                        .ok_or(UpstreamError::MissingField("run id"))?;
                    tokio::time::sleep(self.config.poll_interval).await;
                    run = self.platform.get_run(token, actor_id, run_id).await?;
                    debug!(
                        actor_id,
                        run_id,
                        poll = state.polls(),
                        status = run.status.as_ref().map(RunStatus::as_str),
                        "polled run"
                    );
                }
            }
        }
    }

    async fn preview_dataset(&self, token: &str, run: &Run) -> DatasetOutput {
        if !run.is_succeeded() {
            return DatasetOutput::NotRequested;
        }
        let Some(dataset_id) = run.dataset_id() else {
            return DatasetOutput::NotRequested;
        };

        match self
            .platform
            .dataset_items(token, dataset_id, self.config.dataset_preview_limit)
            .await
        {
            Ok(items) => DatasetOutput::Items(items),
            Err(e) => {
                warn!(
                    run_id = run.id.as_deref(),
                    dataset_id,
                    error = %e,
                    "failed to fetch dataset items"
                );
                DatasetOutput::Unavailable(e)
            }
        }
    }
}
