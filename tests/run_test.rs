use std::time::Duration;

use serde_json::{Value, json};

use apify_relay::apify::mock::{Call, MockPlatform, Scripted};
use apify_relay::apify::{Run, RunStatus, UpstreamError};
use apify_relay::config::RunConfig;
use apify_relay::engine::Termination;
use apify_relay::engine::run::{DatasetOutput, RunEngine};

const TOKEN: &str = "apify_api_test";

fn run(status: RunStatus, dataset: Option<&str>) -> Run {
    Run {
        id: Some("run-1".to_string()),
        status: Some(status),
        started_at: Some("2025-01-01T00:00:00.000Z".to_string()),
        finished_at: None,
        stats: Some(json!({"runTimeSecs": 12})),
        default_dataset_id: dataset.map(str::to_string),
        error_message: None,
    }
}

/// The paused clock advances in timer ticks, so allow a little slack.
fn assert_elapsed(actual: Duration, expected: Duration) {
    let slack = Duration::from_millis(100);
    assert!(
        actual >= expected && actual <= expected + slack,
        "expected ~{expected:?}, got {actual:?}"
    );
}

fn poll_calls(platform: &MockPlatform) -> usize {
    platform
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::GetRun { .. }))
        .count()
}

fn dataset_calls(platform: &MockPlatform) -> Vec<Call> {
    platform
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::DatasetItems { .. }))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn succeeded_on_submit_skips_polling() {
    let platform = MockPlatform::new()
        .with_start(Ok(run(RunStatus::Succeeded, Some("ds-1"))))
        .with_dataset(Ok(json!([{"n": 1}])));
    let config = RunConfig::default();

    let outcome = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert_eq!(outcome.polls, 0);
    assert_eq!(outcome.termination, Termination::Settled);
    assert_eq!(poll_calls(&platform), 0);
    assert_eq!(
        dataset_calls(&platform),
        vec![Call::DatasetItems {
            dataset_id: "ds-1".to_string(),
            limit: 10
        }]
    );
    assert!(matches!(outcome.output, DatasetOutput::Items(ref v) if v == &json!([{"n": 1}])));
}

#[tokio::test(start_paused = true)]
async fn submit_uses_wait_for_finish_and_empty_input() {
    let platform = MockPlatform::new().with_start(Ok(run(RunStatus::Failed, None)));
    let config = RunConfig::default();

    RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert_eq!(
        platform.calls()[0],
        Call::StartRun {
            actor_id: "a1".to_string(),
            input: json!({}),
            wait_secs: 300,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn falsy_input_becomes_empty_object() {
    let platform = MockPlatform::new().with_start(Ok(run(RunStatus::Failed, None)));
    let config = RunConfig::default();

    RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", Some(Value::Null))
        .await
        .unwrap();

    assert!(matches!(
        &platform.calls()[0],
        Call::StartRun { input, .. } if input == &json!({})
    ));
}

#[tokio::test(start_paused = true)]
async fn caller_input_is_forwarded() {
    let platform = MockPlatform::new().with_start(Ok(run(RunStatus::Failed, None)));
    let config = RunConfig::default();
    let input = json!({"startUrls": [{"url": "https://example.com"}]});

    RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", Some(input.clone()))
        .await
        .unwrap();

    assert!(matches!(
        &platform.calls()[0],
        Call::StartRun { input: sent, .. } if sent == &input
    ));
}

#[tokio::test(start_paused = true)]
async fn polls_until_run_leaves_running() {
    let platform = MockPlatform::new()
        .with_start(Ok(run(RunStatus::Running, Some("ds-1"))))
        .with_polls(vec![
            Ok(run(RunStatus::Running, Some("ds-1"))),
            Ok(run(RunStatus::Running, Some("ds-1"))),
            Ok(run(RunStatus::Succeeded, Some("ds-1"))),
            // Must never be consumed
            Ok(run(RunStatus::Failed, Some("ds-1"))),
        ])
        .with_dataset(Ok(json!([])));
    let config = RunConfig::default();

    let outcome = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert_eq!(outcome.polls, 3);
    assert_eq!(outcome.run.status, Some(RunStatus::Succeeded));
    assert_eq!(poll_calls(&platform), 3);
    assert_eq!(dataset_calls(&platform).len(), 1);

    let recorded = platform.recorded();
    let submitted_at = recorded[0].at;
    let poll_times: Vec<_> = recorded
        .iter()
        .filter(|r| matches!(r.call, Call::GetRun { .. }))
        .map(|r| r.at)
        .collect();

    let mut previous = submitted_at;
    for at in poll_times {
        assert_elapsed(at - previous, Duration::from_secs(5));
        previous = at;
    }
}

#[tokio::test(start_paused = true)]
async fn polls_target_the_submitted_run() {
    let platform = MockPlatform::new()
        .with_start(Ok(run(RunStatus::Running, None)))
        .with_polls(vec![Ok(run(RunStatus::Aborted, None))]);
    let config = RunConfig::default();

    RunEngine::new(&platform, &config)
        .execute(TOKEN, "alice~scraper", None)
        .await
        .unwrap();

    assert_eq!(
        platform.calls()[1],
        Call::GetRun {
            actor_id: "alice~scraper".to_string(),
            run_id: "run-1".to_string(),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn poll_cap_returns_last_running_status() {
    let mut polls: Vec<Scripted<Run>> = (0..60)
        .map(|_| Ok(run(RunStatus::Running, Some("ds-1"))))
        .collect();
    polls.push(Ok(run(RunStatus::Succeeded, Some("ds-1"))));

    let platform = MockPlatform::new()
        .with_start(Ok(run(RunStatus::Running, Some("ds-1"))))
        .with_polls(polls);
    let config = RunConfig::default();

    let start = tokio::time::Instant::now();
    let outcome = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert_eq!(outcome.polls, 60);
    assert_eq!(outcome.termination, Termination::Exhausted);
    assert_eq!(outcome.run.status, Some(RunStatus::Running));
    assert_eq!(poll_calls(&platform), 60);
    assert!(dataset_calls(&platform).is_empty());
    assert!(matches!(outcome.output, DatasetOutput::NotRequested));
    assert_elapsed(start.elapsed(), Duration::from_secs(300));
}

#[tokio::test(start_paused = true)]
async fn custom_poll_settings_are_honoured() {
    let platform = MockPlatform::new()
        .with_start(Ok(run(RunStatus::Running, None)))
        .with_polls(vec![
            Ok(run(RunStatus::Running, None)),
            Ok(run(RunStatus::Running, None)),
        ]);
    let config = RunConfig {
        wait_for_finish_secs: 30,
        poll_interval: Duration::from_secs(1),
        max_polls: 2,
        dataset_preview_limit: 10,
    };

    let start = tokio::time::Instant::now();
    let outcome = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert_eq!(outcome.termination, Termination::Exhausted);
    assert_elapsed(start.elapsed(), Duration::from_secs(2));
    assert!(matches!(platform.calls()[0], Call::StartRun { wait_secs: 30, .. }));
}

#[tokio::test(start_paused = true)]
async fn dataset_failure_is_not_a_run_failure() {
    let platform = MockPlatform::new()
        .with_start(Ok(run(RunStatus::Succeeded, Some("ds-1"))))
        .with_dataset(Err(500));
    let config = RunConfig::default();

    let outcome = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert_eq!(outcome.run.id.as_deref(), Some("run-1"));
    assert_eq!(outcome.run.status, Some(RunStatus::Succeeded));
    assert_eq!(outcome.run.stats, Some(json!({"runTimeSecs": 12})));
    match outcome.output {
        DatasetOutput::Unavailable(e) => assert_eq!(e.status(), Some(500)),
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn non_succeeded_run_skips_dataset() {
    let platform = MockPlatform::new().with_start(Ok(run(RunStatus::Failed, Some("ds-1"))));
    let config = RunConfig::default();

    let outcome = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert!(dataset_calls(&platform).is_empty());
    assert!(matches!(outcome.output, DatasetOutput::NotRequested));
}

#[tokio::test(start_paused = true)]
async fn succeeded_without_dataset_skips_fetch() {
    let platform = MockPlatform::new().with_start(Ok(run(RunStatus::Succeeded, None)));
    let config = RunConfig::default();

    let outcome = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert!(dataset_calls(&platform).is_empty());
    assert!(outcome.output.into_items().is_none());
}

#[tokio::test(start_paused = true)]
async fn submit_failure_aborts() {
    let platform = MockPlatform::new().with_start(Err(401));
    let config = RunConfig::default();

    let err = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(platform.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn poll_failure_aborts_without_retry() {
    let platform = MockPlatform::new()
        .with_start(Ok(run(RunStatus::Running, Some("ds-1"))))
        .with_polls(vec![Err(502), Ok(run(RunStatus::Succeeded, Some("ds-1")))]);
    let config = RunConfig::default();

    let err = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(poll_calls(&platform), 1);
    assert!(dataset_calls(&platform).is_empty());
}

#[tokio::test(start_paused = true)]
async fn token_is_sent_on_every_call() {
    let platform = MockPlatform::new()
        .with_start(Ok(run(RunStatus::Running, Some("ds-1"))))
        .with_polls(vec![Ok(run(RunStatus::Succeeded, Some("ds-1")))])
        .with_dataset(Ok(json!([])));
    let config = RunConfig::default();

    RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    let recorded = platform.recorded();
    assert_eq!(recorded.len(), 3);
    assert!(recorded.iter().all(|r| r.token == TOKEN));
}

#[tokio::test(start_paused = true)]
async fn missing_status_is_returned_without_polling() {
    let platform = MockPlatform::new().with_start(Ok(Run {
        status: None,
        ..run(RunStatus::Running, Some("ds-1"))
    }));
    let config = RunConfig::default();

    let outcome = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert!(outcome.run.status.is_none());
    assert_eq!(outcome.termination, Termination::Settled);
    assert_eq!(poll_calls(&platform), 0);
    assert!(dataset_calls(&platform).is_empty());
}

#[tokio::test(start_paused = true)]
async fn running_without_id_cannot_be_polled() {
    let platform = MockPlatform::new().with_start(Ok(Run {
        id: None,
        ..run(RunStatus::Running, None)
    }));
    let config = RunConfig::default();

    let err = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::MissingField(_)));
    assert_eq!(poll_calls(&platform), 0);
}

#[tokio::test(start_paused = true)]
async fn polled_run_without_status_stops_polling() {
    let platform = MockPlatform::new()
        .with_start(Ok(run(RunStatus::Running, Some("ds-1"))))
        .with_polls(vec![Ok(Run {
            id: None,
            status: None,
            ..run(RunStatus::Running, Some("ds-1"))
        })]);
    let config = RunConfig::default();

    let outcome = RunEngine::new(&platform, &config)
        .execute(TOKEN, "a1", None)
        .await
        .unwrap();

    assert_eq!(outcome.polls, 1);
    assert!(outcome.run.id.is_none());
    assert!(outcome.run.status.is_none());
    assert!(matches!(outcome.output, DatasetOutput::NotRequested));
}
