use std::sync::Once;

use pretty_assertions::assert_eq;
use scrape_core::{
    update, Effect, FailureKind, JobStage, Msg, OrchestratorState, Phase, RawResults,
    SettleStage, StageFailure, Target,
};
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scrape_logging::initialize_for_tests);
}

fn target(raw: &str) -> Target {
    Target::parse(raw).expect("valid target")
}

fn request(state: OrchestratorState, raw: &str) -> (OrchestratorState, Vec<Effect>) {
    update(
        state,
        Msg::ScrapeRequested {
            target: target(raw),
        },
    )
}

#[test]
fn request_starts_crawl_with_fresh_generation() {
    init_logging();
    let (mut state, effects) = request(OrchestratorState::new(), "example.com");

    assert_eq!(
        effects,
        vec![Effect::StartCrawl {
            generation: 1,
            target: target("example.com"),
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::CrawlStarted);
    assert!(view.busy);
    assert_eq!(view.target(), Some("example.com"));
    assert_eq!(view.result_count, 0);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn full_sequence_walks_every_stage_in_order() {
    init_logging();
    let (state, _) = request(OrchestratorState::new(), "example.com");

    let (state, effects) = update(
        state,
        Msg::CrawlTriggered {
            generation: 1,
            outcome: Ok(()),
        },
    );
    assert_eq!(state.view().phase, Phase::AwaitingSettle(SettleStage::AfterCrawl));
    assert_eq!(
        effects,
        vec![Effect::Settle {
            generation: 1,
            target: target("example.com"),
            after: SettleStage::AfterCrawl,
        }]
    );

    let (state, effects) = update(
        state,
        Msg::Settled {
            generation: 1,
            after: SettleStage::AfterCrawl,
        },
    );
    assert_eq!(state.view().phase, Phase::ContentStarted);
    assert_eq!(
        effects,
        vec![Effect::StartContentExtraction {
            generation: 1,
            target: target("example.com"),
        }]
    );

    let (state, effects) = update(
        state,
        Msg::ContentTriggered {
            generation: 1,
            outcome: Ok(()),
        },
    );
    assert_eq!(
        state.view().phase,
        Phase::AwaitingSettle(SettleStage::AfterContent)
    );
    assert_eq!(
        effects,
        vec![Effect::Settle {
            generation: 1,
            target: target("example.com"),
            after: SettleStage::AfterContent,
        }]
    );

    let (state, effects) = update(
        state,
        Msg::Settled {
            generation: 1,
            after: SettleStage::AfterContent,
        },
    );
    assert_eq!(state.view().phase, Phase::FetchingResults);
    assert_eq!(
        effects,
        vec![Effect::FetchResults {
            generation: 1,
            target: target("example.com"),
        }]
    );

    let payload = json!({
        "https://example.com/a": { "status": "ok", "meta_title": "A" }
    });
    let (state, effects) = update(
        state,
        Msg::ResultsFetched {
            generation: 1,
            outcome: Ok(RawResults::from_value(payload)),
        },
    );
    assert!(effects.is_empty());

    let view = state.view();
    assert_eq!(view.phase, Phase::Ready);
    assert!(!view.busy);
    assert!(view.can_export);
    let job = view.job.expect("job");
    assert_eq!(job.results().len(), 1);
    let record = job.results().get("https://example.com/a").expect("record");
    assert_eq!(record.status, "ok");
    assert_eq!(record.meta_title.as_deref(), Some("A"));
    assert!(job.last_error().is_none());
}

#[test]
fn crawl_failure_fails_job_without_further_effects() {
    init_logging();
    let (state, _) = request(OrchestratorState::new(), "example.com");

    let (mut state, effects) = update(
        state,
        Msg::CrawlTriggered {
            generation: 1,
            outcome: Err(StageFailure::new(
                FailureKind::Service { status: 500 },
                "internal error",
            )),
        },
    );

    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    let view = state.view();
    assert_eq!(view.phase, Phase::Failed);
    assert_eq!(view.result_count, 0);
    assert!(!view.can_export);
    assert_eq!(
        view.error_message.as_deref(),
        Some("Failed to start crawling the website. Please try again.")
    );
    let job = view.job.expect("job");
    let error = job.last_error().expect("error");
    assert_eq!(error.stage, JobStage::Crawl);
    assert_eq!(error.kind, FailureKind::Service { status: 500 });
    assert_eq!(error.detail, "internal error");
}

#[test]
fn content_failure_fails_job() {
    init_logging();
    let (state, _) = request(OrchestratorState::new(), "example.com");
    let (state, _) = update(
        state,
        Msg::CrawlTriggered {
            generation: 1,
            outcome: Ok(()),
        },
    );
    let (state, _) = update(
        state,
        Msg::Settled {
            generation: 1,
            after: SettleStage::AfterCrawl,
        },
    );
    let (state, effects) = update(
        state,
        Msg::ContentTriggered {
            generation: 1,
            outcome: Err(StageFailure::new(FailureKind::Transport, "connection refused")),
        },
    );

    assert!(effects.is_empty());
    let job = state.job().expect("job");
    assert_eq!(job.phase(), Phase::Failed);
    assert_eq!(
        job.last_error().map(|err| err.stage),
        Some(JobStage::ContentExtraction)
    );
}

#[test]
fn unrecognized_results_payload_fails_job() {
    init_logging();
    let (state, _) = request(OrchestratorState::new(), "example.com");
    let (state, _) = update(
        state,
        Msg::CrawlTriggered {
            generation: 1,
            outcome: Ok(()),
        },
    );
    let (state, _) = update(
        state,
        Msg::Settled {
            generation: 1,
            after: SettleStage::AfterCrawl,
        },
    );
    let (state, _) = update(
        state,
        Msg::ContentTriggered {
            generation: 1,
            outcome: Ok(()),
        },
    );
    let (state, _) = update(
        state,
        Msg::Settled {
            generation: 1,
            after: SettleStage::AfterContent,
        },
    );
    let (state, _) = update(
        state,
        Msg::ResultsFetched {
            generation: 1,
            outcome: Ok(RawResults::from_value(json!("not a collection"))),
        },
    );

    let job = state.job().expect("job");
    assert_eq!(job.phase(), Phase::Failed);
    let error = job.last_error().expect("error");
    assert_eq!(error.kind, FailureKind::Normalization);
    assert_eq!(error.stage, JobStage::FetchResults);
    assert!(job.results().is_empty());
}

#[test]
fn messages_out_of_phase_are_ignored() {
    init_logging();
    let (mut state, _) = request(OrchestratorState::new(), "example.com");
    assert!(state.consume_dirty());

    // Settle before the crawl trigger returned.
    let (mut state, effects) = update(
        state,
        Msg::Settled {
            generation: 1,
            after: SettleStage::AfterCrawl,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().phase, Phase::CrawlStarted);
    assert!(!state.consume_dirty());

    // Content trigger result while still crawling.
    let (mut state, effects) = update(
        state,
        Msg::ContentTriggered {
            generation: 1,
            outcome: Ok(()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().phase, Phase::CrawlStarted);
    assert!(!state.consume_dirty());
}

#[test]
fn failed_job_recovers_only_through_new_request() {
    init_logging();
    let (state, _) = request(OrchestratorState::new(), "example.com");
    let (state, _) = update(
        state,
        Msg::CrawlTriggered {
            generation: 1,
            outcome: Err(StageFailure::new(FailureKind::Transport, "timeout")),
        },
    );
    assert_eq!(state.view().phase, Phase::Failed);

    let (state, effects) = request(state, "example.com");
    assert_eq!(
        effects,
        vec![Effect::StartCrawl {
            generation: 2,
            target: target("example.com"),
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::CrawlStarted);
    assert!(view.error_message.is_none());
}
