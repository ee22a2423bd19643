use scrape_logging::{scrape_debug, scrape_info, scrape_warn};

use crate::normalize::normalize;
use crate::{
    Effect, FailureKind, Generation, JobError, JobStage, Msg, OrchestratorState, Phase,
    RawResults, ScrapeJob, SettleStage, StageFailure,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages tagged with a generation other than the live job's, or arriving
/// in a phase that does not expect them, are dropped without touching state.
pub fn update(mut state: OrchestratorState, msg: Msg) -> (OrchestratorState, Vec<Effect>) {
    let effects = match msg {
        Msg::ScrapeRequested { target } => {
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = state.job() {
                if previous.phase().is_busy() {
                    scrape_info!(
                        "superseding generation={} target={} in phase {}",
                        previous.generation(),
                        previous.target(),
                        previous.phase()
                    );
                    effects.push(Effect::AbandonSequence {
                        generation: previous.generation(),
                    });
                }
            }

            let generation = state.begin_job(target.clone());
            if let Some(job) = state.live_job_mut(generation) {
                job.set_phase(Phase::CrawlStarted);
            }
            scrape_info!("generation={} starting crawl for {}", generation, target);
            effects.push(Effect::StartCrawl { generation, target });
            effects
        }
        Msg::CrawlTriggered {
            generation,
            outcome,
        } => on_trigger_returned(&mut state, generation, JobStage::Crawl, outcome),
        Msg::ContentTriggered {
            generation,
            outcome,
        } => on_trigger_returned(&mut state, generation, JobStage::ContentExtraction, outcome),
        Msg::Settled { generation, after } => on_settled(&mut state, generation, after),
        Msg::ResultsFetched {
            generation,
            outcome,
        } => on_results_fetched(&mut state, generation, outcome),
        Msg::ExportStarted { generation } => {
            let started = match state.live_job_mut(generation) {
                Some(job) if job.can_export() => {
                    job.set_phase(Phase::ExportPending);
                    true
                }
                _ => false,
            };
            if started {
                state.mark_dirty();
            } else {
                scrape_debug!("ignoring export start for generation={}", generation);
            }
            Vec::new()
        }
        Msg::ExportFinished {
            generation,
            succeeded,
        } => {
            let finished = match live_job_in(&mut state, generation, Phase::ExportPending) {
                Some(job) => {
                    job.set_phase(Phase::Ready);
                    true
                }
                None => false,
            };
            if finished {
                state.mark_dirty();
                scrape_info!(
                    "generation={} export {}",
                    generation,
                    if succeeded { "finished" } else { "failed" }
                );
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn on_trigger_returned(
    state: &mut OrchestratorState,
    generation: Generation,
    stage: JobStage,
    outcome: Result<(), StageFailure>,
) -> Vec<Effect> {
    let (expected, settle) = match stage {
        JobStage::Crawl => (Phase::CrawlStarted, SettleStage::AfterCrawl),
        JobStage::ContentExtraction => (Phase::ContentStarted, SettleStage::AfterContent),
        JobStage::FetchResults => return Vec::new(),
    };
    let Some(job) = live_job_in(state, generation, expected) else {
        return Vec::new();
    };

    let effects = match outcome {
        Ok(()) => {
            job.set_phase(Phase::AwaitingSettle(settle));
            vec![Effect::Settle {
                generation,
                target: job.target().clone(),
                after: settle,
            }]
        }
        Err(failure) => {
            let error = JobError::new(stage, failure);
            scrape_warn!("generation={} failed: {}", generation, error);
            job.fail(error);
            Vec::new()
        }
    };
    state.mark_dirty();
    effects
}

fn on_results_fetched(
    state: &mut OrchestratorState,
    generation: Generation,
    outcome: Result<RawResults, StageFailure>,
) -> Vec<Effect> {
    let Some(job) = live_job_in(state, generation, Phase::FetchingResults) else {
        return Vec::new();
    };
    let normalized = outcome.and_then(|raw| {
        normalize(&raw)
            .map_err(|err| StageFailure::new(FailureKind::Normalization, err.to_string()))
    });
    match normalized {
        Ok(results) => {
            scrape_info!(
                "generation={} ready with {} result(s)",
                generation,
                results.len()
            );
            job.complete(results);
        }
        Err(failure) => {
            let error = JobError::new(JobStage::FetchResults, failure);
            scrape_warn!("generation={} failed: {}", generation, error);
            job.fail(error);
        }
    }
    state.mark_dirty();
    Vec::new()
}

fn on_settled(
    state: &mut OrchestratorState,
    generation: Generation,
    after: SettleStage,
) -> Vec<Effect> {
    let Some(job) = live_job_in(state, generation, Phase::AwaitingSettle(after)) else {
        return Vec::new();
    };
    let target = job.target().clone();

    let effect = match after {
        SettleStage::AfterCrawl => {
            job.set_phase(Phase::ContentStarted);
            Effect::StartContentExtraction { generation, target }
        }
        SettleStage::AfterContent => {
            job.set_phase(Phase::FetchingResults);
            Effect::FetchResults { generation, target }
        }
    };
    state.mark_dirty();
    vec![effect]
}

/// The live job for `generation`, provided it is waiting in `expected`.
fn live_job_in(
    state: &mut OrchestratorState,
    generation: Generation,
    expected: Phase,
) -> Option<&mut ScrapeJob> {
    let live = state.generation();
    match state.live_job_mut(generation) {
        Some(job) if job.phase() == expected => Some(job),
        Some(job) => {
            scrape_debug!(
                "generation={} ignoring message for {} while {}",
                generation,
                expected,
                job.phase()
            );
            None
        }
        None => {
            scrape_debug!(
                "discarding stale message from generation={} (live={})",
                generation,
                live
            );
            None
        }
    }
}
