use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use scrape_core::{
    update, Effect, Generation, InvalidTarget, JobView, Msg, OrchestratorState, Phase, Target,
};
use scrape_logging::{scrape_debug, scrape_info};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::export::{export_results, ExportError};
use crate::{ExportArtifact, ScrapeApi, SettleAwaiter};

/// Drives one job at a time through the remote stages.
///
/// State transitions happen in [`scrape_core::update`]; this type executes
/// the resulting effects and publishes a [`JobView`] after every change.
/// Must be used from within a tokio runtime.
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn ScrapeApi>,
    awaiter: Arc<dyn SettleAwaiter>,
    state: Mutex<OrchestratorState>,
    view_tx: watch::Sender<JobView>,
    sequence: Mutex<Option<Sequence>>,
}

/// Handle on the running effect loop of one generation.
struct Sequence {
    generation: Generation,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn ScrapeApi>, awaiter: Arc<dyn SettleAwaiter>) -> Self {
        let state = OrchestratorState::new();
        let (view_tx, _) = watch::channel(state.view());
        Self {
            inner: Arc::new(Inner {
                api,
                awaiter,
                state: Mutex::new(state),
                view_tx,
                sequence: Mutex::new(None),
            }),
        }
    }

    /// Receiver that is notified whenever the job view changes.
    pub fn subscribe(&self) -> watch::Receiver<JobView> {
        self.inner.view_tx.subscribe()
    }

    pub fn snapshot(&self) -> JobView {
        lock(&self.inner.state).view()
    }

    /// Starts a new job for `target`, superseding any job in progress.
    ///
    /// Blank targets are rejected before any state changes.
    pub fn request_scrape(&self, target: &str) -> Result<Generation, InvalidTarget> {
        let target = Target::parse(target)?;

        // Held across dispatch so concurrent requests spawn in generation order.
        let mut sequence = lock(&self.inner.sequence);
        let effects = self.inner.dispatch(Msg::ScrapeRequested { target });
        let mut generation = self.inner.current_generation();

        for effect in effects {
            match effect {
                Effect::AbandonSequence { generation: stale } => {
                    scrape_debug!("abandoning generation={}", stale);
                    if let Some(previous) = sequence.take() {
                        previous.abandon();
                    }
                }
                first => {
                    if let Some(previous) = sequence.take() {
                        previous.abandon();
                    }
                    generation = first.generation();
                    let cancel = CancellationToken::new();
                    tokio::spawn(run_sequence(self.inner.clone(), first, cancel.clone()));
                    *sequence = Some(Sequence { generation, cancel });
                }
            }
        }
        Ok(generation)
    }

    /// Resolves once the live job is ready or failed, returning its view.
    ///
    /// Returns immediately when no job was ever requested.
    pub async fn wait_until_settled(&self) -> JobView {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|view| view.job.is_none() || view.phase.is_settled())
            .await
            .map(|view| view.clone());
        match settled {
            Ok(view) => view,
            Err(_) => self.snapshot(),
        }
    }

    /// Exports the current job's results through the export gate.
    ///
    /// The job sits in [`Phase::ExportPending`] while the fetch runs and goes
    /// back to [`Phase::Ready`] afterwards, whatever the outcome.
    pub async fn export_results(&self) -> Result<ExportArtifact, ExportError> {
        let job = {
            let mut state = lock(&self.inner.state);
            let job = match state.job() {
                Some(job) if job.can_export() => job.clone(),
                Some(job) => return Err(ExportError::NotReady { phase: job.phase() }),
                None => return Err(ExportError::NotReady { phase: Phase::Idle }),
            };
            self.inner.apply(
                &mut state,
                Msg::ExportStarted {
                    generation: job.generation(),
                },
            );
            job
        };

        let result = export_results(self.inner.api.as_ref(), &job).await;
        self.inner.dispatch(Msg::ExportFinished {
            generation: job.generation(),
            succeeded: result.is_ok(),
        });
        result
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if let Some(sequence) = lock(&self.inner.sequence).take() {
            sequence.abandon();
        }
    }
}

impl Sequence {
    fn abandon(self) {
        scrape_debug!("cancelling local waits of generation={}", self.generation);
        self.cancel.cancel();
    }
}

impl Inner {
    fn current_generation(&self) -> Generation {
        lock(&self.state).generation()
    }

    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let mut state = lock(&self.state);
        self.apply(&mut state, msg)
    }

    fn apply(&self, state: &mut OrchestratorState, msg: Msg) -> Vec<Effect> {
        let (mut next, effects) = update(std::mem::take(state), msg);
        if next.consume_dirty() {
            self.view_tx.send_replace(next.view());
        }
        *state = next;
        effects
    }

    async fn execute(&self, effect: Effect) -> Msg {
        match effect {
            Effect::StartCrawl { generation, target } => {
                scrape_info!("generation={} POST start crawl for {}", generation, target);
                let outcome = self.api.start_crawl(&target).await;
                Msg::CrawlTriggered {
                    generation,
                    outcome: outcome.map_err(|err| err.to_stage_failure()),
                }
            }
            Effect::StartContentExtraction { generation, target } => {
                scrape_info!(
                    "generation={} POST start content extraction for {}",
                    generation,
                    target
                );
                let outcome = self.api.start_content_extraction(&target).await;
                Msg::ContentTriggered {
                    generation,
                    outcome: outcome.map_err(|err| err.to_stage_failure()),
                }
            }
            Effect::Settle {
                generation,
                target,
                after,
            } => {
                self.awaiter.settle(&target, after).await;
                Msg::Settled { generation, after }
            }
            Effect::FetchResults { generation, target } => {
                scrape_info!("generation={} GET results for {}", generation, target);
                let outcome = self.api.fetch_results(&target).await;
                Msg::ResultsFetched {
                    generation,
                    outcome: outcome.map_err(|err| err.to_stage_failure()),
                }
            }
            // Handled in `request_scrape`; never queued in a sequence.
            Effect::AbandonSequence { .. } => Msg::NoOp,
        }
    }
}

async fn run_sequence(inner: Arc<Inner>, first: Effect, cancel: CancellationToken) {
    let generation = first.generation();
    let mut pending = VecDeque::from([first]);

    while let Some(effect) = pending.pop_front() {
        let msg = tokio::select! {
            _ = cancel.cancelled() => {
                scrape_debug!("generation={} stopped waiting", generation);
                return;
            }
            msg = inner.execute(effect) => msg,
        };
        pending.extend(inner.dispatch(msg));
    }
    scrape_debug!("generation={} sequence finished", generation);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
