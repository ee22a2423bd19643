use crate::view_model::JobView;
use crate::{Generation, Phase, ScrapeJob, Target};

/// Everything the state machine owns: at most one live job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrchestratorState {
    job: Option<ScrapeJob>,
    last_generation: Generation,
    dirty: bool,
}

impl OrchestratorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(&self) -> Option<&ScrapeJob> {
        self.job.as_ref()
    }

    /// Generation of the most recent request, 0 before the first one.
    pub fn generation(&self) -> Generation {
        self.last_generation
    }

    pub fn view(&self) -> JobView {
        let phase = self.job.as_ref().map_or(Phase::Idle, ScrapeJob::phase);
        JobView {
            job: self.job.clone(),
            phase,
            busy: phase.is_busy(),
            can_export: self.job.as_ref().is_some_and(ScrapeJob::can_export),
            result_count: self.job.as_ref().map_or(0, |job| job.results().len()),
            error_message: self
                .job
                .as_ref()
                .and_then(ScrapeJob::last_error)
                .map(|err| err.message.clone()),
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Replaces the current job with a fresh idle one under a new generation.
    pub(crate) fn begin_job(&mut self, target: Target) -> Generation {
        self.last_generation += 1;
        self.job = Some(ScrapeJob::new(target, self.last_generation));
        self.dirty = true;
        self.last_generation
    }

    /// The live job, if `generation` still owns it.
    pub(crate) fn live_job_mut(&mut self, generation: Generation) -> Option<&mut ScrapeJob> {
        self.job
            .as_mut()
            .filter(|job| job.generation() == generation)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
