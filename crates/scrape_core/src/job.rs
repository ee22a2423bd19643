use std::fmt;

use crate::results::ResultSet;

/// Tag distinguishing successive job sequences; later requests get larger values.
pub type Generation = u64;

/// Domain identifier a job operates on. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("target must not be empty")]
pub struct InvalidTarget;

impl Target {
    /// Trims surrounding whitespace and rejects blank input.
    pub fn parse(raw: &str) -> Result<Self, InvalidTarget> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidTarget);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Target {
    type Err = InvalidTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::parse(s)
    }
}

/// Which fire-and-forget stage a settle delay follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettleStage {
    AfterCrawl,
    AfterContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    CrawlStarted,
    ContentStarted,
    AwaitingSettle(SettleStage),
    FetchingResults,
    Ready,
    ExportPending,
    Failed,
}

impl Phase {
    /// True while the main sequence still has work outstanding.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Phase::CrawlStarted
                | Phase::ContentStarted
                | Phase::AwaitingSettle(_)
                | Phase::FetchingResults
        )
    }

    /// True once the main sequence has finished, successfully or not.
    pub fn is_settled(self) -> bool {
        matches!(self, Phase::Ready | Phase::ExportPending | Phase::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::CrawlStarted => "starting crawl",
            Phase::ContentStarted => "starting content extraction",
            Phase::AwaitingSettle(SettleStage::AfterCrawl) => "waiting for crawl",
            Phase::AwaitingSettle(SettleStage::AfterContent) => "waiting for content extraction",
            Phase::FetchingResults => "fetching results",
            Phase::Ready => "ready",
            Phase::ExportPending => "exporting",
            Phase::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Remote step a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Crawl,
    ContentExtraction,
    FetchResults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Service { status: u16 },
    Normalization,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport error"),
            FailureKind::Service { status } => write!(f, "service error (http {status})"),
            FailureKind::Normalization => write!(f, "unrecognized results"),
        }
    }
}

/// Failure reported by the IO side for one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl StageFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Error recorded on a failed job.
///
/// `message` is stable and safe to show to a user; `detail` keeps the raw
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobError {
    pub stage: JobStage,
    pub kind: FailureKind,
    pub message: String,
    pub detail: String,
}

impl JobError {
    pub fn new(stage: JobStage, failure: StageFailure) -> Self {
        let message = match (&failure.kind, stage) {
            (FailureKind::Normalization, _) => {
                "The scraping service returned results in an unrecognized format."
            }
            (_, JobStage::Crawl) => "Failed to start crawling the website. Please try again.",
            (_, JobStage::ContentExtraction) => {
                "Failed to start content extraction. Please try again."
            }
            (_, JobStage::FetchResults) => "Failed to fetch the scraped results. Please try again.",
        };
        Self {
            stage,
            kind: failure.kind,
            message: message.to_string(),
            detail: failure.detail,
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}: {})", self.message, self.kind, self.detail)
    }
}

/// The unit of work: one target run through the remote stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeJob {
    target: Target,
    generation: Generation,
    phase: Phase,
    results: ResultSet,
    last_error: Option<JobError>,
}

impl ScrapeJob {
    /// A fresh job in [`Phase::Idle`] with no results.
    pub fn new(target: Target, generation: Generation) -> Self {
        Self {
            target,
            generation,
            phase: Phase::Idle,
            results: ResultSet::new(),
            last_error: None,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn last_error(&self) -> Option<&JobError> {
        self.last_error.as_ref()
    }

    pub fn can_export(&self) -> bool {
        can_export(self)
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn complete(&mut self, results: ResultSet) {
        self.results = results;
        self.last_error = None;
        self.phase = Phase::Ready;
    }

    pub(crate) fn fail(&mut self, error: JobError) {
        self.last_error = Some(error);
        self.phase = Phase::Failed;
    }
}

/// A job can be exported once it is ready and found at least one page.
pub fn can_export(job: &ScrapeJob) -> bool {
    job.phase == Phase::Ready && !job.results.is_empty()
}
