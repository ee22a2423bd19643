use crate::{Generation, RawResults, SettleStage, StageFailure, Target};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked for a new job. Supersedes whatever is running.
    ScrapeRequested { target: Target },
    /// The start-crawl call returned.
    CrawlTriggered {
        generation: Generation,
        outcome: Result<(), StageFailure>,
    },
    /// The start-content-extraction call returned.
    ContentTriggered {
        generation: Generation,
        outcome: Result<(), StageFailure>,
    },
    /// A settle delay elapsed.
    Settled {
        generation: Generation,
        after: SettleStage,
    },
    /// The fetch-results call returned with a raw, un-normalized payload.
    ResultsFetched {
        generation: Generation,
        outcome: Result<RawResults, StageFailure>,
    },
    /// Export fetch began for a ready job.
    ExportStarted { generation: Generation },
    /// Export fetch finished; the job's results stay valid either way.
    ExportFinished {
        generation: Generation,
        succeeded: bool,
    },
    /// Changes nothing. The driver's answer to an effect that has no
    /// completion to report.
    NoOp,
}
