//! Scrape core: pure job state machine, result normalization and view model.
mod effect;
mod job;
mod msg;
mod normalize;
mod results;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use job::{
    can_export, FailureKind, Generation, InvalidTarget, JobError, JobStage, Phase, ScrapeJob,
    SettleStage, StageFailure, Target,
};
pub use msg::Msg;
pub use normalize::{normalize, NormalizationError, RawResults};
pub use results::{PageRecord, ResultSet, UNKNOWN_STATUS};
pub use state::OrchestratorState;
pub use update::update;
pub use view_model::JobView;
