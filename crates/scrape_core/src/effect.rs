use crate::{Generation, SettleStage, Target};

/// Work the driver must perform on behalf of the state machine.
///
/// Every effect carries the generation its result must be tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Stop local waiting for a superseded sequence.
    AbandonSequence { generation: Generation },
    StartCrawl {
        generation: Generation,
        target: Target,
    },
    StartContentExtraction {
        generation: Generation,
        target: Target,
    },
    Settle {
        generation: Generation,
        target: Target,
        after: SettleStage,
    },
    FetchResults {
        generation: Generation,
        target: Target,
    },
}

impl Effect {
    pub fn generation(&self) -> Generation {
        match self {
            Effect::AbandonSequence { generation }
            | Effect::StartCrawl { generation, .. }
            | Effect::StartContentExtraction { generation, .. }
            | Effect::Settle { generation, .. }
            | Effect::FetchResults { generation, .. } => *generation,
        }
    }
}
