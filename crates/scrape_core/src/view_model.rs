use crate::{Phase, ScrapeJob};

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobView {
    pub job: Option<ScrapeJob>,
    pub phase: Phase,
    pub busy: bool,
    pub can_export: bool,
    pub result_count: usize,
    pub error_message: Option<String>,
}

impl JobView {
    pub fn target(&self) -> Option<&str> {
        self.job.as_ref().map(|job| job.target().as_str())
    }
}
