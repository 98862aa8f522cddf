use harvest_core::{BlockPos, CollectReport, Stage};

use crate::HarvestError;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestProgress {
    pub stage: Stage,
    pub collected: u32,
    pub requested: u32,
    pub target: Option<BlockPos>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    Progress {
        job_id: JobId,
        progress: HarvestProgress,
    },
    Completed {
        job_id: JobId,
        result: Result<CollectReport, HarvestError>,
    },
}

/// Receives stage changes of a running `collect` call.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: HarvestProgress);
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _progress: HarvestProgress) {}
}
