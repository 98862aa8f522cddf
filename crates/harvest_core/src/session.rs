use crate::{
    BlockPos, CollectReport, FailureKind, Frontier, MaterialId, SkipCounts, TerminationReason,
};

/// Phase of a harvest session, reported with progress updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Searching,
    Traveling,
    Harvesting,
    Expanding,
    Done,
}

/// State owned by one `collect` call, discarded when it resolves.
///
/// `collected` never exceeds `requested`, and the frontier never yields the
/// same position twice.
#[derive(Debug)]
pub struct HarvestSession {
    material: MaterialId,
    material_name: String,
    requested: u32,
    collected: u32,
    search_radius: u32,
    frontier: Frontier,
    scans: u32,
    skipped: SkipCounts,
    stage: Stage,
}

impl HarvestSession {
    pub fn new(
        material: MaterialId,
        material_name: impl Into<String>,
        requested: u32,
        search_radius: u32,
    ) -> Self {
        Self {
            material,
            material_name: material_name.into(),
            requested,
            collected: 0,
            search_radius,
            frontier: Frontier::new(),
            scans: 0,
            skipped: SkipCounts::default(),
            stage: Stage::Searching,
        }
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    pub fn requested(&self) -> u32 {
        self.requested
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    pub fn search_radius(&self) -> u32 {
        self.search_radius
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn scans(&self) -> u32 {
        self.scans
    }

    /// Global searches after the initial one.
    pub fn rescans(&self) -> u32 {
        self.scans.saturating_sub(1)
    }

    pub fn skipped(&self) -> u32 {
        self.skipped.total()
    }

    pub fn skipped_by_kind(&self) -> &SkipCounts {
        &self.skipped
    }

    pub fn is_satisfied(&self) -> bool {
        self.collected >= self.requested
    }

    /// Records a global search and seeds the first hit not yet visited.
    ///
    /// `hits` is expected nearest first. Returns the seeded position, or `None`
    /// when every hit was already visited (or there were none).
    pub fn seed_from_scan(&mut self, hits: &[BlockPos]) -> Option<BlockPos> {
        self.scans += 1;
        let fresh = hits
            .iter()
            .copied()
            .find(|pos| !self.frontier.is_visited(*pos))?;
        self.frontier.seed(fresh);
        Some(fresh)
    }

    pub fn next_candidate(&mut self) -> Option<BlockPos> {
        self.frontier.next().map(|entry| entry.pos)
    }

    /// Counts a successful harvest at `pos` and grows the frontier from it.
    /// Returns the number of neighbours enqueued.
    pub fn record_harvest<F>(&mut self, pos: BlockPos, material_at: F) -> usize
    where
        F: FnMut(BlockPos) -> Option<MaterialId>,
    {
        debug_assert!(self.collected < self.requested);
        self.collected = (self.collected + 1).min(self.requested);
        self.frontier.expand_from(pos, self.material, material_at)
    }

    pub fn record_skip(&mut self, kind: FailureKind) {
        self.skipped.record(kind);
    }

    pub fn finish(mut self, reason: TerminationReason, message: impl Into<String>) -> CollectReport {
        self.stage = Stage::Done;
        let rescans = self.rescans();
        CollectReport {
            collected_count: self.collected,
            requested_count: self.requested,
            termination_reason: reason,
            message: message.into(),
            material: self.material_name,
            rescans,
            skipped: self.skipped.total(),
            skipped_by_kind: self.skipped,
        }
    }
}
