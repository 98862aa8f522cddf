//! Harvest core: pure search state, tool selection and report types.
mod frontier;
mod geometry;
mod material;
mod report;
mod session;
mod tool;

pub use frontier::{DiscoveryClass, Frontier, FrontierEntry};
pub use geometry::{BlockPos, Vec3};
pub use material::{MaterialId, MaterialRegistry};
pub use report::{
    CollectReport, CollectRequest, FailureKind, SkipCounts, TerminationReason, DEFAULT_COUNT,
    DEFAULT_SEARCH_RADIUS,
};
pub use session::{HarvestSession, Stage};
pub use tool::{pick_best_tool, InventoryItem, ToolCandidate};
