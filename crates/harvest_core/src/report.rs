use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNT: u32 = 1;
pub const DEFAULT_SEARCH_RADIUS: u32 = 64;

/// Arguments of one `collect` call, as received from the tool-dispatch layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectRequest {
    pub material: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_search_radius")]
    pub search_radius: u32,
}

impl CollectRequest {
    pub fn new(material: impl Into<String>, count: u32) -> Self {
        Self {
            material: material.into(),
            count,
            search_radius: DEFAULT_SEARCH_RADIUS,
        }
    }

    pub fn with_search_radius(mut self, search_radius: u32) -> Self {
        self.search_radius = search_radius;
        self
    }
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_search_radius() -> u32 {
    DEFAULT_SEARCH_RADIUS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    CompletedFull,
    Exhausted,
    Cancelled,
    TimedOut,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TerminationReason::CompletedFull => "CompletedFull",
            TerminationReason::Exhausted => "Exhausted",
            TerminationReason::Cancelled => "Cancelled",
            TerminationReason::TimedOut => "TimedOut",
        };
        f.write_str(text)
    }
}

/// Why a single sub-action did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Unreachable,
    HarvestFailed,
    CancelledByWorldEvent,
    TimedOut,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Unreachable => write!(f, "unreachable"),
            FailureKind::HarvestFailed => write!(f, "harvest failed"),
            FailureKind::CancelledByWorldEvent => write!(f, "cancelled by world event"),
            FailureKind::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Skipped candidates broken down by [`FailureKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipCounts {
    pub unreachable: u32,
    pub harvest_failed: u32,
    pub cancelled_by_world_event: u32,
    pub timed_out: u32,
}

impl SkipCounts {
    pub fn record(&mut self, kind: FailureKind) {
        let slot = match kind {
            FailureKind::Unreachable => &mut self.unreachable,
            FailureKind::HarvestFailed => &mut self.harvest_failed,
            FailureKind::CancelledByWorldEvent => &mut self.cancelled_by_world_event,
            FailureKind::TimedOut => &mut self.timed_out,
        };
        *slot += 1;
    }

    pub fn get(&self, kind: FailureKind) -> u32 {
        match kind {
            FailureKind::Unreachable => self.unreachable,
            FailureKind::HarvestFailed => self.harvest_failed,
            FailureKind::CancelledByWorldEvent => self.cancelled_by_world_event,
            FailureKind::TimedOut => self.timed_out,
        }
    }

    pub fn total(&self) -> u32 {
        self.unreachable + self.harvest_failed + self.cancelled_by_world_event + self.timed_out
    }
}

/// Final, always-explained result of a `collect` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectReport {
    pub collected_count: u32,
    pub requested_count: u32,
    pub termination_reason: TerminationReason,
    pub message: String,
    pub material: String,
    pub rescans: u32,
    pub skipped: u32,
    pub skipped_by_kind: SkipCounts,
}

impl CollectReport {
    pub fn is_complete(&self) -> bool {
        self.termination_reason == TerminationReason::CompletedFull
    }
}
