use std::collections::HashMap;

use harvest_core::{
    BlockPos, CollectReport, CollectRequest, FailureKind, HarvestSession, MaterialId, SkipCounts,
    Stage, TerminationReason,
};
use pretty_assertions::assert_eq;

const LOG: MaterialId = MaterialId(0);

#[test]
fn scan_seeds_first_unvisited_hit_and_counts_rescans() {
    let mut session = HarvestSession::new(LOG, "oak_log", 3, 32);
    let a = BlockPos::new(0, 0, 0);
    let b = BlockPos::new(4, 0, 0);

    assert_eq!(session.seed_from_scan(&[a, b]), Some(a));
    assert_eq!(session.rescans(), 0);
    assert_eq!(session.next_candidate(), Some(a));

    // `a` is still standing (say its harvest failed); the rescan must move on.
    assert_eq!(session.seed_from_scan(&[a, b]), Some(b));
    assert_eq!(session.seed_from_scan(&[a, b]), None);
    assert_eq!(session.seed_from_scan(&[]), None);
    assert_eq!(session.scans(), 4);
    assert_eq!(session.rescans(), 3);
}

#[test]
fn collected_never_exceeds_requested() {
    let column: HashMap<BlockPos, MaterialId> = (0..10)
        .map(|y| (BlockPos::new(0, y, 0), LOG))
        .collect();
    let mut session = HarvestSession::new(LOG, "oak_log", 2, 16);
    session.seed_from_scan(&[BlockPos::new(0, 5, 0)]);

    while !session.is_satisfied() {
        let pos = session.next_candidate().expect("column is tall enough");
        session.record_harvest(pos, |p| column.get(&p).copied());
        assert!(session.collected() <= session.requested());
    }
    assert_eq!(session.collected(), 2);
    // Discovered but unconsumed positions stay visited.
    assert!(session.frontier().visited_count() > 2);
}

#[test]
fn finish_builds_report() {
    let mut session = HarvestSession::new(LOG, "oak_log", 5, 16);
    session.seed_from_scan(&[BlockPos::new(1, 1, 1)]);
    let pos = session.next_candidate().unwrap();
    session.record_harvest(pos, |_| None);
    session.record_skip(FailureKind::HarvestFailed);
    session.seed_from_scan(&[]);
    assert_eq!(session.stage(), Stage::Searching);

    let report = session.finish(TerminationReason::Exhausted, "done");
    assert_eq!(
        report,
        CollectReport {
            collected_count: 1,
            requested_count: 5,
            termination_reason: TerminationReason::Exhausted,
            message: "done".to_string(),
            material: "oak_log".to_string(),
            rescans: 1,
            skipped: 1,
            skipped_by_kind: SkipCounts {
                harvest_failed: 1,
                ..SkipCounts::default()
            },
        }
    );
}

#[test]
fn skips_are_counted_per_kind() {
    let mut session = HarvestSession::new(LOG, "iron_ore", 4, 16);
    session.record_skip(FailureKind::Unreachable);
    session.record_skip(FailureKind::Unreachable);
    session.record_skip(FailureKind::TimedOut);
    session.seed_from_scan(&[]);
    session.seed_from_scan(&[]);
    session.seed_from_scan(&[]);

    assert_eq!(session.skipped(), 3);
    assert_eq!(session.skipped_by_kind().get(FailureKind::Unreachable), 2);
    assert_eq!(session.skipped_by_kind().get(FailureKind::HarvestFailed), 0);

    let report = session.finish(TerminationReason::Exhausted, "Collected 0/4 iron_ore.");
    assert_eq!(report.rescans, 2);
    assert_eq!(report.material, "iron_ore");
    assert_eq!(report.skipped, 3);
    assert_eq!(
        report.skipped_by_kind,
        SkipCounts {
            unreachable: 2,
            timed_out: 1,
            ..SkipCounts::default()
        }
    );
}

#[test]
fn request_uses_defaults_and_camel_case() {
    let request: CollectRequest = serde_json::from_str(r#"{"material":"iron_ore"}"#).unwrap();
    assert_eq!(request, CollectRequest::new("iron_ore", 1).with_search_radius(64));

    let request: CollectRequest =
        serde_json::from_str(r#"{"material":"oak_log","count":8,"searchRadius":12}"#).unwrap();
    assert_eq!(request.count, 8);
    assert_eq!(request.search_radius, 12);
}

#[test]
fn report_serializes_with_camel_case_fields() {
    let report = HarvestSession::new(LOG, "oak_log", 1, 8)
        .finish(TerminationReason::CompletedFull, "Collected 1/1 oak_log.");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["collectedCount"], 0);
    assert_eq!(json["requestedCount"], 1);
    assert_eq!(json["terminationReason"], "CompletedFull");
    assert_eq!(json["message"], "Collected 1/1 oak_log.");
    assert_eq!(json["skippedByKind"]["cancelledByWorldEvent"], 0);
    assert_eq!(json["skippedByKind"]["harvestFailed"], 0);
}
