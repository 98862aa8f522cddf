use std::fmt;
use std::time::Duration;

use harvest_core::{
    pick_best_tool, BlockPos, CollectReport, CollectRequest, FailureKind, HarvestSession,
    MaterialId, Stage, TerminationReason, ToolCandidate,
};
use harvest_logging::{harvest_debug, harvest_info, harvest_warn, SessionTag};
use tokio_util::sync::CancellationToken;

use crate::interact::{harvest_race, travel_race};
use crate::{
    CancelCause, HarvestError, HarvestProgress, HarvestSettings, ProgressSink, RaceOutcome,
    WorldContext,
};

/// Vein-mining harvester: finds, reaches and digs blocks of one material
/// until the requested count is met or nothing reachable is left.
#[derive(Debug, Clone)]
pub struct Harvester {
    settings: HarvestSettings,
}

impl Harvester {
    pub fn new(settings: HarvestSettings) -> Result<Self, HarvestError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }

    /// Collects `request.count` blocks of `request.material`.
    ///
    /// Only an unknown material or a malformed request is an error. Deaths,
    /// timeouts and exhausted searches all end in a report explaining how far
    /// the call got.
    pub async fn collect(
        &self,
        world: &WorldContext,
        request: &CollectRequest,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<CollectReport, HarvestError> {
        if request.count == 0 {
            return Err(HarvestError::InvalidRequest(
                "count must be at least 1".to_string(),
            ));
        }
        let material = world
            .world
            .resolve(&request.material)
            .ok_or_else(|| HarvestError::UnknownMaterial(request.material.clone()))?;
        let material_name = world
            .world
            .material_name(material)
            .unwrap_or_else(|| request.material.clone());

        let tag = SessionTag::next();
        harvest_info!(
            "{tag} collecting {} x{} within {} blocks",
            material_name,
            request.count,
            request.search_radius
        );

        let mut run = CollectRun {
            settings: &self.settings,
            world,
            sink,
            cancel,
            tag,
            session: HarvestSession::new(
                material,
                material_name,
                request.count,
                request.search_radius,
            ),
        };
        let (reason, detail) = run.drive().await;
        let report = run.finish(reason, detail);

        harvest_info!("{tag} finished {}: {}", report.termination_reason, report.message);
        Ok(report)
    }
}

enum Step {
    Continue,
    Skip(FailureKind),
    Stop(TerminationReason, String),
}

struct CollectRun<'a> {
    settings: &'a HarvestSettings,
    world: &'a WorldContext,
    sink: &'a dyn ProgressSink,
    cancel: &'a CancellationToken,
    tag: SessionTag,
    session: HarvestSession,
}

impl CollectRun<'_> {
    async fn drive(&mut self) -> (TerminationReason, Option<String>) {
        loop {
            if self.session.is_satisfied() {
                return (TerminationReason::CompletedFull, None);
            }
            if self.cancel.is_cancelled() {
                let detail = format!("Harvest cancelled: {}.", CancelCause::Aborted);
                return (TerminationReason::Cancelled, Some(detail));
            }

            let Some(candidate) = self.session.next_candidate() else {
                if self.scan() {
                    continue;
                }
                return (TerminationReason::Exhausted, None);
            };

            if self.world.world.material_at(candidate) != Some(self.session.material()) {
                harvest_debug!("{} {candidate} changed since discovery, dropping", self.tag);
                continue;
            }

            match self.approach(candidate).await {
                Step::Continue => {}
                Step::Skip(kind) => {
                    self.skip(candidate, kind);
                    continue;
                }
                Step::Stop(reason, detail) => return (reason, Some(detail)),
            }

            match self.equip(candidate).await {
                Step::Continue => {}
                Step::Skip(kind) => {
                    self.skip(candidate, kind);
                    continue;
                }
                Step::Stop(reason, detail) => return (reason, Some(detail)),
            }

            match self.harvest(candidate).await {
                Step::Continue => {}
                Step::Skip(kind) => {
                    self.skip(candidate, kind);
                    continue;
                }
                Step::Stop(reason, detail) => return (reason, Some(detail)),
            }

            self.progress(Stage::Expanding, Some(candidate));
            let world = self.world;
            let added = self
                .session
                .record_harvest(candidate, |pos| world.world.material_at(pos));
            harvest_debug!(
                "{} harvested {candidate} ({}/{}), {added} new neighbours",
                self.tag,
                self.session.collected(),
                self.session.requested()
            );
        }
    }

    /// Runs a global nearest-match search and seeds the frontier from it.
    fn scan(&mut self) -> bool {
        if self.session.scans() > self.settings.max_rescans {
            harvest_warn!("{} rescan limit of {} reached", self.tag, self.settings.max_rescans);
            return false;
        }
        self.progress(Stage::Searching, None);

        // Visited hits crowd the nearest results, so look that much further.
        let limit = self
            .settings
            .scan_limit
            .saturating_add(self.session.frontier().visited_count());
        let world = self.world;
        let origin = world.world.current_position();
        let hits = world.world.find_nearest(
            self.session.material(),
            origin,
            self.session.search_radius(),
            limit,
        );
        let initial = self.session.scans() == 0;

        match self.session.seed_from_scan(&hits) {
            Some(pos) => {
                harvest_info!(
                    "{} {} {} at {pos}",
                    self.tag,
                    if initial { "found" } else { "rescan found" },
                    self.session.material_name()
                );
                true
            }
            None => {
                harvest_debug!("{} search returned no unvisited {}", self.tag, self.session.material_name());
                false
            }
        }
    }

    async fn approach(&mut self, candidate: BlockPos) -> Step {
        let world = self.world;
        let distance = world
            .world
            .current_position()
            .distance_to(candidate.to_vec3());
        if distance <= self.settings.interaction_range {
            return Step::Continue;
        }

        self.progress(Stage::Traveling, Some(candidate));
        harvest_debug!("{} travelling {distance:.1} blocks to {candidate}", self.tag);

        let race = travel_race(world, self.settings, self.cancel);
        match race.run(world.navigator.travel_to(candidate)).await {
            RaceOutcome::Succeeded(()) => Step::Continue,
            RaceOutcome::Failed(err) => {
                harvest_warn!("{} {candidate} {}: {err}", self.tag, FailureKind::Unreachable);
                Step::Skip(FailureKind::Unreachable)
            }
            RaceOutcome::Cancelled(cause @ CancelCause::Stuck { .. }) => {
                world.navigator.stop();
                harvest_warn!("{} {candidate} {}: {cause}", self.tag, FailureKind::Unreachable);
                Step::Skip(FailureKind::Unreachable)
            }
            RaceOutcome::Cancelled(cause) => {
                world.navigator.stop();
                log_cancel(&self.tag, &cause);
                Step::Stop(
                    TerminationReason::Cancelled,
                    format!(
                        "Harvest cancelled while travelling to {candidate}: {cause}. Please replan your actions."
                    ),
                )
            }
            RaceOutcome::TimedOut => {
                world.navigator.stop();
                Step::Stop(
                    TerminationReason::TimedOut,
                    format!(
                        "Travel to {candidate} timed out after {}.",
                        seconds(self.settings.travel_timeout)
                    ),
                )
            }
        }
    }

    async fn equip(&mut self, candidate: BlockPos) -> Step {
        let world = self.world;
        let equipped = equip_best_tool(
            world,
            self.settings,
            self.session.material(),
            self.cancel,
            &self.tag,
        )
        .await;
        match equipped {
            Ok(_) => Step::Continue,
            Err(cause) => {
                log_cancel(&self.tag, &cause);
                Step::Stop(
                    TerminationReason::Cancelled,
                    format!(
                        "Harvest cancelled while equipping a tool for {candidate}: {cause}. Please replan your actions."
                    ),
                )
            }
        }
    }

    async fn harvest(&mut self, candidate: BlockPos) -> Step {
        self.progress(Stage::Harvesting, Some(candidate));

        let world = self.world;
        let race = harvest_race(world, self.settings, self.cancel);
        match race.run(world.interactor.harvest(candidate)).await {
            RaceOutcome::Succeeded(()) => Step::Continue,
            RaceOutcome::Failed(err) => {
                harvest_warn!("{} {candidate} {}: {err}", self.tag, FailureKind::HarvestFailed);
                Step::Skip(FailureKind::HarvestFailed)
            }
            RaceOutcome::TimedOut => {
                harvest_warn!(
                    "{} digging {candidate} took longer than {}, moving on",
                    self.tag,
                    seconds(self.settings.harvest_timeout)
                );
                Step::Skip(FailureKind::TimedOut)
            }
            RaceOutcome::Cancelled(cause) => {
                log_cancel(&self.tag, &cause);
                Step::Stop(
                    TerminationReason::Cancelled,
                    format!(
                        "Harvest cancelled while digging {candidate}: {cause}. Please replan your actions."
                    ),
                )
            }
        }
    }

    fn skip(&mut self, candidate: BlockPos, kind: FailureKind) {
        harvest_debug!("{} skipping {candidate} ({kind})", self.tag);
        self.session.record_skip(kind);
    }

    fn progress(&mut self, stage: Stage, target: Option<BlockPos>) {
        self.session.set_stage(stage);
        self.sink.emit(HarvestProgress {
            stage,
            collected: self.session.collected(),
            requested: self.session.requested(),
            target,
        });
    }

    fn finish(mut self, reason: TerminationReason, detail: Option<String>) -> CollectReport {
        self.progress(Stage::Done, None);

        let name = self.session.material_name();
        let summary = format!(
            "Collected {}/{} {name}.",
            self.session.collected(),
            self.session.requested()
        );
        let message = match (reason, detail) {
            (_, Some(detail)) => format!("{summary} {detail}"),
            (TerminationReason::Exhausted, None) if self.session.frontier().visited_count() == 0 => {
                format!(
                    "{summary} Could not find any {name} within {} blocks.",
                    self.session.search_radius()
                )
            }
            (TerminationReason::Exhausted, None) => format!("{summary} Could not find more nearby."),
            (_, None) => summary,
        };
        self.session.finish(reason, message)
    }
}

/// Equips the fastest tool for `material`, if any beats bare hands.
///
/// The equip runs in the harvest race. A failure or timeout is only logged and
/// harvesting proceeds with whatever is held; a cancellation is returned.
pub(crate) async fn equip_best_tool(
    world: &WorldContext,
    settings: &HarvestSettings,
    material: MaterialId,
    cancel: &CancellationToken,
    context: &dyn fmt::Display,
) -> Result<Option<ToolCandidate>, CancelCause> {
    let items = world.inventory.list_items();
    let Some(best) = pick_best_tool(&items, |tool| world.inventory.harvest_time(material, tool))
    else {
        return Ok(None);
    };
    let race = harvest_race(world, settings, cancel);
    match race.run(world.interactor.equip(&best.item)).await {
        RaceOutcome::Succeeded(()) => {
            harvest_debug!(
                "{context} equipped {} ({:.1}x faster)",
                best.item.name,
                best.relative_speed
            );
            Ok(Some(best))
        }
        RaceOutcome::Failed(err) => {
            harvest_warn!("{context} could not equip {}: {err}", best.item.name);
            Ok(None)
        }
        RaceOutcome::TimedOut => {
            harvest_warn!(
                "{context} equipping {} took longer than {}",
                best.item.name,
                seconds(settings.harvest_timeout)
            );
            Ok(None)
        }
        RaceOutcome::Cancelled(cause) => Err(cause),
    }
}

fn log_cancel(tag: &SessionTag, cause: &CancelCause) {
    if cause.is_world_event() {
        harvest_warn!("{tag} {}: {cause}", FailureKind::CancelledByWorldEvent);
    } else {
        harvest_info!("{tag} cancelled: {cause}");
    }
}

pub(crate) fn seconds(duration: Duration) -> String {
    format!("{}s", duration.as_secs_f64())
}
