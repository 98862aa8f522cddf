//! Single-shot interactions built on the same race as the harvest loop.

use std::time::Duration;

use harvest_core::BlockPos;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::harvest::{equip_best_tool, seconds};
use crate::{
    ActionError, ActionRace, CancelCause, CancelSignal, EventKind, HarvestSettings, RaceOutcome,
    StuckWatchdog, WorldContext, WorldEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionStatus {
    Completed,
    Failed,
    Cancelled,
    TimedOut,
}

/// Outcome of one interaction, phrased for whoever issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub status: ActionStatus,
    pub message: String,
}

impl ActionReport {
    fn new(status: ActionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ActionStatus::Completed
    }
}

/// Travel race: death, caller cancellation and, when enabled, stuck detection.
pub(crate) fn travel_race<'a>(
    world: &'a WorldContext,
    settings: &HarvestSettings,
    cancel: &CancellationToken,
) -> ActionRace<'a> {
    let race = ActionRace::new("travel", world.events.as_ref(), settings.travel_timeout)
        .cancel_on(CancelSignal::WorldEvent(EventKind::Death))
        .cancel_on(CancelSignal::Token(cancel.clone()));
    match &settings.stuck_detection {
        Some(detection) => race.cancel_on(CancelSignal::Stuck(StuckWatchdog::new(
            world.world.clone(),
            detection.clone(),
        ))),
        None => race,
    }
}

pub(crate) fn harvest_race<'a>(
    world: &'a WorldContext,
    settings: &HarvestSettings,
    cancel: &CancellationToken,
) -> ActionRace<'a> {
    ActionRace::new("harvest", world.events.as_ref(), settings.harvest_timeout)
        .cancel_on(CancelSignal::WorldEvent(EventKind::Death))
        .cancel_on(CancelSignal::Token(cancel.clone()))
}

/// Digs the single block at `pos` with the best available tool.
pub async fn dig_block(
    world: &WorldContext,
    settings: &HarvestSettings,
    pos: BlockPos,
    cancel: &CancellationToken,
) -> ActionReport {
    let Some(material) = world.world.material_at(pos) else {
        return ActionReport::new(ActionStatus::Completed, format!("No block found at {pos}."));
    };
    let name = world
        .world
        .material_name(material)
        .unwrap_or_else(|| material.to_string());

    let distance = world.world.current_position().distance_to(pos.to_vec3());
    if distance > settings.interaction_range {
        return ActionReport::new(
            ActionStatus::Failed,
            format!(
                "Target block is too far ({distance:.1} blocks away). Move within {:.1} blocks before digging.",
                settings.interaction_range
            ),
        );
    }

    if let Err(cause) = equip_best_tool(world, settings, material, cancel, &"dig").await {
        return ActionReport::new(
            ActionStatus::Cancelled,
            format!("Digging {name} at {pos} was cancelled: {cause}. Please replan your actions."),
        );
    }

    let race = harvest_race(world, settings, cancel);
    match race.run(world.interactor.harvest(pos)).await {
        RaceOutcome::Succeeded(()) => {
            ActionReport::new(ActionStatus::Completed, format!("Successfully dug {name} at {pos}."))
        }
        RaceOutcome::Failed(err) => ActionReport::new(
            ActionStatus::Failed,
            format!("Failed to dig {name} at {pos}: {err}."),
        ),
        RaceOutcome::Cancelled(cause) => ActionReport::new(
            ActionStatus::Cancelled,
            format!("Digging {name} at {pos} was cancelled: {cause}. Please replan your actions."),
        ),
        RaceOutcome::TimedOut => ActionReport::new(
            ActionStatus::TimedOut,
            format!(
                "Digging {name} at {pos} did not finish within {}. Check the block before retrying.",
                seconds(settings.harvest_timeout)
            ),
        ),
    }
}

/// Moves to `pos`. The navigator is stopped on every exit except arrival.
pub async fn travel_to(
    world: &WorldContext,
    settings: &HarvestSettings,
    pos: BlockPos,
    cancel: &CancellationToken,
) -> ActionReport {
    let race = travel_race(world, settings, cancel);
    let outcome = race.run(world.navigator.travel_to(pos)).await;
    if !matches!(outcome, RaceOutcome::Succeeded(())) {
        world.navigator.stop();
    }

    match outcome {
        RaceOutcome::Succeeded(()) => {
            ActionReport::new(ActionStatus::Completed, format!("Successfully moved to {pos}."))
        }
        RaceOutcome::Failed(err) => {
            ActionReport::new(ActionStatus::Failed, format!("Could not reach {pos}: {err}."))
        }
        RaceOutcome::Cancelled(cause @ CancelCause::Stuck { .. }) => ActionReport::new(
            ActionStatus::Cancelled,
            format!("Movement to {pos} stopped: {cause}. Try clearing the way or moving sideways."),
        ),
        RaceOutcome::Cancelled(cause) => ActionReport::new(
            ActionStatus::Cancelled,
            format!("Movement to {pos} cancelled: {cause}. Destination not reached."),
        ),
        RaceOutcome::TimedOut => ActionReport::new(
            ActionStatus::TimedOut,
            format!(
                "Movement timed out after {}. The destination might be too far or complex to reach.",
                seconds(settings.travel_timeout)
            ),
        ),
    }
}

/// Which chat lines `wait_for_chat` accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatFilter {
    /// Case-insensitive substring the message must contain.
    pub trigger: Option<String>,
    /// Sender whose lines are ignored, usually the bot itself.
    pub ignore_sender: Option<String>,
}

impl ChatFilter {
    pub fn matches(&self, sender: &str, message: &str) -> bool {
        if self.ignore_sender.as_deref() == Some(sender) {
            return false;
        }
        match &self.trigger {
            Some(trigger) => message.to_lowercase().contains(&trigger.to_lowercase()),
            None => true,
        }
    }
}

/// Waits for the first chat line accepted by `filter`.
pub async fn wait_for_chat(
    world: &WorldContext,
    filter: &ChatFilter,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ActionReport {
    let mut chat = world.events.subscribe(EventKind::Chat);
    let listen = async move {
        while let Some(event) = chat.recv().await {
            if let WorldEvent::Chat { sender, message } = event {
                if filter.matches(&sender, &message) {
                    return Ok((sender, message));
                }
            }
        }
        Err(ActionError::new("the chat feed closed"))
    };

    let race = ActionRace::new("chat", world.events.as_ref(), timeout)
        .cancel_on(CancelSignal::WorldEvent(EventKind::Death))
        .cancel_on(CancelSignal::Token(cancel.clone()));
    match race.run(listen).await {
        RaceOutcome::Succeeded((sender, message)) => ActionReport::new(
            ActionStatus::Completed,
            format!("New message received from {sender}: \"{message}\""),
        ),
        RaceOutcome::Failed(err) => {
            ActionReport::new(ActionStatus::Failed, format!("Stopped listening: {err}."))
        }
        RaceOutcome::Cancelled(cause) => {
            ActionReport::new(ActionStatus::Cancelled, format!("Stopped listening: {cause}."))
        }
        RaceOutcome::TimedOut => ActionReport::new(
            ActionStatus::TimedOut,
            format!(
                "Stopped listening after {}. No matching messages received.",
                seconds(timeout)
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_filter_ignores_own_lines_and_matches_trigger_case_insensitively() {
        let filter = ChatFilter {
            trigger: Some("Come".into()),
            ignore_sender: Some("bot".into()),
        };
        assert!(filter.matches("alex", "please COME here"));
        assert!(!filter.matches("bot", "come here"));
        assert!(!filter.matches("alex", "stay there"));
        assert!(ChatFilter::default().matches("anyone", "anything"));
    }
}
