//! Harvest engine: action races, the vein-mining loop and job execution.
mod engine;
mod error;
mod events;
mod harvest;
mod interact;
mod race;
mod settings;
mod sim;
mod types;
mod world;

pub use engine::HarvestHandle;
pub use error::{ActionError, HarvestError};
pub use events::{EventKind, EventSource, Subscription, WorldEvent, WorldEventBus};
pub use harvest::Harvester;
pub use interact::{dig_block, travel_to, wait_for_chat, ActionReport, ActionStatus, ChatFilter};
pub use race::{ActionRace, CancelCause, CancelSignal, RaceOutcome, StuckWatchdog};
pub use settings::{HarvestSettings, StuckDetection};
pub use sim::{SimWorld, SimWorldBuilder};
pub use types::{HarvestEvent, HarvestProgress, JobId, NullProgressSink, ProgressSink};
pub use world::{Interactor, Inventory, Navigator, WorldContext, WorldView};
