mod logging;
mod scenario;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use harvest_core::{CollectReport, CollectRequest, DEFAULT_COUNT, DEFAULT_SEARCH_RADIUS};
use harvest_engine::{HarvestEvent, HarvestHandle, HarvestSettings, WorldContext};
use harvest_logging::harvest_info;
use serde::Serialize;

use crate::logging::LogDestination;

/// Collect blocks of one material from a simulated world.
#[derive(Debug, Parser)]
#[command(name = "harvest_app", version)]
struct Args {
    /// RON scenario describing the world.
    scenario: PathBuf,

    /// Block type to collect; partial names match the first known type containing them.
    #[arg(short, long)]
    material: String,

    #[arg(short, long, default_value_t = DEFAULT_COUNT)]
    count: u32,

    /// Search radius in blocks.
    #[arg(short, long, default_value_t = DEFAULT_SEARCH_RADIUS)]
    radius: u32,

    /// RON file overriding harvest settings.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    log: LogDestination,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunOutput {
    finished_utc: String,
    report: CollectReport,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(args.log);

    let world = Arc::new(
        scenario::load_scenario(&args.scenario)
            .with_context(|| format!("loading scenario {}", args.scenario.display()))?,
    );
    let settings = match &args.settings {
        Some(path) => scenario::load_settings(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => HarvestSettings::default(),
    };

    let handle = HarvestHandle::new(settings, WorldContext::from_shared(world))?;
    let request = CollectRequest::new(args.material, args.count).with_search_radius(args.radius);
    handle.submit(1, request)?;

    let result = loop {
        let Some(event) = handle.recv() else {
            bail!("harvest engine stopped before finishing the job");
        };
        match event {
            HarvestEvent::Progress { progress, .. } => {
                harvest_info!(
                    "{:?} {}/{}{}",
                    progress.stage,
                    progress.collected,
                    progress.requested,
                    progress
                        .target
                        .map(|pos| format!(" at {pos}"))
                        .unwrap_or_default()
                );
            }
            HarvestEvent::Completed { result, .. } => break result,
        }
    };

    let output = RunOutput {
        finished_utc: Utc::now().to_rfc3339(),
        report: result?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
