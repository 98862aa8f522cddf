//! RON scenario and settings files for the simulated world.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use harvest_engine::{HarvestSettings, SimWorld, SimWorldBuilder, StuckDetection};
use harvest_logging::harvest_info;
use ron::extensions::Extensions;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

type Point = (f64, f64, f64);
type Cell = (i32, i32, i32);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MaterialEntry {
    name: String,
    hardness: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ToolEntry {
    name: String,
    material: String,
    speed: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemEntry {
    name: String,
    #[serde(default = "one")]
    count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlockEntry {
    pos: Cell,
    material: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FillEntry {
    from: Cell,
    to: Cell,
    material: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScenarioFile {
    position: Point,
    spawn: Option<Point>,
    travel_secs_per_block: f64,
    harvest_time_scale: Option<f64>,
    materials: Vec<MaterialEntry>,
    tools: Vec<ToolEntry>,
    inventory: Vec<ItemEntry>,
    blocks: Vec<BlockEntry>,
    fills: Vec<FillEntry>,
    unreachable: Vec<Cell>,
}

fn one() -> u32 {
    1
}

impl ScenarioFile {
    fn into_world(self) -> Result<SimWorld, ScenarioError> {
        let mut builder = SimWorldBuilder::new()
            .position(self.position)
            .travel_time_per_block(seconds("travel_secs_per_block", self.travel_secs_per_block)?);
        if let Some(spawn) = self.spawn {
            builder = builder.spawn(spawn);
        }
        if let Some(scale) = self.harvest_time_scale {
            if !scale.is_finite() || scale < 0.0 {
                return Err(ScenarioError::InvalidValue {
                    field: "harvest_time_scale",
                    reason: format!("expected a non-negative number, got {scale}"),
                });
            }
            builder = builder.harvest_time_scale(scale);
        }

        for material in &self.materials {
            if !material.hardness.is_finite() || material.hardness < 0.0 {
                return Err(ScenarioError::InvalidValue {
                    field: "materials.hardness",
                    reason: format!(
                        "expected a non-negative number for {}, got {}",
                        material.name, material.hardness
                    ),
                });
            }
            builder = builder.material(&material.name, material.hardness);
        }
        for tool in &self.tools {
            if !tool.speed.is_finite() || tool.speed <= 0.0 {
                return Err(ScenarioError::InvalidValue {
                    field: "tools.speed",
                    reason: format!("expected a positive number for {}, got {}", tool.name, tool.speed),
                });
            }
            builder = builder.tool(&tool.name, &tool.material, tool.speed);
        }
        for item in &self.inventory {
            builder = builder.item(&item.name, item.count);
        }
        for fill in &self.fills {
            builder = builder.fill(fill.from, fill.to, &fill.material);
        }
        for block in &self.blocks {
            builder = builder.block(block.pos, &block.material);
        }
        for cell in self.unreachable {
            builder = builder.unreachable(cell);
        }
        Ok(builder.build())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StuckFile {
    enabled: Option<bool>,
    interval_secs: Option<f64>,
    min_progress: Option<f64>,
    max_strikes: Option<u32>,
}

/// Overrides for [`HarvestSettings`]; omitted fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    interaction_range: Option<f64>,
    travel_timeout_secs: Option<f64>,
    harvest_timeout_secs: Option<f64>,
    scan_limit: Option<usize>,
    max_rescans: Option<u32>,
    stuck_detection: Option<StuckFile>,
}

impl SettingsFile {
    fn into_settings(self) -> Result<HarvestSettings, ScenarioError> {
        let mut settings = HarvestSettings::default();
        if let Some(range) = self.interaction_range {
            settings.interaction_range = range;
        }
        if let Some(secs) = self.travel_timeout_secs {
            settings.travel_timeout = seconds("travel_timeout_secs", secs)?;
        }
        if let Some(secs) = self.harvest_timeout_secs {
            settings.harvest_timeout = seconds("harvest_timeout_secs", secs)?;
        }
        if let Some(limit) = self.scan_limit {
            settings.scan_limit = limit;
        }
        if let Some(max) = self.max_rescans {
            settings.max_rescans = max;
        }
        if let Some(stuck) = self.stuck_detection {
            settings.stuck_detection = if stuck.enabled.unwrap_or(true) {
                let mut detection = StuckDetection::default();
                if let Some(secs) = stuck.interval_secs {
                    detection.interval = seconds("stuck_detection.interval_secs", secs)?;
                }
                if let Some(progress) = stuck.min_progress {
                    detection.min_progress = progress;
                }
                if let Some(strikes) = stuck.max_strikes {
                    detection.max_strikes = strikes;
                }
                Some(detection)
            } else {
                None
            };
        }
        Ok(settings)
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ScenarioError> {
    Duration::try_from_secs_f64(value).map_err(|err| ScenarioError::InvalidValue {
        field,
        reason: format!("{value} is not a valid number of seconds ({err})"),
    })
}

fn read(path: &Path) -> Result<String, ScenarioError> {
    fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses RON with `implicit_some`, so optional fields are written bare.
fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, ScenarioError> {
    ron::Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str(content)
        .map_err(|source| ScenarioError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

pub fn load_scenario(path: &Path) -> Result<SimWorld, ScenarioError> {
    let file: ScenarioFile = parse(path, &read(path)?)?;
    let world = file.into_world()?;
    harvest_info!("Loaded scenario from {:?}", path);
    Ok(world)
}

pub fn load_settings(path: &Path) -> Result<HarvestSettings, ScenarioError> {
    let file: SettingsFile = parse(path, &read(path)?)?;
    file.into_settings()
}
