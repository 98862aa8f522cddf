use std::time::Duration;

use crate::HarvestError;

/// Movement sampling used to notice a navigator that makes no progress.
#[derive(Debug, Clone, PartialEq)]
pub struct StuckDetection {
    pub interval: Duration,
    /// Minimum distance the bot must cover between two samples.
    pub min_progress: f64,
    /// Consecutive slow samples tolerated before travel is declared stuck.
    pub max_strikes: u32,
}

impl Default for StuckDetection {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            min_progress: 0.5,
            max_strikes: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarvestSettings {
    /// Maximum distance at which a block can be harvested without travelling.
    pub interaction_range: f64,
    pub travel_timeout: Duration,
    pub harvest_timeout: Duration,
    /// Unvisited candidates requested from each nearest-match search.
    pub scan_limit: usize,
    pub max_rescans: u32,
    pub stuck_detection: Option<StuckDetection>,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            interaction_range: 4.5,
            travel_timeout: Duration::from_secs(120),
            harvest_timeout: Duration::from_secs(30),
            scan_limit: 16,
            max_rescans: 256,
            stuck_detection: Some(StuckDetection::default()),
        }
    }
}

impl HarvestSettings {
    pub fn validate(&self) -> Result<(), HarvestError> {
        if !self.interaction_range.is_finite() || self.interaction_range <= 0.0 {
            return Err(invalid(format!(
                "interaction_range must be a positive number, got {}",
                self.interaction_range
            )));
        }
        if self.travel_timeout.is_zero() {
            return Err(invalid("travel_timeout must be non-zero"));
        }
        if self.harvest_timeout.is_zero() {
            return Err(invalid("harvest_timeout must be non-zero"));
        }
        if self.scan_limit == 0 {
            return Err(invalid("scan_limit must be at least 1"));
        }
        if let Some(stuck) = &self.stuck_detection {
            if stuck.interval.is_zero() {
                return Err(invalid("stuck_detection.interval must be non-zero"));
            }
            if !stuck.min_progress.is_finite() || stuck.min_progress < 0.0 {
                return Err(invalid("stuck_detection.min_progress must be a non-negative number"));
            }
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> HarvestError {
    HarvestError::InvalidSettings(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(HarvestSettings::default().validate(), Ok(()));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let settings = HarvestSettings {
            harvest_timeout: Duration::ZERO,
            ..HarvestSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(HarvestError::InvalidSettings(reason)) if reason.contains("harvest_timeout")
        ));
    }

    #[test]
    fn nan_range_is_rejected() {
        let settings = HarvestSettings {
            interaction_range: f64::NAN,
            ..HarvestSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
