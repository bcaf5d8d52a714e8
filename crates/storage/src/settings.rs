use std::{fs, io::ErrorKind, path::Path};

use forma_domain::{
    Budget, BudgetError, CoachConfig, EstimatorConfig, Goal, PlanningConfig, SessionConfig,
    StorageError,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::dto;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub rest_seconds: u32,
    pub budget_minutes: Option<u32>,
    pub budget_tolerance: f64,
    /// Count the rest between sets when ranking candidates and checking the
    /// budget.
    pub include_rest_in_estimate: bool,
    pub tick_interval_ms: u64,
    pub default_goal: Option<dto::Goal>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rest_seconds: 30,
            budget_minutes: None,
            budget_tolerance: 0.10,
            include_rest_in_estimate: false,
            tick_interval_ms: 500,
            default_goal: None,
        }
    }
}

impl Settings {
    /// A missing file results in the default settings.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("reading settings from {}", path.display());
                serde_json::from_str(&content).map_err(|err| StorageError::Other(err.into()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Settings::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|err| StorageError::Other(err.into()))?;
        fs::write(path, content)?;
        Ok(())
    }

    #[must_use]
    pub fn goal(&self) -> Option<Goal> {
        self.default_goal.map(Goal::from)
    }

    pub fn budget(&self) -> Result<Option<Budget>, BudgetError> {
        self.budget_minutes.map(Budget::new).transpose()
    }

    #[must_use]
    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            planning_rest_seconds: if self.include_rest_in_estimate {
                self.rest_seconds
            } else {
                0
            },
            ..EstimatorConfig::default()
        }
    }

    #[must_use]
    pub fn planning_config(&self) -> PlanningConfig {
        PlanningConfig {
            budget_tolerance: self.budget_tolerance,
        }
    }

    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            rest_seconds: self.rest_seconds,
            estimator: self.estimator_config(),
            ..SessionConfig::default()
        }
    }

    #[must_use]
    pub fn coach_config(&self) -> CoachConfig {
        CoachConfig {
            estimator: self.estimator_config(),
            planning: self.planning_config(),
            session: self.session_config(),
        }
    }
}
