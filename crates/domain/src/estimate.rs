use crate::Volume;

/// Rules for converting a recommended volume into an expected duration.
///
/// The same rules size the candidates during planning and the per-set timers
/// of a live session. Planning uses `planning_rest_seconds` between sets, a
/// live session uses its own configured rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    pub seconds_per_rep: u32,
    pub min_hold_seconds: u32,
    pub min_reps_seconds: u32,
    pub default_set_seconds: u32,
    pub fallback_minutes: u32,
    pub planning_rest_seconds: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            seconds_per_rep: 4,
            min_hold_seconds: 10,
            min_reps_seconds: 20,
            default_set_seconds: 30,
            fallback_minutes: 5,
            planning_rest_seconds: 0,
        }
    }
}

impl EstimatorConfig {
    #[must_use]
    pub fn set_seconds(&self, volume: &Volume) -> u32 {
        if let Some(hold) = volume.hold {
            u32::from(hold).max(self.min_hold_seconds)
        } else if let Some(reps) = volume.reps {
            (u32::from(reps) * self.seconds_per_rep).max(self.min_reps_seconds)
        } else {
            self.default_set_seconds
        }
    }

    /// Rest is only inserted between sets, not after the last one.
    #[must_use]
    pub fn exercise_seconds(&self, volume: &Volume, rest_seconds: u32) -> u32 {
        let sets = volume.num_sets();
        sets * self.set_seconds(volume) + (sets - 1) * rest_seconds
    }

    #[must_use]
    pub fn minutes(&self, volume: &Volume, rest_seconds: u32) -> u32 {
        if volume.is_empty() {
            return self.fallback_minutes;
        }
        self.exercise_seconds(volume, rest_seconds)
            .div_ceil(60)
            .max(1)
    }

    #[must_use]
    pub fn planning_minutes(&self, volume: &Volume) -> u32 {
        self.minutes(volume, self.planning_rest_seconds)
    }
}
