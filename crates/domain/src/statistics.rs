use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{Name, Workout};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interval {
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

impl Interval {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first.is_none_or(|first| date >= first) && self.last.is_none_or(|last| date <= last)
    }
}

impl From<std::ops::RangeInclusive<NaiveDate>> for Interval {
    fn from(value: std::ops::RangeInclusive<NaiveDate>) -> Self {
        Interval {
            first: Some(*value.start()),
            last: Some(*value.end()),
        }
    }
}

/// Workouts within the interval, newest first. Workouts of the same day keep
/// the reverse order in which they were logged.
#[must_use]
pub fn filter_workouts<'a>(workouts: &'a [Workout], interval: &Interval) -> Vec<&'a Workout> {
    let mut result = workouts
        .iter()
        .rev()
        .filter(|w| interval.contains(w.performed_at))
        .collect::<Vec<_>>();
    result.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));
    result
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_minutes: u32,
    pub total_sets_completed: u32,
    pub top_exercise: Option<Name>,
    pub top_exercise_count: usize,
}

#[must_use]
pub fn workout_stats(workouts: &[&Workout]) -> WorkoutStats {
    let mut counts: BTreeMap<&Name, usize> = BTreeMap::new();
    for workout in workouts {
        for name in workout.exercises() {
            *counts.entry(name).or_default() += 1;
        }
    }
    // BTreeMap iterates by name, so the first maximum wins ties.
    let top = counts
        .into_iter()
        .fold(None, |top: Option<(&Name, usize)>, (name, count)| match top {
            Some((_, top_count)) if top_count >= count => top,
            _ => Some((name, count)),
        });

    WorkoutStats {
        total_workouts: workouts.len(),
        total_minutes: workouts.iter().map(|w| w.duration_minutes).sum(),
        total_sets_completed: workouts.iter().map(|w| w.total_sets_completed).sum(),
        top_exercise: top.map(|(name, _)| name.clone()),
        top_exercise_count: top.map_or(0, |(_, count)| count),
    }
}

/// Days since each exercise was last performed. Skipped attempts do not count.
#[must_use]
pub fn recency_days(workouts: &[Workout], today: NaiveDate) -> BTreeMap<Name, i64> {
    let mut last_performed: BTreeMap<&Name, NaiveDate> = BTreeMap::new();
    for workout in workouts {
        for name in workout.performed() {
            last_performed
                .entry(name)
                .and_modify(|date| *date = (*date).max(workout.performed_at))
                .or_insert(workout.performed_at);
        }
    }
    last_performed
        .into_iter()
        .map(|(name, date)| (name.clone(), (today - date).num_days()))
        .collect()
}

/// Exercise names with the date they were logged, newest first.
#[must_use]
pub fn recent_exercise_usage(
    workouts: &[Workout],
    interval: &Interval,
    limit: usize,
) -> Vec<(Name, NaiveDate)> {
    filter_workouts(workouts, interval)
        .into_iter()
        .flat_map(|w| w.exercises().into_iter().map(|n| (n.clone(), w.performed_at)))
        .take(limit)
        .collect()
}
