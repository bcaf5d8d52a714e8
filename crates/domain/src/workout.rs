use std::collections::BTreeMap;

use chrono::NaiveDate;
use derive_more::Deref;
use uuid::Uuid;

use crate::{
    Attempt, AttemptStatus, CreateError, Goal, Interval, Name, ReadError, UserID, WorkoutStats,
    WorkoutSummary, statistics,
};

pub trait WorkoutService {
    fn get_workouts(&self, user_id: UserID) -> Result<Vec<Workout>, ReadError>;
    fn log_workout(&self, user_id: UserID, summary: &WorkoutSummary)
    -> Result<Workout, CreateError>;

    /// Workouts of the interval, newest first.
    fn get_workout_history(
        &self,
        user_id: UserID,
        interval: &Interval,
    ) -> Result<Vec<Workout>, ReadError> {
        let workouts = self.get_workouts(user_id)?;
        Ok(statistics::filter_workouts(&workouts, interval)
            .into_iter()
            .cloned()
            .collect())
    }

    fn get_workout_stats(
        &self,
        user_id: UserID,
        interval: &Interval,
    ) -> Result<WorkoutStats, ReadError> {
        let workouts = self.get_workouts(user_id)?;
        Ok(statistics::workout_stats(&statistics::filter_workouts(
            &workouts, interval,
        )))
    }

    fn get_recency_days(
        &self,
        user_id: UserID,
        today: NaiveDate,
    ) -> Result<BTreeMap<Name, i64>, ReadError> {
        Ok(statistics::recency_days(&self.get_workouts(user_id)?, today))
    }
}

pub trait WorkoutRepository {
    fn read_workouts(&self, user_id: UserID) -> Result<Vec<Workout>, ReadError>;
    fn create_workout(
        &self,
        user_id: UserID,
        summary: &WorkoutSummary,
    ) -> Result<Workout, CreateError>;
}

/// A logged training session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    pub id: WorkoutID,
    pub user_id: UserID,
    pub performed_at: NaiveDate,
    pub duration_minutes: u32,
    pub duration_seconds: u32,
    pub goal: Option<Goal>,
    pub total_sets_completed: u32,
    pub attempts: Vec<Attempt>,
}

impl Workout {
    pub fn from_summary(
        id: WorkoutID,
        user_id: UserID,
        summary: &WorkoutSummary,
    ) -> Result<Self, WorkoutError> {
        if summary.attempts.is_empty() {
            return Err(WorkoutError::NoExercises);
        }
        Ok(Self {
            id,
            user_id,
            performed_at: summary.performed_at.date_naive(),
            duration_minutes: summary.duration_minutes(),
            duration_seconds: summary.duration_seconds,
            goal: summary.goal,
            total_sets_completed: summary.total_sets_completed,
            attempts: summary.attempts.clone(),
        })
    }

    #[must_use]
    pub fn exercises(&self) -> Vec<&Name> {
        self.attempts.iter().map(|a| &a.name).collect()
    }

    #[must_use]
    pub fn performed(&self) -> Vec<&Name> {
        self.attempts
            .iter()
            .filter(|a| a.status == AttemptStatus::Completed)
            .map(|a| &a.name)
            .collect()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WorkoutError {
    #[error("At least one exercise is required")]
    NoExercises,
}

impl From<WorkoutError> for CreateError {
    fn from(value: WorkoutError) -> Self {
        CreateError::Invalid(value.to_string())
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(Uuid);

impl WorkoutID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for WorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}
