#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod coach;
mod error;
mod estimate;
mod exercise;
mod goal;
pub mod live_session;
mod name;
mod plan;
pub mod recommendation;
mod service;
pub mod statistics;
mod summary;
pub mod tag;
mod user;
mod workout;

pub use coach::{Coach, CoachConfig, CoachError, Status};
pub use error::{BoxError, CreateError, ReadError, StorageError, UpdateError, ValidationError};
pub use estimate::EstimatorConfig;
pub use exercise::{
    CatalogRepository, CatalogService, Exercise, ExerciseFilter, GoalRecommendation, Rating,
    RatingError, Reps, Sets, Time, Volume, VolumeError, equipment_options, muscle_options,
};
pub use goal::{Goal, GoalError, Property};
pub use live_session::{
    Clock, LiveExercise, LiveSession, Phase, SessionConfig, SessionError, SystemClock,
    completion_percentage,
};
pub use name::{Name, NameError};
pub use plan::{
    Budget, BudgetCheck, BudgetError, Direction, Plan, PlanError, PlanItem, PlanningConfig,
};
pub use recommendation::Candidate;
pub use service::Service;
pub use statistics::{Interval, WorkoutStats};
pub use summary::{Attempt, AttemptStatus, AttemptStatusError, WorkoutSummary, format_duration};
pub use user::{User, UserID, UserRepository, UserService};
pub use workout::{Workout, WorkoutError, WorkoutID, WorkoutRepository, WorkoutService};
