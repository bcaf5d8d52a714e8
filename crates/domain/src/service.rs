use log::{debug, error};

use crate::{
    CatalogRepository, CatalogService, CreateError, Exercise, Goal, GoalRecommendation, Name,
    ReadError, UpdateError, User, UserID, UserRepository, UserService, Workout, WorkoutRepository,
    WorkoutService, WorkoutSummary,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NotFound) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: CatalogRepository> CatalogService for Service<R> {
    fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    fn get_recommendations(
        &self,
        goal: Goal,
    ) -> Result<Vec<(Exercise, GoalRecommendation)>, ReadError> {
        log_on_error!(
            self.repository.read_recommendations(goal),
            ReadError,
            "get",
            "recommendations"
        )
    }
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    fn get_workouts(&self, user_id: UserID) -> Result<Vec<Workout>, ReadError> {
        log_on_error!(
            self.repository.read_workouts(user_id),
            ReadError,
            "get",
            "workouts"
        )
    }

    fn log_workout(
        &self,
        user_id: UserID,
        summary: &WorkoutSummary,
    ) -> Result<Workout, CreateError> {
        log_on_error!(
            self.repository.create_workout(user_id, summary),
            CreateError,
            "log",
            "workout"
        )
    }
}

impl<R: UserRepository> UserService for Service<R> {
    fn get_users(&self) -> Result<Vec<User>, ReadError> {
        log_on_error!(self.repository.read_users(), ReadError, "get", "users")
    }

    fn create_user(
        &self,
        username: Name,
        display_name: Option<String>,
        preferred_goal: Option<Goal>,
    ) -> Result<User, CreateError> {
        log_on_error!(
            self.repository
                .create_user(username, display_name, preferred_goal),
            CreateError,
            "create",
            "user"
        )
    }

    fn replace_user(&self, user: User) -> Result<User, UpdateError> {
        log_on_error!(
            self.repository.replace_user(user),
            UpdateError,
            "replace",
            "user"
        )
    }
}
