use std::{collections::BTreeMap, fmt};

use chrono::Duration;
use log::{info, warn};

use crate::{
    Budget, BudgetCheck, BudgetError, Candidate, CatalogService, Clock, Direction,
    EstimatorConfig, Exercise, Goal, GoalRecommendation, LiveSession, Name, Phase, Plan,
    PlanError, PlanItem, PlanningConfig, ReadError, SessionConfig, SessionError, SystemClock,
    UserID, WorkoutService, WorkoutSummary, recommendation,
};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CoachConfig {
    pub estimator: EstimatorConfig,
    pub planning: PlanningConfig,
    pub session: SessionConfig,
}

/// Message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Warning(String),
    Error(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Info(message) => write!(f, "{message}"),
            Status::Warning(message) => write!(f, "Warning: {message}"),
            Status::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CoachError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Owns the planning state and the live session of one user.
pub struct Coach<S, C = SystemClock> {
    service: S,
    user_id: UserID,
    config: CoachConfig,
    clock: C,
    goal: Option<Goal>,
    entries: Vec<(Exercise, GoalRecommendation)>,
    recency: BTreeMap<Name, i64>,
    candidates: Vec<Candidate>,
    plan: Plan,
    budget: Option<Budget>,
    session: LiveSession<C>,
    summary: Option<WorkoutSummary>,
    log_pending: bool,
    status: Option<Status>,
}

impl<S> Coach<S, SystemClock>
where
    S: CatalogService + WorkoutService,
{
    pub fn new(service: S, user_id: UserID, config: CoachConfig) -> Self {
        Self::with_clock(service, user_id, config, SystemClock)
    }
}

impl<S, C> Coach<S, C>
where
    S: CatalogService + WorkoutService,
    C: Clock + Clone,
{
    pub fn with_clock(service: S, user_id: UserID, config: CoachConfig, clock: C) -> Self {
        let session_config = SessionConfig {
            estimator: config.estimator,
            ..config.session
        };
        Self {
            session: LiveSession::with_clock(session_config, clock.clone()),
            service,
            user_id,
            config,
            clock,
            goal: None,
            entries: vec![],
            recency: BTreeMap::new(),
            candidates: vec![],
            plan: Plan::default(),
            budget: None,
            summary: None,
            log_pending: false,
            status: None,
        }
    }

    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    #[must_use]
    pub fn goal(&self) -> Option<Goal> {
        self.goal
    }

    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    #[must_use]
    pub fn budget(&self) -> Option<Budget> {
        self.budget
    }

    #[must_use]
    pub fn budget_check(&self) -> Option<BudgetCheck> {
        self.budget
            .map(|budget| self.plan.validate(budget, &self.config.planning))
    }

    #[must_use]
    pub fn session(&self) -> &LiveSession<C> {
        &self.session
    }

    /// Summary of the last ended session.
    #[must_use]
    pub fn summary(&self) -> Option<&WorkoutSummary> {
        self.summary.as_ref()
    }

    /// The summary of the last session has not been written to the log yet.
    #[must_use]
    pub fn log_pending(&self) -> bool {
        self.log_pending
    }

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn take_status(&mut self) -> Option<Status> {
        self.status.take()
    }

    /// Switch to a goal and rebuild the candidate pool. A plan built for
    /// another goal is cleared.
    pub fn select_goal(&mut self, goal: Goal) -> Result<(), CoachError> {
        let result = self.load_candidates(goal);
        self.report(result)?;
        let cleared = self.plan.select_goal(goal);
        self.goal = Some(goal);
        self.rank_candidates();
        self.status = Some(Status::Info(if cleared {
            format!("Plan cleared for {goal}")
        } else {
            format!("{} exercises for {goal}", self.candidates.len())
        }));
        Ok(())
    }

    /// Reload catalog entries and history, e.g. after a workout was logged.
    pub fn refresh(&mut self) -> Result<(), CoachError> {
        let Some(goal) = self.goal else {
            return Ok(());
        };
        let result = self.load_candidates(goal);
        self.report(result)?;
        self.rank_candidates();
        Ok(())
    }

    pub fn add(&mut self, name: &Name) -> Result<(), CoachError> {
        let result = self.add_candidate(name);
        self.report(result)?;
        self.check_budget();
        Ok(())
    }

    pub fn remove(&mut self, name: &Name) -> Result<PlanItem, CoachError> {
        let result = self.plan.remove(name).map_err(CoachError::from);
        let item = self.report(result)?;
        if Some(item.goal) == self.goal {
            if let Some((exercise, goal_recommendation)) = self
                .entries
                .iter()
                .find(|(e, r)| e.name == item.name && r.goal == item.goal)
                .cloned()
            {
                let recency_days = self.recency.get(&exercise.name).copied();
                self.candidates.push(Candidate::new(
                    exercise,
                    goal_recommendation,
                    recency_days,
                    &self.config.estimator,
                ));
                recommendation::sort(&mut self.candidates);
            }
        }
        self.status = Some(Status::Info(format!("Removed {}", item.name)));
        self.check_budget();
        Ok(item)
    }

    pub fn move_item(&mut self, name: &Name, direction: Direction) -> Result<usize, CoachError> {
        let result = self
            .plan
            .move_item(name, direction)
            .map_err(CoachError::from);
        self.report(result)
    }

    pub fn set_budget(&mut self, budget: Option<Budget>) {
        self.budget = budget;
        self.status = Some(Status::Info(match budget {
            Some(budget) => format!("Budget set to {} min", budget.minutes()),
            None => String::from("Budget removed"),
        }));
        self.check_budget();
    }

    pub fn start_session(&mut self) -> Result<(), CoachError> {
        let result = self.prepare_session();
        self.report(result)?;
        self.status = Some(Status::Info(String::from("Session started")));
        Ok(())
    }

    /// Advance the live session. A session which ends naturally is written to
    /// the workout log.
    pub fn tick(&mut self, dt: Duration) -> Option<Phase> {
        let phase = self.session.tick(dt);
        if phase == Some(Phase::Ended) {
            self.finish_session();
        }
        phase
    }

    pub fn complete_set(&mut self) -> Result<Phase, CoachError> {
        let result = self.session.complete_set(false).map_err(CoachError::from);
        self.after_action(result)
    }

    pub fn skip_exercise(&mut self) -> Result<Phase, CoachError> {
        let result = self.session.skip_exercise().map_err(CoachError::from);
        self.after_action(result)
    }

    pub fn next_exercise(&mut self) -> Result<Phase, CoachError> {
        let result = self
            .session
            .advance_exercise_manually()
            .map_err(CoachError::from);
        self.after_action(result)
    }

    pub fn pause(&mut self) -> Result<(), CoachError> {
        let result = self.session.pause().map_err(CoachError::from);
        self.report(result)?;
        self.status = Some(Status::Info(String::from("Paused")));
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), CoachError> {
        let result = self.session.resume().map_err(CoachError::from);
        self.report(result)?;
        self.status = Some(Status::Info(String::from("Resumed")));
        Ok(())
    }

    pub fn set_rest_seconds(&mut self, seconds: u32) -> Result<(), CoachError> {
        let result = self
            .session
            .set_rest_seconds(seconds)
            .map_err(CoachError::from);
        self.report(result)?;
        self.status = Some(Status::Info(format!("Rest set to {seconds} s")));
        Ok(())
    }

    /// Stop the running session. Returns the summary if a session was ended.
    pub fn end_session(&mut self, early: bool) -> Option<&WorkoutSummary> {
        self.session.end(early)?;
        self.finish_session();
        self.summary.as_ref()
    }

    /// Write a summary which could not be logged before. Returns `None` if
    /// there is no such summary, otherwise whether it was logged now.
    pub fn retry_log(&mut self) -> Option<bool> {
        if !self.log_pending {
            return None;
        }
        Some(self.write_log())
    }

    fn load_candidates(&mut self, goal: Goal) -> Result<(), CoachError> {
        let entries = self.service.get_recommendations(goal)?;
        let today = self.clock.now().date_naive();
        let recency = self.service.get_recency_days(self.user_id, today)?;
        self.entries = entries;
        self.recency = recency;
        Ok(())
    }

    fn rank_candidates(&mut self) {
        let Some(goal) = self.goal else {
            self.candidates.clear();
            return;
        };
        self.candidates = recommendation::rank(
            self.entries.clone(),
            goal,
            &self.recency,
            &self.plan,
            &self.config.estimator,
        );
    }

    fn add_candidate(&mut self, name: &Name) -> Result<(), CoachError> {
        if self.goal.is_none() {
            return Err(PlanError::NoGoal.into());
        }
        if self.plan.contains(name) {
            return Err(PlanError::Duplicate(name.clone()).into());
        }
        let index = self
            .candidates
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| PlanError::NotACandidate(name.clone()))?;
        let item = PlanItem::from(&self.candidates[index]);
        self.status = Some(Status::Info(format!(
            "Added {} ({} min)",
            item.name, item.estimated_minutes
        )));
        self.plan.add(item)?;
        self.candidates.remove(index);
        Ok(())
    }

    fn check_budget(&mut self) {
        if let Some(check) = self.budget_check() {
            if !check.within_budget {
                self.status = Some(Status::Warning(format!(
                    "Plan of {} min exceeds the budget of {} min",
                    check.total_minutes, check.budget_minutes
                )));
            }
        }
    }

    fn prepare_session(&mut self) -> Result<(), CoachError> {
        if self.session.phase().is_running() {
            return Err(SessionError::InvalidState(self.session.phase()).into());
        }
        if self.plan.is_empty() {
            return Err(SessionError::EmptyPlan.into());
        }
        let catalog = self.service.get_exercises()?;
        let missing = self
            .plan
            .items()
            .iter()
            .filter(|item| catalog.iter().all(|e| e.name != item.name))
            .map(|item| item.name.clone())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(SessionError::MissingExercises(missing).into());
        }
        self.session
            .load(&self.plan, self.budget, &self.config.planning)?;
        if let Err(err) = self.session.start() {
            self.session.reset();
            return Err(err.into());
        }
        Ok(())
    }

    fn after_action(&mut self, result: Result<Phase, CoachError>) -> Result<Phase, CoachError> {
        let phase = self.report(result)?;
        if phase == Phase::Ended {
            self.finish_session();
        }
        Ok(phase)
    }

    fn finish_session(&mut self) {
        let Some(summary) = self.session.take_summary() else {
            return;
        };
        if self.log_pending && !self.write_log() {
            warn!("discarding workout which could not be logged");
        }
        info!("{} exercises completed", summary.completed_count());
        self.summary = Some(summary);
        self.log_pending = true;
        self.write_log();
    }

    fn write_log(&mut self) -> bool {
        let Some(summary) = &self.summary else {
            return false;
        };
        match self.service.log_workout(self.user_id, summary) {
            Ok(workout) => {
                info!("logged workout {}", *workout.id);
                self.log_pending = false;
                self.status = Some(Status::Info(format!(
                    "Workout logged: {} min",
                    workout.duration_minutes
                )));
                if let Err(err) = self.refresh() {
                    warn!("failed to refresh candidates: {err}");
                }
                true
            }
            Err(err) => {
                warn!("failed to log workout: {err}");
                self.status = Some(Status::Warning(format!(
                    "Workout could not be logged: {err}"
                )));
                false
            }
        }
    }

    fn report<T>(&mut self, result: Result<T, CoachError>) -> Result<T, CoachError> {
        if let Err(err) = &result {
            self.status = Some(match err {
                CoachError::Read(_) => Status::Error(err.to_string()),
                _ => Status::Warning(err.to_string()),
            });
        }
        result
    }
}
