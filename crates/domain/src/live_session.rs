use std::fmt;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::{
    Attempt, AttemptStatus, Budget, BudgetCheck, EstimatorConfig, Goal, Name, Plan, PlanItem,
    PlanningConfig, Volume, WorkoutSummary,
};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub rest_seconds: u32,
    pub min_rest_seconds: u32,
    pub estimator: EstimatorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rest_seconds: 30,
            min_rest_seconds: 5,
            estimator: EstimatorConfig::default(),
        }
    }
}

/// A plan item prepared for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveExercise {
    pub name: Name,
    pub goal: Goal,
    pub volume: Volume,
    pub sets: u32,
    pub set_seconds: u32,
}

impl LiveExercise {
    #[must_use]
    pub fn new(item: &PlanItem, estimator: &EstimatorConfig) -> Self {
        Self {
            name: item.name.clone(),
            goal: item.goal,
            volume: item.volume,
            sets: item.volume.num_sets(),
            set_seconds: estimator.set_seconds(&item.volume),
        }
    }

    #[must_use]
    pub fn set_target(&self) -> Duration {
        Duration::seconds(i64::from(self.set_seconds))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Ready,
    InSet,
    RestBetweenSets,
    RestBetweenExercises,
    Ended,
}

impl Phase {
    /// The clock is running in this phase.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(
            self,
            Phase::InSet | Phase::RestBetweenSets | Phase::RestBetweenExercises
        )
    }

    #[must_use]
    pub fn is_rest(self) -> bool {
        matches!(self, Phase::RestBetweenSets | Phase::RestBetweenExercises)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Ready => "ready",
            Phase::InSet => "in set",
            Phase::RestBetweenSets => "rest between sets",
            Phase::RestBetweenExercises => "rest between exercises",
            Phase::Ended => "ended",
        };
        write!(f, "{name}")
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Plan is empty")]
    EmptyPlan,
    #[error("Plan of {total_minutes} min exceeds the budget limit of {limit_minutes:.1} min")]
    OverBudget {
        total_minutes: u32,
        limit_minutes: f64,
    },
    #[error("Not possible while {0}")]
    InvalidState(Phase),
    #[error("Rest must be at least {min} s")]
    RestTooShort { min: u32 },
    #[error("Unknown exercises: {}", .0.iter().map(Name::as_str).collect::<Vec<_>>().join(", "))]
    MissingExercises(Vec<Name>),
}

/// State of a guided training session.
///
/// The session is driven by [`LiveSession::tick`] and the user actions. Every
/// exercise gets exactly one attempt before the session moves past it, so an
/// ended session holds one attempt per planned exercise.
#[derive(Debug)]
pub struct LiveSession<C = SystemClock> {
    clock: C,
    config: SessionConfig,
    exercises: Vec<LiveExercise>,
    attempts: Vec<Option<AttemptStatus>>,
    goal: Option<Goal>,
    budget_check: Option<BudgetCheck>,
    phase: Phase,
    exercise_idx: usize,
    current_set: u32,
    paused: bool,
    rest_seconds: u32,
    set_elapsed: Duration,
    exercise_elapsed: Duration,
    session_elapsed: Duration,
    rest_remaining: Duration,
    total_sets_completed: u32,
    started_at: Option<DateTime<Utc>>,
    summary: Option<WorkoutSummary>,
}

impl LiveSession<SystemClock> {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for LiveSession<SystemClock> {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl<C: Clock> LiveSession<C> {
    pub fn with_clock(config: SessionConfig, clock: C) -> Self {
        Self {
            clock,
            config,
            exercises: vec![],
            attempts: vec![],
            goal: None,
            budget_check: None,
            phase: Phase::Idle,
            exercise_idx: 0,
            current_set: 1,
            paused: false,
            rest_seconds: config.rest_seconds.max(config.min_rest_seconds),
            set_elapsed: Duration::zero(),
            exercise_elapsed: Duration::zero(),
            session_elapsed: Duration::zero(),
            rest_remaining: Duration::zero(),
            total_sets_completed: 0,
            started_at: None,
            summary: None,
        }
    }

    /// Materialize a plan. The budget is checked when the session is started.
    pub fn load(
        &mut self,
        plan: &Plan,
        budget: Option<Budget>,
        planning: &PlanningConfig,
    ) -> Result<(), SessionError> {
        if self.phase.is_running() {
            return Err(SessionError::InvalidState(self.phase));
        }
        self.reset();
        self.exercises = plan
            .items()
            .iter()
            .map(|item| LiveExercise::new(item, &self.config.estimator))
            .collect();
        self.attempts = vec![None; self.exercises.len()];
        self.goal = plan.goal();
        self.budget_check = budget.map(|b| plan.validate(b, planning));
        self.phase = Phase::Ready;
        debug!("loaded plan with {} exercises", self.exercises.len());
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Ready {
            return Err(SessionError::InvalidState(self.phase));
        }
        if self.exercises.is_empty() {
            return Err(SessionError::EmptyPlan);
        }
        if let Some(check) = self.budget_check {
            if !check.within_budget {
                return Err(SessionError::OverBudget {
                    total_minutes: check.total_minutes,
                    limit_minutes: check.limit_minutes,
                });
            }
        }
        self.started_at = Some(self.clock.now());
        self.session_elapsed = Duration::zero();
        self.total_sets_completed = 0;
        self.begin_exercise(0);
        info!("started session with {} exercises", self.exercises.len());
        Ok(())
    }

    /// Advance the timers. At most one phase transition happens per tick; the
    /// new phase is returned if one happened.
    pub fn tick(&mut self, dt: Duration) -> Option<Phase> {
        if self.paused || !self.phase.is_running() || dt <= Duration::zero() {
            return None;
        }
        self.session_elapsed += dt;
        match self.phase {
            Phase::InSet => {
                self.set_elapsed += dt;
                self.exercise_elapsed += dt;
                let target = self.current_exercise().map(LiveExercise::set_target)?;
                if self.set_elapsed >= target {
                    self.set_elapsed = target;
                    self.finish_set(true);
                    return Some(self.phase);
                }
            }
            Phase::RestBetweenSets => {
                self.exercise_elapsed += dt;
                self.rest_remaining -= dt;
                if self.rest_remaining <= Duration::zero() {
                    self.rest_remaining = Duration::zero();
                    self.current_set += 1;
                    self.set_elapsed = Duration::zero();
                    self.phase = Phase::InSet;
                    return Some(self.phase);
                }
            }
            Phase::RestBetweenExercises => {
                self.rest_remaining -= dt;
                if self.rest_remaining <= Duration::zero() {
                    self.begin_exercise(self.exercise_idx + 1);
                    return Some(self.phase);
                }
            }
            Phase::Idle | Phase::Ready | Phase::Ended => {}
        }
        None
    }

    /// Finish the current set. `auto` marks a set completed by its timer.
    pub fn complete_set(&mut self, auto: bool) -> Result<Phase, SessionError> {
        if self.phase != Phase::InSet {
            return Err(SessionError::InvalidState(self.phase));
        }
        self.finish_set(auto);
        Ok(self.phase)
    }

    pub fn skip_exercise(&mut self) -> Result<Phase, SessionError> {
        match self.phase {
            Phase::InSet | Phase::RestBetweenSets => {
                self.finish_exercise(AttemptStatus::Skipped);
                Ok(self.phase)
            }
            phase => Err(SessionError::InvalidState(phase)),
        }
    }

    /// Move on to the next exercise. During the rest after an exercise the
    /// rest is cut short.
    pub fn advance_exercise_manually(&mut self) -> Result<Phase, SessionError> {
        match self.phase {
            Phase::InSet | Phase::RestBetweenSets => {
                self.finish_exercise(AttemptStatus::Completed);
                Ok(self.phase)
            }
            Phase::RestBetweenExercises => {
                self.begin_exercise(self.exercise_idx + 1);
                Ok(self.phase)
            }
            phase => Err(SessionError::InvalidState(phase)),
        }
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if !self.phase.is_running() {
            return Err(SessionError::InvalidState(self.phase));
        }
        self.paused = true;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        if !self.phase.is_running() {
            return Err(SessionError::InvalidState(self.phase));
        }
        self.paused = false;
        Ok(())
    }

    pub fn set_rest_seconds(&mut self, seconds: u32) -> Result<(), SessionError> {
        if seconds < self.config.min_rest_seconds {
            return Err(SessionError::RestTooShort {
                min: self.config.min_rest_seconds,
            });
        }
        self.rest_seconds = seconds;
        if self.phase.is_rest() {
            self.rest_remaining = self.rest_duration();
        }
        Ok(())
    }

    /// Stop the session and build its summary.
    ///
    /// The current exercise is recorded as skipped if `early`, otherwise as
    /// completed. Exercises that were never reached are recorded as skipped.
    /// A session that is loaded but not started has no current exercise, so
    /// every exercise is recorded as skipped. Ending an idle or already ended
    /// session does nothing.
    pub fn end(&mut self, early: bool) -> Option<&WorkoutSummary> {
        if matches!(self.phase, Phase::Idle | Phase::Ended) {
            return None;
        }
        let in_exercise = matches!(self.phase, Phase::InSet | Phase::RestBetweenSets);
        if let Some(slot) = self.attempts.get_mut(self.exercise_idx) {
            if slot.is_none() && in_exercise {
                *slot = Some(if early {
                    AttemptStatus::Skipped
                } else {
                    AttemptStatus::Completed
                });
            }
        }
        self.finish();
        self.summary.as_ref()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&WorkoutSummary> {
        self.summary.as_ref()
    }

    pub fn take_summary(&mut self) -> Option<WorkoutSummary> {
        self.summary.take()
    }

    /// Drop the loaded plan and return to `Idle`. The configured rest is kept.
    pub fn reset(&mut self) {
        self.exercises.clear();
        self.attempts.clear();
        self.goal = None;
        self.budget_check = None;
        self.phase = Phase::Idle;
        self.exercise_idx = 0;
        self.current_set = 1;
        self.paused = false;
        self.set_elapsed = Duration::zero();
        self.exercise_elapsed = Duration::zero();
        self.session_elapsed = Duration::zero();
        self.rest_remaining = Duration::zero();
        self.total_sets_completed = 0;
        self.started_at = None;
        self.summary = None;
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn exercises(&self) -> &[LiveExercise] {
        &self.exercises
    }

    #[must_use]
    pub fn attempts(&self) -> &[Option<AttemptStatus>] {
        &self.attempts
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<&LiveExercise> {
        match self.phase {
            Phase::Idle | Phase::Ended => None,
            _ => self.exercises.get(self.exercise_idx),
        }
    }

    #[must_use]
    pub fn exercise_index(&self) -> usize {
        self.exercise_idx
    }

    #[must_use]
    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    #[must_use]
    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    #[must_use]
    pub fn rest_remaining(&self) -> Duration {
        self.rest_remaining
    }

    #[must_use]
    pub fn set_elapsed(&self) -> Duration {
        self.set_elapsed
    }

    #[must_use]
    pub fn exercise_elapsed(&self) -> Duration {
        self.exercise_elapsed
    }

    #[must_use]
    pub fn session_elapsed(&self) -> Duration {
        self.session_elapsed
    }

    #[must_use]
    pub fn total_sets_completed(&self) -> u32 {
        self.total_sets_completed
    }

    #[must_use]
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }

    #[must_use]
    pub fn budget_check(&self) -> Option<BudgetCheck> {
        self.budget_check
    }

    /// Share of planned sets already completed.
    #[must_use]
    pub fn completion(&self) -> f64 {
        completion_percentage(self.total_sets_completed, self.total_sets())
    }

    #[must_use]
    pub fn progress_text(&self) -> String {
        match self.current_exercise() {
            Some(exercise) => format!(
                "Exercise {}/{} · Set {}/{}",
                self.exercise_idx + 1,
                self.exercises.len(),
                self.current_set,
                exercise.sets
            ),
            None => String::new(),
        }
    }

    #[must_use]
    pub fn tempo_hint(&self) -> String {
        match self.phase {
            Phase::InSet => self.current_exercise().map_or_else(String::new, |exercise| {
                tempo_hint(exercise, self.set_elapsed)
            }),
            Phase::RestBetweenSets => format!(
                "Rest and breathe: {}s until set {}",
                ceil_seconds(self.rest_remaining),
                self.current_set + 1
            ),
            Phase::RestBetweenExercises => {
                let next = self
                    .exercises
                    .get(self.exercise_idx + 1)
                    .map_or_else(String::new, |e| e.name.to_string());
                format!(
                    "Rest and breathe: {}s until {next}",
                    ceil_seconds(self.rest_remaining)
                )
            }
            Phase::Idle | Phase::Ready | Phase::Ended => String::new(),
        }
    }

    fn rest_duration(&self) -> Duration {
        Duration::seconds(i64::from(self.rest_seconds))
    }

    fn begin_exercise(&mut self, index: usize) {
        if index >= self.exercises.len() {
            self.finish();
            return;
        }
        self.exercise_idx = index;
        self.current_set = 1;
        self.set_elapsed = Duration::zero();
        self.exercise_elapsed = Duration::zero();
        self.rest_remaining = Duration::zero();
        self.phase = Phase::InSet;
        debug!("starting exercise {}", self.exercises[index].name);
    }

    fn finish_set(&mut self, auto: bool) {
        let Some(sets) = self.current_exercise().map(|e| e.sets) else {
            return;
        };
        self.total_sets_completed += 1;
        debug!(
            "completed set {}/{sets} ({})",
            self.current_set,
            if auto { "timer" } else { "manual" }
        );
        if self.current_set < sets {
            self.set_elapsed = Duration::zero();
            self.rest_remaining = self.rest_duration();
            self.phase = Phase::RestBetweenSets;
        } else {
            self.finish_exercise(AttemptStatus::Completed);
        }
    }

    fn finish_exercise(&mut self, status: AttemptStatus) {
        if let Some(slot) = self.attempts.get_mut(self.exercise_idx) {
            if slot.is_none() {
                *slot = Some(status);
            }
        }
        if self.exercise_idx + 1 < self.exercises.len() {
            self.set_elapsed = Duration::zero();
            self.rest_remaining = self.rest_duration();
            self.phase = Phase::RestBetweenExercises;
        } else {
            self.finish();
        }
    }

    fn finish(&mut self) {
        for slot in &mut self.attempts {
            if slot.is_none() {
                *slot = Some(AttemptStatus::Skipped);
            }
        }
        let now = self.clock.now();
        let started_at = self.started_at.unwrap_or(now);
        let duration_seconds =
            u32::try_from(now.signed_duration_since(started_at).num_seconds()).unwrap_or(0);
        let summary = WorkoutSummary {
            performed_at: started_at,
            duration_seconds,
            goal: self.goal,
            total_sets_completed: self.total_sets_completed,
            attempts: self
                .exercises
                .iter()
                .zip(&self.attempts)
                .map(|(exercise, status)| Attempt {
                    name: exercise.name.clone(),
                    status: status.unwrap_or(AttemptStatus::Skipped),
                })
                .collect(),
        };
        info!(
            "session ended after {} with {} of {} exercises completed",
            summary.duration_text(),
            summary.completed_count(),
            summary.attempts.len()
        );
        self.paused = false;
        self.rest_remaining = Duration::zero();
        self.phase = Phase::Ended;
        self.summary = Some(summary);
    }
}

/// Percentage of `done` in `total`, capped at 100 and rounded to one decimal.
#[must_use]
pub fn completion_percentage(done: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percentage = (f64::from(done) / f64::from(total) * 100.0).min(100.0);
    (percentage * 10.0).round() / 10.0
}

fn tempo_hint(exercise: &LiveExercise, elapsed: Duration) -> String {
    if exercise.volume.hold.is_some() {
        return format!(
            "Hold steady: {}s of {}s",
            elapsed.num_seconds(),
            exercise.set_seconds
        );
    }
    let reps = exercise.volume.reps.map_or(0, u32::from);
    let target = exercise.set_target().num_milliseconds();
    if reps == 0 || target <= 0 {
        return String::new();
    }
    let repetition =
        (elapsed.num_milliseconds() * i64::from(reps) / target + 1).min(i64::from(reps));
    format!("Move with control: repetition {repetition} of {reps}")
}

fn ceil_seconds(duration: Duration) -> i64 {
    (duration.num_milliseconds() + 999).div_euclid(1000).max(0)
}
