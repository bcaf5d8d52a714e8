use std::{collections::BTreeMap, str::FromStr};

use chrono::NaiveDate;
use forma_domain::{self as domain, Property};
use log::warn;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use uuid::Uuid;

/// Rating of a goal for which the catalog does not state one.
pub const DEFAULT_GOAL_RATING: u8 = 5;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Database {
    pub users: Vec<User>,
    pub exercises: Vec<Exercise>,
    pub workouts: Vec<Workout>,
}

#[derive(
    Serialize, Deserialize, AsRefStr, EnumString, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Goal {
    MuscleBuilding,
    WeightLoss,
    StrengthIncrease,
    EnduranceIncrease,
}

impl From<domain::Goal> for Goal {
    fn from(value: domain::Goal) -> Self {
        match value {
            domain::Goal::MuscleBuilding => Goal::MuscleBuilding,
            domain::Goal::WeightLoss => Goal::WeightLoss,
            domain::Goal::StrengthIncrease => Goal::StrengthIncrease,
            domain::Goal::EnduranceIncrease => Goal::EnduranceIncrease,
        }
    }
}

impl From<Goal> for domain::Goal {
    fn from(value: Goal) -> Self {
        match value {
            Goal::MuscleBuilding => domain::Goal::MuscleBuilding,
            Goal::WeightLoss => domain::Goal::WeightLoss,
            Goal::StrengthIncrease => domain::Goal::StrengthIncrease,
            Goal::EnduranceIncrease => domain::Goal::EnduranceIncrease,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub preferred_goal: Option<Goal>,
}

impl From<&domain::User> for User {
    fn from(value: &domain::User) -> Self {
        Self {
            id: *value.id,
            username: value.username.to_string(),
            display_name: Some(value.display_name.clone()),
            preferred_goal: value.preferred_goal.map(Goal::from),
        }
    }
}

impl TryFrom<User> for domain::User {
    type Error = domain::NameError;

    fn try_from(value: User) -> Result<Self, Self::Error> {
        Ok(domain::User::new(
            value.id.into(),
            domain::Name::new(&value.username)?,
            value.display_name,
            value.preferred_goal.map(domain::Goal::from),
        ))
    }
}

/// Equipment or muscle groups, either as free text or as a list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Tags {
    Text(String),
    List(Vec<String>),
}

impl Default for Tags {
    fn default() -> Self {
        Tags::List(vec![])
    }
}

impl Tags {
    fn text(&self) -> String {
        match self {
            Tags::Text(text) => text.clone(),
            Tags::List(list) => list.join(", "),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Recommendation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold: Option<u32>,
}

impl Recommendation {
    fn to_domain(self, goal: domain::Goal) -> Result<domain::GoalRecommendation, DtoError> {
        Ok(domain::GoalRecommendation {
            goal,
            rating: domain::Rating::new(self.rating.unwrap_or(DEFAULT_GOAL_RATING))?,
            volume: domain::Volume {
                sets: self.sets.map(domain::Sets::new).transpose()?,
                reps: self.reps.map(domain::Reps::new).transpose()?,
                hold: self.hold.map(domain::Time::new).transpose()?,
            },
        })
    }
}

impl From<&domain::GoalRecommendation> for Recommendation {
    fn from(value: &domain::GoalRecommendation) -> Self {
        Self {
            rating: Some(u8::from(value.rating)),
            sets: value.volume.sets.map(u32::from),
            reps: value.volume.reps.map(u32::from),
            hold: value.volume.hold.map(u32::from),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub equipment: Tags,
    #[serde(default)]
    pub muscles: Tags,
    #[serde(default)]
    pub icon: String,
    /// Recommendations keyed by goal code.
    #[serde(default)]
    pub recommendations: BTreeMap<String, Recommendation>,
}

impl Exercise {
    /// Recommendation for a goal. Goals without an entry get the default
    /// rating and no volume.
    pub fn recommendation(
        &self,
        goal: domain::Goal,
    ) -> Result<domain::GoalRecommendation, DtoError> {
        self.recommendations()
            .get(&Goal::from(goal))
            .copied()
            .unwrap_or_default()
            .to_domain(goal)
    }

    /// Recommendations for every goal.
    pub fn all_recommendations(&self) -> Result<Vec<domain::GoalRecommendation>, DtoError> {
        domain::Goal::iter()
            .map(|goal| self.recommendation(*goal))
            .collect()
    }

    fn recommendations(&self) -> BTreeMap<Goal, Recommendation> {
        self.recommendations
            .iter()
            .filter_map(|(key, recommendation)| match Goal::from_str(key.trim()) {
                Ok(goal) => Some((goal, *recommendation)),
                Err(_) => {
                    warn!("ignoring recommendation of {} for unknown goal {key}", self.name);
                    None
                }
            })
            .collect()
    }
}

impl TryFrom<&Exercise> for domain::Exercise {
    type Error = DtoError;

    fn try_from(value: &Exercise) -> Result<Self, Self::Error> {
        let equipment = value.equipment.text();
        let muscles = value.muscles.text();
        Ok(Self {
            name: domain::Name::new(&value.name)?,
            description: value.description.trim().to_string(),
            instructions: value.instructions.trim().to_string(),
            equipment: domain::tag::normalize_equipment(&equipment),
            muscles: domain::tag::normalize_muscles(&muscles),
            icon: value.icon.clone(),
        })
    }
}

impl From<(&domain::Exercise, &[domain::GoalRecommendation])> for Exercise {
    fn from((exercise, recommendations): (&domain::Exercise, &[domain::GoalRecommendation])) -> Self {
        Self {
            name: exercise.name.to_string(),
            description: exercise.description.clone(),
            instructions: exercise.instructions.clone(),
            equipment: Tags::Text(domain::tag::format_tags(&exercise.equipment)),
            muscles: Tags::Text(domain::tag::format_tags(&exercise.muscles)),
            icon: exercise.icon.clone(),
            recommendations: recommendations
                .iter()
                .map(|r| (Goal::from(r.goal).as_ref().to_string(), Recommendation::from(r)))
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Completed,
    Skipped,
}

impl From<domain::AttemptStatus> for AttemptStatus {
    fn from(value: domain::AttemptStatus) -> Self {
        match value {
            domain::AttemptStatus::Completed => AttemptStatus::Completed,
            domain::AttemptStatus::Skipped => AttemptStatus::Skipped,
        }
    }
}

impl From<AttemptStatus> for domain::AttemptStatus {
    fn from(value: AttemptStatus) -> Self {
        match value {
            AttemptStatus::Completed => domain::AttemptStatus::Completed,
            AttemptStatus::Skipped => domain::AttemptStatus::Skipped,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub name: String,
    pub status: AttemptStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub performed_at: NaiveDate,
    pub duration_minutes: u32,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub total_sets_completed: u32,
    pub exercises: Vec<Attempt>,
}

impl From<&domain::Workout> for Workout {
    fn from(value: &domain::Workout) -> Self {
        Self {
            id: *value.id,
            user_id: *value.user_id,
            performed_at: value.performed_at,
            duration_minutes: value.duration_minutes,
            duration_seconds: Some(value.duration_seconds),
            goal: value.goal.map(Goal::from),
            total_sets_completed: value.total_sets_completed,
            exercises: value
                .attempts
                .iter()
                .map(|a| Attempt {
                    name: a.name.to_string(),
                    status: a.status.into(),
                })
                .collect(),
        }
    }
}

impl TryFrom<Workout> for domain::Workout {
    type Error = DtoError;

    fn try_from(value: Workout) -> Result<Self, Self::Error> {
        if value.duration_minutes == 0 {
            return Err(DtoError::InvalidDuration);
        }
        if value.exercises.is_empty() {
            return Err(domain::WorkoutError::NoExercises.into());
        }
        Ok(Self {
            id: value.id.into(),
            user_id: value.user_id.into(),
            performed_at: value.performed_at,
            duration_minutes: value.duration_minutes,
            duration_seconds: value
                .duration_seconds
                .unwrap_or(value.duration_minutes * 60),
            goal: value.goal.map(domain::Goal::from),
            total_sets_completed: value.total_sets_completed,
            attempts: value
                .exercises
                .into_iter()
                .map(|a| {
                    Ok(domain::Attempt {
                        name: domain::Name::new(&a.name)?,
                        status: a.status.into(),
                    })
                })
                .collect::<Result<Vec<_>, DtoError>>()?,
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DtoError {
    #[error(transparent)]
    InvalidName(#[from] domain::NameError),
    #[error(transparent)]
    InvalidRating(#[from] domain::RatingError),
    #[error(transparent)]
    InvalidVolume(#[from] domain::VolumeError),
    #[error(transparent)]
    InvalidWorkout(#[from] domain::WorkoutError),
    #[error("Duration must be positive")]
    InvalidDuration,
}
