use std::collections::BTreeSet;

use derive_more::{Display, Into};

use crate::{Goal, Name, ReadError};

pub trait CatalogService {
    fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    fn get_recommendations(
        &self,
        goal: Goal,
    ) -> Result<Vec<(Exercise, GoalRecommendation)>, ReadError>;
}

pub trait CatalogRepository {
    fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    fn read_recommendations(
        &self,
        goal: Goal,
    ) -> Result<Vec<(Exercise, GoalRecommendation)>, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub name: Name,
    pub description: String,
    pub instructions: String,
    pub equipment: Vec<String>,
    pub muscles: Vec<String>,
    pub icon: String,
}

impl Exercise {
    #[must_use]
    pub fn has_equipment(&self, equipment: &str) -> bool {
        self.equipment
            .iter()
            .any(|e| e.eq_ignore_ascii_case(equipment.trim()))
    }

    #[must_use]
    pub fn targets(&self, muscle: &str) -> bool {
        self.muscles
            .iter()
            .any(|m| m.eq_ignore_ascii_case(muscle.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalRecommendation {
    pub goal: Goal,
    pub rating: Rating,
    pub volume: Volume,
}

/// Suitability of an exercise for a goal.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const DEFAULT: Rating = Rating(5);
    pub const MIN: Rating = Rating(1);
    pub const MAX: Rating = Rating(10);

    pub fn new(value: u8) -> Result<Self, RatingError> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&value) {
            return Err(RatingError::OutOfRange(value));
        }

        Ok(Self(value))
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Rating> for f64 {
    fn from(value: Rating) -> Self {
        f64::from(value.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RatingError {
    #[error("Rating must be in the range 1 to 10 ({0})")]
    OutOfRange(u8),
}

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sets(u32);

impl Sets {
    pub const ONE: Sets = Sets(1);

    pub fn new(value: u32) -> Result<Self, VolumeError> {
        if !(1..100).contains(&value) {
            return Err(VolumeError::SetsOutOfRange);
        }

        Ok(Self(value))
    }
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, VolumeError> {
        if !(0..1000).contains(&value) {
            return Err(VolumeError::RepsOutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = VolumeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(VolumeError::ParseError),
        }
    }
}

/// Duration of a hold in seconds.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(u32);

impl Time {
    pub fn new(value: u32) -> Result<Self, VolumeError> {
        if !(0..3600).contains(&value) {
            return Err(VolumeError::TimeOutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Time {
    type Error = VolumeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Time::new(parsed_value),
            Err(_) => Err(VolumeError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum VolumeError {
    #[error("Sets must be in the range 1 to 99")]
    SetsOutOfRange,
    #[error("Reps must be in the range 0 to 999")]
    RepsOutOfRange,
    #[error("Time must be in the range 0 to 3599 s")]
    TimeOutOfRange,
    #[error("Value must be an integer")]
    ParseError,
}

/// Recommended amount of work for an exercise. Every part is optional.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    pub sets: Option<Sets>,
    pub reps: Option<Reps>,
    pub hold: Option<Time>,
}

impl Volume {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_none() && self.reps.is_none() && self.hold.is_none()
    }

    /// Number of sets to perform, at least one.
    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.sets.map_or(1, u32::from).max(1)
    }

    #[must_use]
    pub fn description(&self) -> String {
        let mut parts = vec![];
        match (self.sets, self.reps) {
            (Some(sets), Some(reps)) => parts.push(format!("{sets} sets x {reps} reps")),
            (Some(sets), None) => parts.push(format!("{sets} sets")),
            _ => {}
        }
        if let Some(hold) = self.hold {
            parts.push(format!("{hold}s hold"));
        }
        if parts.is_empty() {
            String::from("Adjust volume to preference")
        } else {
            parts.join(" • ")
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExerciseFilter {
    pub goal: Option<Goal>,
    pub muscle: Option<String>,
    pub equipment: Option<String>,
}

impl ExerciseFilter {
    #[must_use]
    pub fn entries<'a>(
        &self,
        entries: impl Iterator<Item = &'a (Exercise, GoalRecommendation)>,
    ) -> Vec<&'a (Exercise, GoalRecommendation)> {
        entries
            .filter(|(exercise, recommendation)| {
                self.goal.is_none_or(|goal| recommendation.goal == goal)
                    && self
                        .muscle
                        .as_ref()
                        .is_none_or(|muscle| exercise.targets(muscle))
                    && self
                        .equipment
                        .as_ref()
                        .is_none_or(|equipment| exercise.has_equipment(equipment))
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.goal.is_none() && self.muscle.is_none() && self.equipment.is_none()
    }
}

/// Distinct muscle tags of all exercises in alphabetical order.
#[must_use]
pub fn muscle_options<'a>(exercises: impl Iterator<Item = &'a Exercise>) -> Vec<String> {
    exercises
        .flat_map(|e| e.muscles.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct equipment tags of all exercises in alphabetical order.
#[must_use]
pub fn equipment_options<'a>(exercises: impl Iterator<Item = &'a Exercise>) -> Vec<String> {
    exercises
        .flat_map(|e| e.equipment.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn exercise(name: &str, equipment: &[&str], muscles: &[&str]) -> Exercise {
        Exercise {
            name: Name::new(name).unwrap(),
            description: String::new(),
            instructions: String::new(),
            equipment: equipment.iter().map(ToString::to_string).collect(),
            muscles: muscles.iter().map(ToString::to_string).collect(),
            icon: String::new(),
        }
    }

    fn recommendation(goal: Goal) -> GoalRecommendation {
        GoalRecommendation {
            goal,
            rating: Rating::DEFAULT,
            volume: Volume::default(),
        }
    }

    #[rstest]
    #[case(0, Err(RatingError::OutOfRange(0)))]
    #[case(1, Ok(Rating(1)))]
    #[case(10, Ok(Rating(10)))]
    #[case(11, Err(RatingError::OutOfRange(11)))]
    fn test_rating_new(#[case] value: u8, #[case] expected: Result<Rating, RatingError>) {
        assert_eq!(Rating::new(value), expected);
    }

    #[rstest]
    #[case(0, Err(VolumeError::SetsOutOfRange))]
    #[case(1, Ok(Sets(1)))]
    #[case(99, Ok(Sets(99)))]
    #[case(100, Err(VolumeError::SetsOutOfRange))]
    fn test_sets_new(#[case] value: u32, #[case] expected: Result<Sets, VolumeError>) {
        assert_eq!(Sets::new(value), expected);
    }

    #[rstest]
    #[case("12", Ok(Reps(12)))]
    #[case("1000", Err(VolumeError::RepsOutOfRange))]
    #[case("twelve", Err(VolumeError::ParseError))]
    fn test_reps_try_from(#[case] value: &str, #[case] expected: Result<Reps, VolumeError>) {
        assert_eq!(Reps::try_from(value), expected);
    }

    #[rstest]
    #[case("45", Ok(Time(45)))]
    #[case("3600", Err(VolumeError::TimeOutOfRange))]
    #[case("-1", Err(VolumeError::ParseError))]
    fn test_time_try_from(#[case] value: &str, #[case] expected: Result<Time, VolumeError>) {
        assert_eq!(Time::try_from(value), expected);
    }

    #[rstest]
    #[case(Volume { sets: Some(Sets(3)), reps: Some(Reps(10)), hold: None }, "3 sets x 10 reps")]
    #[case(Volume { sets: Some(Sets(3)), reps: None, hold: None }, "3 sets")]
    #[case(Volume { sets: Some(Sets(3)), reps: None, hold: Some(Time(30)) }, "3 sets • 30s hold")]
    #[case(Volume { sets: None, reps: Some(Reps(10)), hold: None }, "Adjust volume to preference")]
    #[case(Volume::default(), "Adjust volume to preference")]
    fn test_volume_description(#[case] volume: Volume, #[case] expected: &str) {
        assert_eq!(volume.description(), expected);
    }

    #[rstest]
    #[case(Volume::default(), 1)]
    #[case(Volume { sets: Some(Sets(4)), reps: None, hold: None }, 4)]
    fn test_volume_num_sets(#[case] volume: Volume, #[case] expected: u32) {
        assert_eq!(volume.num_sets(), expected);
    }

    #[test]
    fn test_exercise_filter_entries() {
        let entries = vec![
            (
                exercise("Push-Up", &["Bodyweight"], &["Chest", "Triceps"]),
                recommendation(Goal::MuscleBuilding),
            ),
            (
                exercise("Goblet Squat", &["Kettlebell"], &["Legs"]),
                recommendation(Goal::MuscleBuilding),
            ),
            (
                exercise("Push-Up", &["Bodyweight"], &["Chest", "Triceps"]),
                recommendation(Goal::EnduranceIncrease),
            ),
        ];

        assert_eq!(ExerciseFilter::default().entries(entries.iter()).len(), 3);
        assert!(ExerciseFilter::default().is_empty());

        let filter = ExerciseFilter {
            goal: Some(Goal::MuscleBuilding),
            muscle: Some(String::from("chest")),
            equipment: None,
        };
        let filtered = filter.entries(entries.iter());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].0.name.as_ref(), "Push-Up");
        assert!(!filter.is_empty());

        let filter = ExerciseFilter {
            goal: None,
            muscle: None,
            equipment: Some(String::from("Kettlebell")),
        };
        assert_eq!(filter.entries(entries.iter()).len(), 1);
    }

    #[test]
    fn test_options() {
        let exercises = [
            exercise("Push-Up", &["Bodyweight"], &["Chest", "Triceps"]),
            exercise("Goblet Squat", &["Kettlebell"], &["Legs"]),
            exercise("Plank", &["Bodyweight", "Mat"], &["Core"]),
        ];

        assert_eq!(
            muscle_options(exercises.iter()),
            ["Chest", "Core", "Legs", "Triceps"]
        );
        assert_eq!(
            equipment_options(exercises.iter()),
            ["Bodyweight", "Kettlebell", "Mat"]
        );
    }
}
