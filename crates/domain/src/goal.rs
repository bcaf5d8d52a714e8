use std::{fmt, slice::Iter, str::FromStr};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Goal {
    MuscleBuilding,
    WeightLoss,
    StrengthIncrease,
    EnduranceIncrease,
}

impl Goal {
    /// Identifier used in stored records, e.g. `muscle_building`.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Goal::MuscleBuilding => "muscle_building",
            Goal::WeightLoss => "weight_loss",
            Goal::StrengthIncrease => "strength_increase",
            Goal::EnduranceIncrease => "endurance_increase",
        }
    }
}

impl Property for Goal {
    fn iter() -> Iter<'static, Goal> {
        static GOALS: [Goal; 4] = [
            Goal::MuscleBuilding,
            Goal::WeightLoss,
            Goal::StrengthIncrease,
            Goal::EnduranceIncrease,
        ];
        GOALS.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Goal::MuscleBuilding => "Muscle Building",
            Goal::WeightLoss => "Weight Loss",
            Goal::StrengthIncrease => "Strength Increase",
            Goal::EnduranceIncrease => "Endurance Increase",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Goal {
    type Err = GoalError;

    /// Accepts both the code (`weight_loss`) and the label (`Weight Loss`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        Goal::iter()
            .find(|goal| goal.code() == key)
            .copied()
            .ok_or_else(|| GoalError::Unknown(s.trim().to_string()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GoalError {
    #[error("Unknown goal: {0}")]
    Unknown(String),
}

pub trait Property: Clone + Copy + Sized {
    fn iter() -> Iter<'static, Self>;
    fn name(self) -> &'static str;
}
