use log::debug;

use crate::{Candidate, Goal, Name, Volume};

#[derive(Debug, Clone, PartialEq)]
pub struct PlanItem {
    pub name: Name,
    pub equipment: Vec<String>,
    pub muscles: Vec<String>,
    pub volume: Volume,
    pub goal: Goal,
    pub estimated_minutes: u32,
}

impl From<&Candidate> for PlanItem {
    fn from(value: &Candidate) -> Self {
        Self {
            name: value.exercise.name.clone(),
            equipment: value.exercise.equipment.clone(),
            muscles: value.exercise.muscles.clone(),
            volume: value.recommendation.volume,
            goal: value.recommendation.goal,
            estimated_minutes: value.estimated_minutes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanningConfig {
    /// Fraction by which a plan may exceed the budget, e.g. `0.1` for 10 %.
    pub budget_tolerance: f64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            budget_tolerance: 0.10,
        }
    }
}

/// Time available for a training session in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget(u32);

impl Budget {
    pub fn new(minutes: u32) -> Result<Self, BudgetError> {
        if minutes == 0 {
            return Err(BudgetError::Invalid);
        }
        Ok(Self(minutes))
    }

    #[must_use]
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl TryFrom<&str> for Budget {
    type Error = BudgetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(minutes) => Budget::new(minutes),
            Err(_) => Err(BudgetError::Invalid),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BudgetError {
    #[error("Budget must be a positive number of minutes")]
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetCheck {
    pub total_minutes: u32,
    pub budget_minutes: u32,
    pub limit_minutes: f64,
    pub within_budget: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("{0} is already in the plan")]
    Duplicate(Name),
    #[error("{0} is not in the plan")]
    NotInPlan(Name),
    #[error("{0} is not a candidate for the current goal")]
    NotACandidate(Name),
    #[error("No goal selected")]
    NoGoal,
}

/// Ordered list of exercises queued for a session.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Plan {
    items: Vec<PlanItem>,
}

impl Plan {
    #[must_use]
    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &Name) -> bool {
        self.position(name).is_some()
    }

    #[must_use]
    pub fn position(&self, name: &Name) -> Option<usize> {
        self.items.iter().position(|i| i.name == *name)
    }

    /// The goal shared by all items.
    #[must_use]
    pub fn goal(&self) -> Option<Goal> {
        self.items.first().map(|i| i.goal)
    }

    pub fn add(&mut self, item: PlanItem) -> Result<(), PlanError> {
        if self.contains(&item.name) {
            return Err(PlanError::Duplicate(item.name));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn remove(&mut self, name: &Name) -> Result<PlanItem, PlanError> {
        match self.position(name) {
            Some(index) => Ok(self.items.remove(index)),
            None => Err(PlanError::NotInPlan(name.clone())),
        }
    }

    /// Shift an item by one position. Returns the new index.
    pub fn move_item(&mut self, name: &Name, direction: Direction) -> Result<usize, PlanError> {
        let index = self
            .position(name)
            .ok_or_else(|| PlanError::NotInPlan(name.clone()))?;
        let target = match direction {
            Direction::Up => index.saturating_sub(1),
            Direction::Down => (index + 1).min(self.items.len() - 1),
        };
        self.items.swap(index, target);
        Ok(target)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Switch the plan to another goal. A plan holds exercises of a single
    /// goal, so items of a different goal cause the plan to be cleared.
    /// Returns whether the plan was cleared.
    pub fn select_goal(&mut self, goal: Goal) -> bool {
        if self.items.iter().any(|i| i.goal != goal) {
            debug!("clearing plan of {} items for goal {goal}", self.items.len());
            self.items.clear();
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn total_minutes(&self) -> u32 {
        self.items.iter().map(|i| i.estimated_minutes).sum()
    }

    #[must_use]
    pub fn validate(&self, budget: Budget, config: &PlanningConfig) -> BudgetCheck {
        let total_minutes = self.total_minutes();
        let limit_minutes = f64::from(budget.minutes()) * (1.0 + config.budget_tolerance);
        BudgetCheck {
            total_minutes,
            budget_minutes: budget.minutes(),
            limit_minutes,
            within_budget: f64::from(total_minutes) <= limit_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{EstimatorConfig, Exercise, GoalRecommendation, Rating, Reps, Sets};

    use super::*;

    fn item(name: &str, minutes: u32) -> PlanItem {
        PlanItem {
            name: Name::new(name).unwrap(),
            equipment: vec![],
            muscles: vec![],
            volume: Volume::default(),
            goal: Goal::MuscleBuilding,
            estimated_minutes: minutes,
        }
    }

    fn plan(items: &[(&str, u32)]) -> Plan {
        let mut plan = Plan::default();
        for (name, minutes) in items {
            plan.add(item(name, *minutes)).unwrap();
        }
        plan
    }

    fn names(plan: &Plan) -> Vec<&str> {
        plan.items().iter().map(|i| i.name.as_str()).collect()
    }

    fn name(name: &str) -> Name {
        Name::new(name).unwrap()
    }

    #[test]
    fn test_plan_add_duplicate() {
        let mut plan = plan(&[("Push-Up", 2)]);

        assert_eq!(
            plan.add(item("Push-Up", 3)),
            Err(PlanError::Duplicate(name("Push-Up")))
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.items()[0].estimated_minutes, 2);
    }

    #[test]
    fn test_plan_remove() {
        let mut plan = plan(&[("A", 1), ("B", 2), ("C", 3)]);

        assert_eq!(plan.remove(&name("B")), Ok(item("B", 2)));
        assert_eq!(names(&plan), ["A", "C"]);
        assert_eq!(
            plan.remove(&name("B")),
            Err(PlanError::NotInPlan(name("B")))
        );
    }

    #[test]
    fn test_plan_remove_and_add_again() {
        let candidate = Candidate::new(
            Exercise {
                name: name("Bench Press"),
                description: String::from("Press"),
                instructions: String::new(),
                equipment: vec![String::from("Barbell")],
                muscles: vec![String::from("Chest")],
                icon: String::new(),
            },
            GoalRecommendation {
                goal: Goal::MuscleBuilding,
                rating: Rating::new(9).unwrap(),
                volume: Volume {
                    sets: Some(Sets::new(4).unwrap()),
                    reps: Some(Reps::new(8).unwrap()),
                    hold: None,
                },
            },
            None,
            &EstimatorConfig::default(),
        );
        let mut plan = plan(&[("A", 1)]);
        plan.add(PlanItem::from(&candidate)).unwrap();
        let before = plan.items()[1].clone();

        let removed = plan.remove(&name("Bench Press")).unwrap();
        plan.add(PlanItem::from(&candidate)).unwrap();

        assert_eq!(removed, before);
        assert_eq!(plan.items()[1], before);
    }

    #[rstest]
    #[case("A", Direction::Up, 0, &["A", "B", "C"])]
    #[case("A", Direction::Down, 1, &["B", "A", "C"])]
    #[case("B", Direction::Up, 0, &["B", "A", "C"])]
    #[case("B", Direction::Down, 2, &["A", "C", "B"])]
    #[case("C", Direction::Down, 2, &["A", "B", "C"])]
    fn test_plan_move_item(
        #[case] item: &str,
        #[case] direction: Direction,
        #[case] expected_index: usize,
        #[case] expected_order: &[&str],
    ) {
        let mut plan = plan(&[("A", 1), ("B", 2), ("C", 3)]);

        assert_eq!(plan.move_item(&name(item), direction), Ok(expected_index));
        assert_eq!(names(&plan), expected_order);
    }

    #[test]
    fn test_plan_move_unknown_item() {
        let mut plan = plan(&[("A", 1)]);

        assert_eq!(
            plan.move_item(&name("X"), Direction::Up),
            Err(PlanError::NotInPlan(name("X")))
        );
    }

    #[test]
    fn test_plan_select_goal() {
        let mut plan = plan(&[("A", 1), ("B", 2)]);

        assert!(!plan.select_goal(Goal::MuscleBuilding));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.goal(), Some(Goal::MuscleBuilding));

        assert!(plan.select_goal(Goal::WeightLoss));
        assert!(plan.is_empty());
        assert_eq!(plan.goal(), None);
    }

    #[rstest]
    #[case(&[("A", 10), ("B", 10), ("C", 10)], 30, true)]
    #[case(&[("A", 11), ("B", 11), ("C", 11)], 30, true)]
    #[case(&[("A", 12), ("B", 12), ("C", 12)], 30, false)]
    #[case(&[("A", 3)], 30, true)]
    #[case(&[], 1, true)]
    fn test_plan_validate(
        #[case] items: &[(&str, u32)],
        #[case] budget: u32,
        #[case] within_budget: bool,
    ) {
        let check = plan(items).validate(Budget::new(budget).unwrap(), &PlanningConfig::default());

        assert_eq!(check.within_budget, within_budget);
        assert_eq!(check.budget_minutes, budget);
        assert_eq!(check.total_minutes, items.iter().map(|(_, m)| m).sum::<u32>());
    }

    #[test]
    fn test_plan_validate_strict() {
        let check = plan(&[("A", 31)]).validate(
            Budget::new(30).unwrap(),
            &PlanningConfig {
                budget_tolerance: 0.0,
            },
        );

        assert!(!check.within_budget);
    }

    #[rstest]
    #[case("30", Ok(Budget(30)))]
    #[case(" 45 ", Ok(Budget(45)))]
    #[case("0", Err(BudgetError::Invalid))]
    #[case("-5", Err(BudgetError::Invalid))]
    #[case("soon", Err(BudgetError::Invalid))]
    fn test_budget_try_from(#[case] value: &str, #[case] expected: Result<Budget, BudgetError>) {
        assert_eq!(Budget::try_from(value), expected);
    }
}
