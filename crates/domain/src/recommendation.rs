use std::collections::BTreeMap;

use crate::{EstimatorConfig, Exercise, Goal, GoalRecommendation, Name, Plan, Rating};

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub exercise: Exercise,
    pub recommendation: GoalRecommendation,
    pub estimated_minutes: u32,
    pub score: f64,
}

impl Candidate {
    #[must_use]
    pub fn new(
        exercise: Exercise,
        recommendation: GoalRecommendation,
        recency_days: Option<i64>,
        estimator: &EstimatorConfig,
    ) -> Self {
        Self {
            estimated_minutes: estimator.planning_minutes(&recommendation.volume),
            score: score(recommendation.rating, recency_days),
            exercise,
            recommendation,
        }
    }

    #[must_use]
    pub fn name(&self) -> &Name {
        &self.exercise.name
    }
}

/// Adjustment rewarding exercises which were not performed recently.
#[must_use]
pub fn recency_bonus(recency_days: Option<i64>) -> f64 {
    match recency_days {
        None => 2.0,
        Some(days) if days > 14 => 1.0,
        Some(7..=14) => 0.5,
        Some(days) if days <= 3 => -1.0,
        Some(_) => 0.0,
    }
}

#[must_use]
pub fn score(rating: Rating, recency_days: Option<i64>) -> f64 {
    ((f64::from(rating) + recency_bonus(recency_days)) * 100.0).round() / 100.0
}

/// Build the candidate pool for a goal.
///
/// Entries for other goals and exercises already in the plan are left out.
/// The result is ordered by descending score, ties by name.
#[must_use]
pub fn rank(
    entries: Vec<(Exercise, GoalRecommendation)>,
    goal: Goal,
    recency: &BTreeMap<Name, i64>,
    plan: &Plan,
    estimator: &EstimatorConfig,
) -> Vec<Candidate> {
    let mut candidates = entries
        .into_iter()
        .filter(|(exercise, recommendation)| {
            recommendation.goal == goal && !plan.contains(&exercise.name)
        })
        .map(|(exercise, recommendation)| {
            let recency_days = recency.get(&exercise.name).copied();
            Candidate::new(exercise, recommendation, recency_days, estimator)
        })
        .collect::<Vec<_>>();
    sort(&mut candidates);
    candidates
}

pub fn sort(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.name().cmp(b.name()))
    });
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{PlanItem, Reps, Sets, Volume};

    use super::*;

    fn entry(name: &str, goal: Goal, rating: u8) -> (Exercise, GoalRecommendation) {
        (
            Exercise {
                name: Name::new(name).unwrap(),
                description: String::new(),
                instructions: String::new(),
                equipment: vec![],
                muscles: vec![],
                icon: String::new(),
            },
            GoalRecommendation {
                goal,
                rating: Rating::new(rating).unwrap(),
                volume: Volume {
                    sets: Some(Sets::new(3).unwrap()),
                    reps: Some(Reps::new(10).unwrap()),
                    hold: None,
                },
            },
        )
    }

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name().as_str()).collect()
    }

    #[rstest]
    #[case(None, 7.0)]
    #[case(Some(20), 6.0)]
    #[case(Some(15), 6.0)]
    #[case(Some(14), 5.5)]
    #[case(Some(10), 5.5)]
    #[case(Some(7), 5.5)]
    #[case(Some(6), 5.0)]
    #[case(Some(5), 5.0)]
    #[case(Some(4), 5.0)]
    #[case(Some(3), 4.0)]
    #[case(Some(2), 4.0)]
    #[case(Some(0), 4.0)]
    fn test_score(#[case] recency_days: Option<i64>, #[case] expected: f64) {
        assert_approx_eq!(score(Rating::new(5).unwrap(), recency_days), expected);
    }

    #[rstest]
    #[case(1)]
    #[case(8)]
    #[case(10)]
    fn test_score_relative_to_rating(#[case] rating: u8) {
        let r = f64::from(rating);
        let rating = Rating::new(rating).unwrap();
        assert_approx_eq!(score(rating, None), r + 2.0);
        assert_approx_eq!(score(rating, Some(15)), r + 1.0);
        assert_approx_eq!(score(rating, Some(10)), r + 0.5);
        assert_approx_eq!(score(rating, Some(2)), r - 1.0);
        assert_approx_eq!(score(rating, Some(5)), r);
    }

    #[test]
    fn test_rank() {
        let entries = vec![
            entry("Squat", Goal::StrengthIncrease, 9),
            entry("Bench Press", Goal::StrengthIncrease, 8),
            entry("Deadlift", Goal::StrengthIncrease, 10),
            entry("Burpee", Goal::WeightLoss, 10),
            entry("Overhead Press", Goal::StrengthIncrease, 8),
            entry("Lunge", Goal::StrengthIncrease, 7),
        ];
        let recency = BTreeMap::from([
            (Name::new("Deadlift").unwrap(), 2),
            (Name::new("Squat").unwrap(), 20),
            (Name::new("Bench Press").unwrap(), 10),
        ]);
        let mut plan = Plan::default();
        let lunge = Candidate::new(
            entries[5].0.clone(),
            entries[5].1,
            None,
            &EstimatorConfig::default(),
        );
        plan.add(PlanItem::from(&lunge)).unwrap();

        let candidates = rank(
            entries,
            Goal::StrengthIncrease,
            &recency,
            &plan,
            &EstimatorConfig::default(),
        );

        assert_eq!(
            names(&candidates),
            ["Overhead Press", "Squat", "Deadlift", "Bench Press"]
        );
        assert_approx_eq!(candidates[0].score, 10.0);
        assert_approx_eq!(candidates[1].score, 10.0);
        assert_approx_eq!(candidates[2].score, 9.0);
        assert_approx_eq!(candidates[3].score, 8.5);
        assert!(candidates.iter().all(|c| c.estimated_minutes == 2));
    }

    #[test]
    fn test_rank_tie_break_by_name() {
        let entries = vec![
            entry("Row", Goal::MuscleBuilding, 6),
            entry("Curl", Goal::MuscleBuilding, 6),
            entry("Dip", Goal::MuscleBuilding, 6),
        ];

        let candidates = rank(
            entries,
            Goal::MuscleBuilding,
            &BTreeMap::new(),
            &Plan::default(),
            &EstimatorConfig::default(),
        );

        assert_eq!(names(&candidates), ["Curl", "Dip", "Row"]);
    }

    #[test]
    fn test_candidate_new_deadlift() {
        let (exercise, mut recommendation) = entry("Deadlift", Goal::StrengthIncrease, 10);
        recommendation.volume = Volume {
            sets: Some(Sets::new(5).unwrap()),
            reps: Some(Reps::new(5).unwrap()),
            hold: None,
        };

        let candidate = Candidate::new(
            exercise,
            recommendation,
            None,
            &EstimatorConfig::default(),
        );

        assert_approx_eq!(candidate.score, 12.0);
        assert_eq!(candidate.estimated_minutes, 2);
    }
}
