use std::{fmt, slice::Iter, str::FromStr};

use chrono::{DateTime, Utc};

use crate::{Goal, Name, Property};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttemptStatus {
    Completed,
    Skipped,
}

impl Property for AttemptStatus {
    fn iter() -> Iter<'static, AttemptStatus> {
        static STATUS: [AttemptStatus; 2] = [AttemptStatus::Completed, AttemptStatus::Skipped];
        STATUS.iter()
    }

    fn name(self) -> &'static str {
        match self {
            AttemptStatus::Completed => "completed",
            AttemptStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AttemptStatus {
    type Err = AttemptStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        AttemptStatus::iter()
            .find(|status| status.name() == key)
            .copied()
            .ok_or_else(|| AttemptStatusError::Unknown(s.trim().to_string()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AttemptStatusError {
    #[error("Exercise status must be 'completed' or 'skipped' ({0})")]
    Unknown(String),
}

/// Terminal record of one exercise within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub name: Name,
    pub status: AttemptStatus,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.status {
            AttemptStatus::Completed => write!(f, "✓ {}", self.name),
            AttemptStatus::Skipped => write!(f, "↷ {} (skipped)", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutSummary {
    pub performed_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub goal: Option<Goal>,
    pub total_sets_completed: u32,
    pub attempts: Vec<Attempt>,
}

impl WorkoutSummary {
    #[must_use]
    pub fn completed(&self) -> Vec<&Name> {
        self.with_status(AttemptStatus::Completed)
    }

    #[must_use]
    pub fn skipped(&self) -> Vec<&Name> {
        self.with_status(AttemptStatus::Skipped)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed().len()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped().len()
    }

    #[must_use]
    pub fn exercise_names(&self) -> Vec<&Name> {
        self.attempts.iter().map(|a| &a.name).collect()
    }

    #[must_use]
    pub fn attempt_lines(&self) -> Vec<String> {
        self.attempts.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn duration_text(&self) -> String {
        format_duration(self.duration_seconds)
    }

    /// Whole minutes for the workout log, rounded up and at least one.
    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_seconds.div_ceil(60).max(1)
    }

    #[must_use]
    pub fn goal_label(&self) -> &'static str {
        self.goal.map_or("Custom", Goal::name)
    }

    fn with_status(&self, status: AttemptStatus) -> Vec<&Name> {
        self.attempts
            .iter()
            .filter(|a| a.status == status)
            .map(|a| &a.name)
            .collect()
    }
}

impl fmt::Display for WorkoutSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{} workout · {} · {} sets",
            self.goal_label(),
            self.duration_text(),
            self.total_sets_completed
        )?;
        writeln!(
            f,
            "{} completed, {} skipped",
            self.completed_count(),
            self.skipped_count()
        )?;
        for line in self.attempt_lines() {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

/// Format seconds as `m:ss`.
#[must_use]
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn attempt(name: &str, status: AttemptStatus) -> Attempt {
        Attempt {
            name: Name::new(name).unwrap(),
            status,
        }
    }

    fn summary(duration_seconds: u32) -> WorkoutSummary {
        WorkoutSummary {
            performed_at: Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
            duration_seconds,
            goal: Some(Goal::StrengthIncrease),
            total_sets_completed: 7,
            attempts: vec![
                attempt("Squat", AttemptStatus::Completed),
                attempt("Plank", AttemptStatus::Skipped),
                attempt("Row", AttemptStatus::Completed),
            ],
        }
    }

    #[rstest]
    #[case(0, "0:00")]
    #[case(59, "0:59")]
    #[case(61, "1:01")]
    #[case(3600, "60:00")]
    fn test_format_duration(#[case] seconds: u32, #[case] expected: &str) {
        assert_eq!(format_duration(seconds), expected);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(60, 1)]
    #[case(61, 2)]
    #[case(1505, 26)]
    fn test_duration_minutes(#[case] seconds: u32, #[case] expected: u32) {
        assert_eq!(summary(seconds).duration_minutes(), expected);
    }

    #[test]
    fn test_summary_counts() {
        let summary = summary(1505);

        assert_eq!(summary.completed_count(), 2);
        assert_eq!(summary.skipped_count(), 1);
        assert_eq!(summary.skipped(), [&Name::new("Plank").unwrap()]);
        assert_eq!(summary.exercise_names().len(), 3);
        assert_eq!(
            summary.attempt_lines(),
            ["✓ Squat", "↷ Plank (skipped)", "✓ Row"]
        );
    }

    #[test]
    fn test_summary_display() {
        assert_eq!(
            summary(1505).to_string(),
            "Strength Increase workout · 25:05 · 7 sets\n\
             2 completed, 1 skipped\n  \
             ✓ Squat\n  \
             ↷ Plank (skipped)\n  \
             ✓ Row\n"
        );
    }

    #[rstest]
    #[case("completed", Ok(AttemptStatus::Completed))]
    #[case(" Skipped ", Ok(AttemptStatus::Skipped))]
    #[case("failed", Err(AttemptStatusError::Unknown("failed".to_string())))]
    fn test_attempt_status_from_str(
        #[case] value: &str,
        #[case] expected: Result<AttemptStatus, AttemptStatusError>,
    ) {
        assert_eq!(value.parse::<AttemptStatus>(), expected);
    }
}
