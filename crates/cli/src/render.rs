use std::fmt::Write;

use chrono::{Duration, NaiveDate};
use forma_domain::{
    BudgetCheck, Candidate, Clock, Exercise, LiveSession, Name, Phase, Plan, Workout,
    WorkoutStats, format_duration, tag,
};

pub fn exercises(exercises: &[&Exercise]) -> String {
    if exercises.is_empty() {
        return String::from("No matching exercises\n");
    }
    let mut text = String::new();
    for exercise in exercises {
        let _ = writeln!(
            text,
            "{:<28} {:<30} {}",
            exercise.name.as_str(),
            tag::format_tags(&exercise.muscles),
            tag::format_tags(&exercise.equipment)
        );
    }
    text
}

pub fn candidates(candidates: &[Candidate]) -> String {
    if candidates.is_empty() {
        return String::from("No candidates left\n");
    }
    let mut text = String::from("Candidates\n");
    for (i, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(
            text,
            "{:>3}. {:<28} {:>5.2} {:>3} min  {}",
            i + 1,
            candidate.name().as_str(),
            candidate.score,
            candidate.estimated_minutes,
            candidate.recommendation.volume.description()
        );
    }
    text
}

pub fn plan(plan: &Plan, budget_check: Option<BudgetCheck>) -> String {
    let mut text = match budget_check {
        Some(check) => format!(
            "Plan: {} min of {} min budget{}\n",
            check.total_minutes,
            check.budget_minutes,
            if check.within_budget {
                ""
            } else {
                " (over budget)"
            }
        ),
        None => format!("Plan: {} min\n", plan.total_minutes()),
    };
    if plan.is_empty() {
        text.push_str("  (empty)\n");
    }
    for (i, item) in plan.items().iter().enumerate() {
        let _ = writeln!(
            text,
            "{:>3}. {:<28} {:>3} min  {}",
            i + 1,
            item.name.as_str(),
            item.estimated_minutes,
            item.volume.description()
        );
    }
    text
}

pub fn session<C: Clock>(session: &LiveSession<C>) -> String {
    let phase = session.phase();
    let mut text = match session.current_exercise() {
        Some(exercise) if phase != Phase::Ended => format!(
            "{phase}{} · {} · {}\n",
            if session.is_paused() { " (paused)" } else { "" },
            exercise.name,
            session.progress_text(),
        ),
        _ => format!("{phase}\n"),
    };
    if phase.is_running() {
        let _ = writeln!(
            text,
            "{}% done · {} elapsed",
            session.completion(),
            elapsed(session.session_elapsed())
        );
    }
    let hint = session.tempo_hint();
    if !hint.is_empty() {
        let _ = writeln!(text, "{hint}");
    }
    text
}

pub fn workouts(workouts: &[Workout]) -> String {
    if workouts.is_empty() {
        return String::from("No workouts logged\n");
    }
    let mut text = String::new();
    for workout in workouts {
        let _ = writeln!(
            text,
            "{}  {:<18} {:>3} min {:>3} sets  {}",
            workout.performed_at,
            workout.goal.map_or_else(|| String::from("Custom"), |g| g.to_string()),
            workout.duration_minutes,
            workout.total_sets_completed,
            workout
                .attempts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    text
}

pub fn stats(stats: &WorkoutStats, recent: &[(Name, NaiveDate)]) -> String {
    let mut text = format!(
        "Workouts: {}\nMinutes: {}\nSets completed: {}\n",
        stats.total_workouts, stats.total_minutes, stats.total_sets_completed
    );
    match &stats.top_exercise {
        Some(name) => {
            let _ = writeln!(
                text,
                "Top exercise: {name} ({}x)",
                stats.top_exercise_count
            );
        }
        None => text.push_str("Top exercise: -\n"),
    }
    if !recent.is_empty() {
        text.push_str("Recently used\n");
        for (name, date) in recent {
            let _ = writeln!(text, "  {date}  {name}");
        }
    }
    text
}

fn elapsed(duration: Duration) -> String {
    format_duration(u32::try_from(duration.num_seconds()).unwrap_or_default())
}
