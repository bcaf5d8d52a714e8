#![warn(clippy::pedantic)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use ::log::{LevelFilter, info};
use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use forma_domain::{
    Budget, CatalogService, Coach, Exercise, ExerciseFilter, Goal, Interval, Property, Service, User,
    UserID, UserService, WorkoutService, equipment_options, muscle_options, statistics,
};
use forma_storage::{Settings, Store, dto};

mod commands;
mod log;
mod render;
mod train;

#[derive(Parser)]
#[command(
    name = "forma",
    version,
    about = "Plan workouts that fit your time and train with a live coach"
)]
struct Cli {
    /// Data file holding users, exercises and logged workouts
    #[arg(long, global = true, default_value = "forma.json")]
    data: PathBuf,
    #[arg(long, global = true, default_value = "forma-settings.json")]
    settings: PathBuf,
    #[arg(short, long, global = true, default_value = "default")]
    user: String,
    /// Print more log messages (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the training goals
    Goals,
    /// Browse the exercise catalog
    Exercises {
        #[arg(long)]
        goal: Option<Goal>,
        #[arg(long)]
        muscle: Option<String>,
        #[arg(long)]
        equipment: Option<String>,
    },
    /// Rank the exercises for a goal
    Recommend {
        goal: Option<Goal>,
        #[arg(long)]
        muscle: Option<String>,
        #[arg(long)]
        equipment: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show logged workouts, newest first
    History {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Summarize logged workouts
    Stats {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// List or manage users
    Users {
        #[command(subcommand)]
        action: Option<UserAction>,
    },
    /// Show or change the settings
    Settings {
        #[arg(long)]
        rest_seconds: Option<u32>,
        #[arg(long, conflicts_with = "no_budget")]
        budget_minutes: Option<u32>,
        #[arg(long)]
        no_budget: bool,
        #[arg(long)]
        budget_tolerance: Option<f64>,
        #[arg(long)]
        include_rest_in_estimate: Option<bool>,
        #[arg(long)]
        tick_interval_ms: Option<u64>,
        #[arg(long)]
        default_goal: Option<Goal>,
    },
    /// Build a plan and train with the live coach
    Train {
        goal: Option<Goal>,
        /// Time budget in minutes
        #[arg(long)]
        budget: Option<u32>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user
    Add {
        username: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        goal: Option<Goal>,
    },
    /// Change the profile of the selected user
    Update {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        goal: Option<Goal>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    log::init(Arc::new(Mutex::new(log::Memory::default())), verbosity(cli.verbose))?;

    let mut settings = Settings::load(&cli.settings)
        .with_context(|| format!("failed to read {}", cli.settings.display()))?;
    let store =
        Store::open(&cli.data).with_context(|| format!("failed to open {}", cli.data.display()))?;
    let service = Service::new(store);

    match cli.command {
        Command::Goals => {
            for goal in Goal::iter() {
                println!("{:<20} {}", goal.code(), goal.name());
            }
        }
        Command::Exercises {
            goal,
            muscle,
            equipment,
        } => {
            let filter = ExerciseFilter {
                goal,
                muscle,
                equipment,
            };
            let mut entries = vec![];
            for goal in Goal::iter() {
                entries.extend(service.get_recommendations(*goal)?);
            }
            let mut exercises = vec![];
            for (exercise, _) in filter.entries(entries.iter()) {
                if exercises.iter().all(|e: &&Exercise| e.name != exercise.name) {
                    exercises.push(exercise);
                }
            }
            print!("{}", render::exercises(&exercises));
            if filter.is_empty() {
                let catalog = service.get_exercises()?;
                println!("Muscles: {}", muscle_options(catalog.iter()).join(", "));
                println!("Equipment: {}", equipment_options(catalog.iter()).join(", "));
            }
        }
        Command::Recommend {
            goal,
            muscle,
            equipment,
            limit,
        } => {
            let user = service.get_user(&cli.user)?;
            let goal = select_goal(goal, user.as_ref(), &settings)?;
            let user_id = user.map_or_else(UserID::nil, |u| u.id);
            let mut coach = Coach::new(service, user_id, settings.coach_config());
            coach.select_goal(goal)?;
            let candidates = coach
                .candidates()
                .iter()
                .filter(|c| muscle.as_ref().is_none_or(|m| c.exercise.targets(m)))
                .filter(|c| equipment.as_ref().is_none_or(|e| c.exercise.has_equipment(e)))
                .take(limit)
                .cloned()
                .collect::<Vec<_>>();
            println!("{goal}");
            print!("{}", render::candidates(&candidates));
        }
        Command::History { from, to, limit } => {
            let user = existing_user(&service, &cli.user)?;
            let mut workouts =
                service.get_workout_history(user.id, &Interval { first: from, last: to })?;
            if let Some(limit) = limit {
                workouts.truncate(limit);
            }
            print!("{}", render::workouts(&workouts));
        }
        Command::Stats { from, to } => {
            let user = existing_user(&service, &cli.user)?;
            let interval = Interval {
                first: from,
                last: to,
            };
            let stats = service.get_workout_stats(user.id, &interval)?;
            let workouts = service.get_workouts(user.id)?;
            let recent = statistics::recent_exercise_usage(&workouts, &interval, 10);
            print!("{}", render::stats(&stats, &recent));
        }
        Command::Users { action } => match action {
            None => {
                for user in service.get_users()? {
                    println!(
                        "{:<20} {:<20} {}",
                        user.username.as_str(),
                        user.display_name,
                        user.preferred_goal.map_or("-", Goal::name)
                    );
                }
            }
            Some(UserAction::Add {
                username,
                display_name,
                goal,
            }) => {
                let username = service.validate_username(&username, UserID::nil())?;
                let user = service.create_user(username, display_name, goal)?;
                println!("Created {}", user.username);
            }
            Some(UserAction::Update { display_name, goal }) => {
                let user = existing_user(&service, &cli.user)?;
                let user = service.replace_user(User {
                    display_name: display_name.unwrap_or(user.display_name),
                    preferred_goal: goal.or(user.preferred_goal),
                    ..user
                })?;
                println!("Updated {}", user.username);
            }
        },
        Command::Settings {
            rest_seconds,
            budget_minutes,
            no_budget,
            budget_tolerance,
            include_rest_in_estimate,
            tick_interval_ms,
            default_goal,
        } => {
            let previous = settings;
            settings.rest_seconds = rest_seconds.unwrap_or(settings.rest_seconds);
            settings.budget_minutes = if no_budget {
                None
            } else {
                budget_minutes.or(settings.budget_minutes)
            };
            settings.budget_tolerance = budget_tolerance.unwrap_or(settings.budget_tolerance);
            settings.include_rest_in_estimate =
                include_rest_in_estimate.unwrap_or(settings.include_rest_in_estimate);
            settings.tick_interval_ms = tick_interval_ms.unwrap_or(settings.tick_interval_ms);
            settings.default_goal = default_goal.map(dto::Goal::from).or(settings.default_goal);
            settings.budget()?;
            if settings != previous {
                settings.save(&cli.settings)?;
                info!("saved settings to {}", cli.settings.display());
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Train { goal, budget } => {
            let user = match service.get_user(&cli.user)? {
                Some(user) => user,
                None => {
                    let username = service.validate_username(&cli.user, UserID::nil())?;
                    let user = service.create_user(username, None, goal)?;
                    info!("created user {}", user.username);
                    user
                }
            };
            let goal = select_goal(goal, Some(&user), &settings)?;
            let budget = match budget {
                Some(minutes) => Some(Budget::new(minutes)?),
                None => settings.budget()?,
            };
            let mut coach = Coach::new(service, user.id, settings.coach_config());
            coach.select_goal(goal)?;
            coach.set_budget(budget);
            coach.take_status();
            println!("Training {goal} as {}", user.display_name);
            train::run(
                &mut coach,
                std::time::Duration::from_millis(settings.tick_interval_ms.max(1)),
            )?;
        }
    }

    Ok(())
}

fn verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn select_goal(
    goal: Option<Goal>,
    user: Option<&User>,
    settings: &Settings,
) -> anyhow::Result<Goal> {
    match goal
        .or_else(|| user.and_then(|u| u.preferred_goal))
        .or_else(|| settings.goal())
    {
        Some(goal) => Ok(goal),
        None => bail!("no goal given, choose one of: {}", goal_codes()),
    }
}

fn goal_codes() -> String {
    Goal::iter()
        .map(|g| g.code())
        .collect::<Vec<_>>()
        .join(", ")
}

fn existing_user<S: UserService>(service: &S, username: &str) -> anyhow::Result<User> {
    service
        .get_user(username)?
        .with_context(|| format!("unknown user {username}, create it with: forma users add"))
}
