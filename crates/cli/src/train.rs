use std::{
    io::{self, BufRead, Write},
    ops::ControlFlow,
    sync::mpsc::{self, Sender},
    thread,
    time::Instant,
};

use chrono::Duration;
use forma_domain::{CatalogService, Clock, Coach, Name, Phase, WorkoutService};
use log::debug;

use crate::{
    commands::{Command, HELP, Target},
    render,
};

pub enum Message {
    Tick(Duration),
    Input(String),
    Closed,
}

/// Drives the coach until the user quits or stdin is closed. Ticks and input
/// lines arrive over one channel and are applied one at a time.
pub fn run<S>(coach: &mut Coach<S>, tick_interval: std::time::Duration) -> io::Result<()>
where
    S: CatalogService + WorkoutService,
{
    let (sender, receiver) = mpsc::channel();
    spawn_ticker(sender.clone(), tick_interval);
    spawn_reader(sender);

    let mut out = io::stdout().lock();
    write!(out, "{}", render::candidates(coach.candidates()))?;
    writeln!(out, "Type help for a list of commands")?;
    out.flush()?;

    for message in receiver {
        let flow = match message {
            Message::Tick(dt) => {
                if let Some(phase) = coach.tick(dt) {
                    on_transition(coach, phase, &mut out)?;
                }
                ControlFlow::Continue(())
            }
            Message::Input(line) => match line.parse::<Command>() {
                Ok(command) => apply(coach, command, &mut out)?,
                Err(err) => {
                    writeln!(out, "{err}")?;
                    ControlFlow::Continue(())
                }
            },
            Message::Closed => apply(coach, Command::Quit, &mut out)?,
        };
        if let Some(status) = coach.take_status() {
            writeln!(out, "{status}")?;
        }
        out.flush()?;
        if flow.is_break() {
            break;
        }
    }
    Ok(())
}

fn spawn_ticker(sender: Sender<Message>, interval: std::time::Duration) {
    thread::spawn(move || {
        let mut last = Instant::now();
        loop {
            thread::sleep(interval);
            let now = Instant::now();
            let dt = Duration::from_std(now - last).unwrap_or_else(|_| Duration::zero());
            last = now;
            if sender.send(Message::Tick(dt)).is_err() {
                break;
            }
        }
    });
}

fn spawn_reader(sender: Sender<Message>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if sender.send(Message::Input(line)).is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Closed);
    });
}

/// Apply one command to the coach and print its outcome. Failed actions are
/// reported through the coach status.
pub fn apply<S, C>(
    coach: &mut Coach<S, C>,
    command: Command,
    out: &mut impl Write,
) -> io::Result<ControlFlow<()>>
where
    S: CatalogService + WorkoutService,
    C: Clock + Clone,
{
    let before = coach.session().phase();
    let mut flow = ControlFlow::Continue(());
    let result = match command {
        Command::Help => {
            writeln!(out, "{HELP}")?;
            Ok(())
        }
        Command::List => {
            write!(out, "{}", render::candidates(coach.candidates()))?;
            write!(out, "{}", render::plan(coach.plan(), coach.budget_check()))?;
            Ok(())
        }
        Command::Goal(goal) => coach.select_goal(goal),
        Command::Add(target) => match candidate_name(coach, &target) {
            Some(name) => coach.add(&name),
            None => {
                writeln!(out, "No such candidate")?;
                Ok(())
            }
        },
        Command::Remove(target) => match plan_name(coach, &target) {
            Some(name) => coach.remove(&name).map(|_| ()),
            None => {
                writeln!(out, "No such exercise in the plan")?;
                Ok(())
            }
        },
        Command::Move(target, direction) => match plan_name(coach, &target) {
            Some(name) => {
                let result = coach.move_item(&name, direction);
                if result.is_ok() {
                    write!(out, "{}", render::plan(coach.plan(), coach.budget_check()))?;
                }
                result.map(|_| ())
            }
            None => {
                writeln!(out, "No such exercise in the plan")?;
                Ok(())
            }
        },
        Command::Budget(budget) => {
            coach.set_budget(budget);
            Ok(())
        }
        Command::Start => {
            let result = coach.start_session();
            if result.is_ok() {
                write!(out, "{}", render::session(coach.session()))?;
            }
            result
        }
        Command::Status => {
            write!(out, "{}", render::session(coach.session()))?;
            Ok(())
        }
        Command::Pause => coach.pause(),
        Command::Resume => coach.resume(),
        Command::Done => coach.complete_set().map(|_| ()),
        Command::Skip => coach.skip_exercise().map(|_| ()),
        Command::Next => coach.next_exercise().map(|_| ()),
        Command::Rest(seconds) => coach.set_rest_seconds(seconds),
        Command::End => {
            coach.end_session(true);
            Ok(())
        }
        Command::Retry => {
            match coach.retry_log() {
                None => writeln!(out, "Nothing to log")?,
                Some(false) => writeln!(out, "The workout is still not logged, try again later")?,
                Some(true) => {}
            }
            Ok(())
        }
        Command::Log => {
            for entry in crate::log::entries().iter().rev() {
                writeln!(out, "{entry}")?;
            }
            Ok(())
        }
        Command::Quit => {
            coach.end_session(true);
            flow = ControlFlow::Break(());
            Ok(())
        }
    };
    if let Err(err) = result {
        debug!("command failed: {err}");
    }
    if before != Phase::Ended && coach.session().phase() == Phase::Ended {
        write_summary(coach, out)?;
    }
    if flow.is_break() && coach.log_pending() {
        writeln!(out, "The last workout could not be logged")?;
    }
    Ok(flow)
}

fn on_transition<S, C>(coach: &Coach<S, C>, phase: Phase, out: &mut impl Write) -> io::Result<()>
where
    S: CatalogService + WorkoutService,
    C: Clock + Clone,
{
    if phase == Phase::Ended {
        return write_summary(coach, out);
    }
    write!(out, "{}", render::session(coach.session()))
}

fn write_summary<S, C>(coach: &Coach<S, C>, out: &mut impl Write) -> io::Result<()>
where
    S: CatalogService + WorkoutService,
    C: Clock + Clone,
{
    if let Some(summary) = coach.summary() {
        write!(out, "{summary}")?;
    }
    Ok(())
}

fn candidate_name<S, C>(coach: &Coach<S, C>, target: &Target) -> Option<Name>
where
    S: CatalogService + WorkoutService,
    C: Clock + Clone,
{
    let names = coach.candidates().iter().map(|c| c.name());
    resolve(names, target)
}

fn plan_name<S, C>(coach: &Coach<S, C>, target: &Target) -> Option<Name>
where
    S: CatalogService + WorkoutService,
    C: Clock + Clone,
{
    let names = coach.plan().items().iter().map(|i| &i.name);
    resolve(names, target)
}

/// Positions are one-based, names are matched case-insensitively.
fn resolve<'a>(mut names: impl Iterator<Item = &'a Name>, target: &Target) -> Option<Name> {
    match target {
        Target::Index(index) => names.nth(index.checked_sub(1)?).cloned(),
        Target::Name(name) => names
            .find(|n| n.as_str().eq_ignore_ascii_case(name.trim()))
            .cloned(),
    }
}

#[cfg(test)]
mod tests {
    use forma_domain::{CoachConfig, Goal, Service, Status, SystemClock, UserRepository};
    use forma_storage::{Store, builtin_catalog};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn coach() -> Coach<Service<Store>> {
        let store = Store::in_memory(builtin_catalog().unwrap());
        let user = store
            .create_user(Name::new("alice").unwrap(), None, None)
            .unwrap();
        let mut coach = Coach::new(Service::new(store), user.id, CoachConfig::default());
        coach.select_goal(Goal::MuscleBuilding).unwrap();
        coach
    }

    fn run_command(coach: &mut Coach<Service<Store>>, input: &str) -> (ControlFlow<()>, String) {
        let mut out = vec![];
        let flow = apply(coach, input.parse().unwrap(), &mut out).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_plan_and_end_session() {
        let mut coach = coach();

        run_command(&mut coach, "add push-up");
        run_command(&mut coach, "add plank");
        assert_eq!(
            coach
                .plan()
                .items()
                .iter()
                .map(|i| i.name.as_str())
                .collect::<Vec<_>>(),
            ["Push-Up", "Plank"]
        );

        let (_, output) = run_command(&mut coach, "down 1");
        assert!(output.contains("1. Plank"));

        let (_, output) = run_command(&mut coach, "start");
        assert!(output.starts_with("in set · Plank · Exercise 1/2 · Set 1/"));

        let (flow, output) = run_command(&mut coach, "end");
        assert_eq!(flow, ControlFlow::Continue(()));
        assert!(output.starts_with("Muscle Building workout · "));
        assert!(output.contains("↷ Push-Up (skipped)"));
        assert!(!coach.log_pending());

        assert_eq!(coach.service().repository().data().workouts.len(), 1);

        let (_, output) = run_command(&mut coach, "status");
        assert_eq!(output, "ended\n");
    }

    #[test]
    fn test_quit_ends_running_session() {
        let mut coach = coach();
        run_command(&mut coach, "add 1");
        run_command(&mut coach, "start");

        let (flow, output) = run_command(&mut coach, "quit");

        assert_eq!(flow, ControlFlow::Break(()));
        assert!(output.contains("workout · "));
        assert_eq!(coach.session().phase(), Phase::Ended);
    }

    #[rstest]
    #[case("add 999", "No such candidate\n")]
    #[case("remove squat", "No such exercise in the plan\n")]
    #[case("retry", "Nothing to log\n")]
    fn test_invalid_targets(#[case] input: &str, #[case] expected: &str) {
        let mut coach = coach();

        assert_eq!(run_command(&mut coach, input).1, expected);
    }

    #[test]
    fn test_failed_action_sets_status() {
        let mut coach = coach();
        coach.take_status();

        let (flow, output) = run_command(&mut coach, "done");

        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(output, "");
        assert!(matches!(coach.take_status(), Some(Status::Warning(_))));
    }

    #[test]
    fn test_retry_failed_log() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("forma");
        let store = Store::open(data_dir.join("data.json")).unwrap();
        let user = store
            .create_user(Name::new("alice").unwrap(), None, None)
            .unwrap();
        let mut coach = Coach::new(Service::new(store), user.id, CoachConfig::default());
        coach.select_goal(Goal::WeightLoss).unwrap();
        run_command(&mut coach, "add 1");
        run_command(&mut coach, "start");
        std::fs::remove_dir_all(&data_dir).unwrap();
        std::fs::write(&data_dir, "").unwrap();

        run_command(&mut coach, "end");

        assert!(coach.log_pending());
        assert!(matches!(coach.take_status(), Some(Status::Warning(_))));
        assert_eq!(
            run_command(&mut coach, "retry").1,
            "The workout is still not logged, try again later\n"
        );
        assert!(coach.log_pending());
        assert!(matches!(coach.take_status(), Some(Status::Warning(_))));

        std::fs::remove_file(&data_dir).unwrap();

        assert_eq!(run_command(&mut coach, "retry").1, "");
        assert!(!coach.log_pending());
        assert_eq!(coach.service().repository().data().workouts.len(), 1);
        assert_eq!(run_command(&mut coach, "retry").1, "Nothing to log\n");
    }

    #[test]
    fn test_resolve() {
        let names = [Name::new("Push-Up").unwrap(), Name::new("Plank").unwrap()];

        assert_eq!(
            resolve(names.iter(), &Target::Index(2)),
            Some(names[1].clone())
        );
        assert_eq!(
            resolve(names.iter(), &Target::Name(String::from("PUSH-UP"))),
            Some(names[0].clone())
        );
        assert_eq!(resolve(names.iter(), &Target::Index(3)), None);
        assert_eq!(
            resolve(names.iter(), &Target::Name(String::from("Squat"))),
            None
        );
    }

    #[test]
    fn test_system_clock_coach() {
        let coach: Coach<Service<Store>, SystemClock> = coach();

        assert_eq!(coach.goal(), Some(Goal::MuscleBuilding));
        assert_eq!(coach.candidates().len(), 22);
    }
}
