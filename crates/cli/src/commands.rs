use std::str::FromStr;

use forma_domain::{Budget, BudgetError, Direction, Goal, GoalError};

/// An exercise given by its position in the last shown list or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Name(String),
}

impl FromStr for Target {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CommandError::MissingArgument("exercise"));
        }
        match s.parse::<usize>() {
            Ok(0) => Err(CommandError::InvalidNumber(s.to_string())),
            Ok(index) => Ok(Target::Index(index)),
            Err(_) => Ok(Target::Name(s.to_string())),
        }
    }
}

/// Input of the interactive training mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    List,
    Goal(Goal),
    Add(Target),
    Remove(Target),
    Move(Target, Direction),
    Budget(Option<Budget>),
    Start,
    Status,
    Pause,
    Resume,
    Done,
    Skip,
    Next,
    Rest(u32),
    End,
    Retry,
    Log,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (keyword, argument) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let argument = argument.trim();
        let command = match keyword.to_lowercase().as_str() {
            "" => return Err(CommandError::Empty),
            "help" | "?" => Command::Help,
            "list" | "ls" => Command::List,
            "goal" => Command::Goal(required(argument, "goal")?.parse()?),
            "add" | "a" => Command::Add(argument.parse()?),
            "remove" | "rm" => Command::Remove(argument.parse()?),
            "up" => Command::Move(argument.parse()?, Direction::Up),
            "down" => Command::Move(argument.parse()?, Direction::Down),
            "budget" => match required(argument, "minutes")? {
                "off" | "none" => Command::Budget(None),
                minutes => Command::Budget(Some(Budget::try_from(minutes)?)),
            },
            "start" => Command::Start,
            "status" | "s" => Command::Status,
            "pause" | "p" => Command::Pause,
            "resume" | "r" => Command::Resume,
            "done" | "d" => Command::Done,
            "skip" => Command::Skip,
            "next" | "n" => Command::Next,
            "rest" => {
                let seconds = required(argument, "seconds")?;
                Command::Rest(
                    seconds
                        .parse()
                        .map_err(|_| CommandError::InvalidNumber(seconds.to_string()))?,
                )
            }
            "end" => Command::End,
            "retry" => Command::Retry,
            "log" => Command::Log,
            "quit" | "q" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(keyword.to_string())),
        };
        Ok(command)
    }
}

fn required<'a>(argument: &'a str, name: &'static str) -> Result<&'a str, CommandError> {
    if argument.is_empty() {
        Err(CommandError::MissingArgument(name))
    } else {
        Ok(argument)
    }
}

pub const HELP: &str = "\
Planning
  list                 show candidates and plan
  goal <goal>          switch goal
  add <n|name>         add candidate to the plan
  remove <n|name>      remove exercise from the plan
  up|down <n|name>     move exercise within the plan
  budget <min|off>     set or clear the time budget
  start                start the session
Session
  status               show progress
  done                 complete the current set
  skip                 skip the current exercise
  next                 move on to the next exercise
  pause | resume       stop or continue the clock
  rest <seconds>       change the rest between sets
  end                  end the session early
  retry                retry logging the last workout
Other
  log                  show recent log messages
  quit                 end the session and exit";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Type a command, or help")]
    Empty,
    #[error("Unknown command {0}, type help")]
    Unknown(String),
    #[error("Missing {0}")]
    MissingArgument(&'static str),
    #[error("Invalid number {0}")]
    InvalidNumber(String),
    #[error(transparent)]
    InvalidGoal(#[from] GoalError),
    #[error(transparent)]
    InvalidBudget(#[from] BudgetError),
}
