use std::{
    cell::{Ref, RefCell},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use forma_domain::{
    self as domain, CatalogRepository, CreateError, Goal, Name, ReadError, StorageError,
    UpdateError, UserID, UserRepository, WorkoutRepository, WorkoutSummary,
};
use log::{debug, info};
use uuid::Uuid;

use crate::dto::{self, Database};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// JSON document holding users, the exercise catalog and the workout log.
///
/// Every write is persisted immediately. If persisting fails, the change is
/// rolled back and the error is returned.
pub struct Store {
    path: Option<PathBuf>,
    data: RefCell<Database>,
}

impl Store {
    #[must_use]
    pub fn in_memory(data: Database) -> Self {
        Self {
            path: None,
            data: RefCell::new(data),
        }
    }

    /// Opens the data file. A missing file results in a database containing
    /// only the built-in catalog. The file is not created before the first
    /// write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("reading data from {}", path.display());
                serde_json::from_str(&content).map_err(|err| StorageError::Other(err.into()))?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "{} does not exist, starting with built-in catalog",
                    path.display()
                );
                builtin_catalog()?
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: Some(path),
            data: RefCell::new(data),
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn data(&self) -> Ref<'_, Database> {
        self.data.borrow()
    }

    fn modify<T, E: From<StorageError>>(
        &self,
        change: impl FnOnce(&mut Database) -> Result<T, E>,
    ) -> Result<T, E> {
        let previous = self.data.borrow().clone();
        let result = change(&mut *self.data.borrow_mut())?;
        if let Err(err) = self.persist() {
            *self.data.borrow_mut() = previous;
            return Err(err.into());
        }
        Ok(result)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&*self.data.borrow())
            .map_err(|err| StorageError::Other(err.into()))?;
        fs::write(path, content)?;
        debug!("wrote data to {}", path.display());
        Ok(())
    }
}

/// Database with the exercises shipped with the application.
pub fn builtin_catalog() -> Result<Database, StorageError> {
    serde_json::from_str(BUILTIN_CATALOG).map_err(|err| StorageError::Other(err.into()))
}

impl CatalogRepository for Store {
    fn read_exercises(&self) -> Result<Vec<domain::Exercise>, ReadError> {
        self.data
            .borrow()
            .exercises
            .iter()
            .map(|e| domain::Exercise::try_from(e).map_err(|err| ReadError::Other(err.into())))
            .collect()
    }

    fn read_recommendations(
        &self,
        goal: Goal,
    ) -> Result<Vec<(domain::Exercise, domain::GoalRecommendation)>, ReadError> {
        self.data
            .borrow()
            .exercises
            .iter()
            .map(|e| {
                Ok((
                    domain::Exercise::try_from(e)?,
                    e.recommendation(goal)?,
                ))
            })
            .collect::<Result<Vec<_>, dto::DtoError>>()
            .map_err(|err| ReadError::Other(err.into()))
    }
}

impl WorkoutRepository for Store {
    fn read_workouts(&self, user_id: UserID) -> Result<Vec<domain::Workout>, ReadError> {
        self.data
            .borrow()
            .workouts
            .iter()
            .filter(|w| w.user_id == *user_id)
            .map(|w| domain::Workout::try_from(w.clone()).map_err(|err| ReadError::Other(err.into())))
            .collect()
    }

    fn create_workout(
        &self,
        user_id: UserID,
        summary: &WorkoutSummary,
    ) -> Result<domain::Workout, CreateError> {
        if !self.data.borrow().users.iter().any(|u| u.id == *user_id) {
            return Err(CreateError::Invalid(format!("unknown user {}", *user_id)));
        }
        let workout = domain::Workout::from_summary(Uuid::new_v4().into(), user_id, summary)?;
        self.modify(|data| {
            data.workouts.push(dto::Workout::from(&workout));
            Ok::<_, CreateError>(())
        })?;
        Ok(workout)
    }
}

impl UserRepository for Store {
    fn read_users(&self) -> Result<Vec<domain::User>, ReadError> {
        self.data
            .borrow()
            .users
            .iter()
            .map(|u| domain::User::try_from(u.clone()).map_err(|err| ReadError::Other(err.into())))
            .collect()
    }

    fn create_user(
        &self,
        username: Name,
        display_name: Option<String>,
        preferred_goal: Option<Goal>,
    ) -> Result<domain::User, CreateError> {
        let user = domain::User::new(
            Uuid::new_v4().into(),
            username,
            display_name,
            preferred_goal,
        );
        self.modify(|data| {
            if data
                .users
                .iter()
                .any(|u| u.username == user.username.as_str())
            {
                return Err(CreateError::Conflict);
            }
            data.users.push(dto::User::from(&user));
            Ok(())
        })?;
        Ok(user)
    }

    fn replace_user(&self, user: domain::User) -> Result<domain::User, UpdateError> {
        self.modify(|data| {
            if data
                .users
                .iter()
                .any(|u| u.id != *user.id && u.username == user.username.as_str())
            {
                return Err(UpdateError::Conflict);
            }
            let entry = data
                .users
                .iter_mut()
                .find(|u| u.id == *user.id)
                .ok_or(UpdateError::Storage(StorageError::NotFound))?;
            *entry = dto::User::from(&user);
            Ok(())
        })?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use crate::tests::data::{DATABASE, EXERCISE, USER, USER_2, WORKOUT};

    use super::*;

    fn summary(names: &[&str]) -> WorkoutSummary {
        WorkoutSummary {
            performed_at: Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
            duration_seconds: 754,
            goal: Some(Goal::MuscleBuilding),
            total_sets_completed: 4,
            attempts: names
                .iter()
                .map(|n| domain::Attempt {
                    name: Name::new(n).unwrap(),
                    status: domain::AttemptStatus::Completed,
                })
                .collect(),
        }
    }

    #[test]
    fn test_builtin_catalog() {
        let store = Store::in_memory(builtin_catalog().unwrap());

        let exercises = store.read_exercises().unwrap();
        assert_eq!(exercises.len(), 22);
        assert_eq!(exercises[0].name.as_str(), "Push-Up");

        for goal in [
            Goal::MuscleBuilding,
            Goal::WeightLoss,
            Goal::StrengthIncrease,
            Goal::EnduranceIncrease,
        ] {
            let entries = store.read_recommendations(goal).unwrap();
            assert_eq!(entries.len(), 22);
            assert!(entries.iter().all(|(_, r)| r.goal == goal));
        }
    }

    #[test]
    fn test_read_recommendations() {
        let store = Store::in_memory(DATABASE.clone());

        let entries = store.read_recommendations(Goal::MuscleBuilding).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, domain::Exercise::try_from(&*EXERCISE).unwrap());
        assert_eq!(u8::from(entries[0].1.rating), 8);
    }

    #[test]
    fn test_read_recommendations_invalid_entry() {
        let mut database = DATABASE.clone();
        database.exercises[0].name = String::from(" ");
        let store = Store::in_memory(database);

        assert!(matches!(
            store.read_recommendations(Goal::WeightLoss),
            Err(ReadError::Other(_))
        ));
    }

    #[test]
    fn test_read_workouts() {
        let store = Store::in_memory(DATABASE.clone());

        assert_eq!(store.read_workouts(USER.id).unwrap(), [WORKOUT.clone()]);
        assert!(store.read_workouts(USER_2.id).unwrap().is_empty());
    }

    #[test]
    fn test_create_workout() {
        let store = Store::in_memory(DATABASE.clone());

        let workout = store
            .create_workout(USER_2.id, &summary(&["Barbell Deadlift"]))
            .unwrap();

        assert!(!workout.id.is_nil());
        assert_eq!(workout.duration_minutes, 13);
        assert_eq!(store.read_workouts(USER_2.id).unwrap(), [workout]);
    }

    #[test]
    fn test_create_workout_unknown_user() {
        let store = Store::in_memory(DATABASE.clone());

        assert!(matches!(
            store.create_workout(UserID::from(99), &summary(&["Barbell Deadlift"])),
            Err(CreateError::Invalid(_))
        ));
    }

    #[test]
    fn test_create_workout_without_attempts() {
        let store = Store::in_memory(DATABASE.clone());

        assert!(matches!(
            store.create_workout(USER.id, &summary(&[])),
            Err(CreateError::Invalid(_))
        ));
        assert_eq!(store.data().workouts.len(), 1);
    }

    #[test]
    fn test_create_user() {
        let store = Store::in_memory(DATABASE.clone());

        let user = store
            .create_user(Name::new("carol").unwrap(), None, None)
            .unwrap();

        assert_eq!(user.display_name, "carol");
        assert_eq!(
            store.read_users().unwrap(),
            [USER.clone(), USER_2.clone(), user]
        );
        assert!(matches!(
            store.create_user(Name::new("alice").unwrap(), None, None),
            Err(CreateError::Conflict)
        ));
    }

    #[test]
    fn test_replace_user() {
        let store = Store::in_memory(DATABASE.clone());
        let user = domain::User {
            preferred_goal: Some(Goal::EnduranceIncrease),
            ..USER.clone()
        };

        assert_eq!(store.replace_user(user.clone()).unwrap(), user);
        assert_eq!(store.read_users().unwrap(), [user, USER_2.clone()]);
        assert!(matches!(
            store.replace_user(domain::User {
                username: USER.username.clone(),
                ..USER_2.clone()
            }),
            Err(UpdateError::Conflict)
        ));
        assert!(matches!(
            store.replace_user(domain::User {
                id: UserID::from(99),
                ..USER.clone()
            }),
            Err(UpdateError::Storage(StorageError::NotFound))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forma").join("data.json");

        let store = Store::open(&path).unwrap();

        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.data().exercises.len(), 22);
        assert!(!path.exists());
    }

    #[test]
    fn test_persist_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forma").join("data.json");

        let store = Store::open(&path).unwrap();
        let user = store
            .create_user(Name::new("alice").unwrap(), Some(String::from("Alice")), None)
            .unwrap();
        let workout = store
            .create_workout(user.id, &summary(&["Push-Up", "Plank"]))
            .unwrap();

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.read_users().unwrap(), [user.clone()]);
        assert_eq!(reopened.read_workouts(user.id).unwrap(), [workout]);
        assert_eq!(*reopened.data(), *store.data());
    }

    #[test]
    fn test_open_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"{ invalid").unwrap();

        assert!(matches!(
            Store::open(file.path()),
            Err(StorageError::Other(_))
        ));
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store = Store {
            path: Some(file.path().join("data.json")),
            data: RefCell::new(DATABASE.clone()),
        };

        assert!(matches!(
            store.create_user(Name::new("carol").unwrap(), None, None),
            Err(CreateError::Storage(StorageError::Io(_)))
        ));
        assert_eq!(*store.data(), *DATABASE);
    }
}
