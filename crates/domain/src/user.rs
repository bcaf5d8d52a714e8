use derive_more::Deref;
use uuid::Uuid;

use crate::{CreateError, Goal, Name, ReadError, UpdateError, ValidationError};

pub trait UserService {
    fn get_users(&self) -> Result<Vec<User>, ReadError>;
    fn create_user(
        &self,
        username: Name,
        display_name: Option<String>,
        preferred_goal: Option<Goal>,
    ) -> Result<User, CreateError>;
    fn replace_user(&self, user: User) -> Result<User, UpdateError>;

    fn get_user(&self, username: &str) -> Result<Option<User>, ReadError> {
        let username = username.trim();
        Ok(self
            .get_users()?
            .into_iter()
            .find(|u| u.username.as_str() == username))
    }

    fn validate_username(&self, username: &str, id: UserID) -> Result<Name, ValidationError> {
        match Name::new(username) {
            Ok(username) => match self.get_users() {
                Ok(users) => {
                    if users.iter().all(|u| u.id == id || u.username != username) {
                        Ok(username)
                    } else {
                        Err(ValidationError::Conflict("username".to_string()))
                    }
                }
                Err(err) => Err(ValidationError::Other(err.into())),
            },
            Err(err) => Err(ValidationError::Other(err.into())),
        }
    }
}

pub trait UserRepository {
    fn read_users(&self) -> Result<Vec<User>, ReadError>;
    fn create_user(
        &self,
        username: Name,
        display_name: Option<String>,
        preferred_goal: Option<Goal>,
    ) -> Result<User, CreateError>;
    fn replace_user(&self, user: User) -> Result<User, UpdateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub username: Name,
    pub display_name: String,
    pub preferred_goal: Option<Goal>,
}

impl User {
    /// Display name falls back to the username if none was given.
    #[must_use]
    pub fn new(
        id: UserID,
        username: Name,
        display_name: Option<String>,
        preferred_goal: Option<Goal>,
    ) -> Self {
        let display_name = display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| username.to_string());
        Self {
            id,
            username,
            display_name,
            preferred_goal,
        }
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(Uuid);

impl UserID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UserID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for UserID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_user_id_nil() {
        assert!(UserID::nil().is_nil());
        assert_eq!(UserID::nil(), UserID::default());
        assert!(!UserID::from(1).is_nil());
    }

    #[rstest]
    #[case(None, "alice")]
    #[case(Some("  "), "alice")]
    #[case(Some(" Alice A. "), "Alice A.")]
    fn test_user_new_display_name(#[case] display_name: Option<&str>, #[case] expected: &str) {
        let user = User::new(
            1.into(),
            Name::new("alice").unwrap(),
            display_name.map(ToString::to_string),
            Some(Goal::WeightLoss),
        );

        assert_eq!(user.display_name, expected);
        assert_eq!(user.preferred_goal, Some(Goal::WeightLoss));
    }
}
