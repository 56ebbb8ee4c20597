use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::crypto::PasswordManager;
use crate::error::Result;
use crate::user::{User, UserRepository};

/// User manager.
#[derive(Clone)]
pub struct UserService {
    pub repo: UserRepository,
    pub pwd: Arc<PasswordManager>,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(pool: Pool<Postgres>, pwd: Arc<PasswordManager>) -> Self {
        Self {
            repo: UserRepository::new(pool),
            pwd,
        }
    }

    /// Register a new user.
    ///
    /// Values are stored as given; only the password is transformed, into
    /// its Argon2id hash.
    pub async fn signup(
        &self,
        username: String,
        email: String,
        password: &str,
    ) -> Result<User> {
        let mut user = User {
            username,
            email,
            password: self.pwd.hash_password(password)?,
            ..Default::default()
        };

        user.id = self.repo.insert(&user).await?;
        Ok(user)
    }
}
