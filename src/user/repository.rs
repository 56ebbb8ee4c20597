//! Handle database requests.

use sqlx::{Pool, Postgres};

use crate::error::Result;
use crate::user::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert [`User`] into database and return its new `id`.
    ///
    /// The `id` field of `user` is ignored. A taken username fails on the
    /// table's unique constraint.
    pub async fn insert(&self, user: &User) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO users (username, email, password)
                VALUES ($1, $2, $3)
                RETURNING id"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Find a user using `username` field.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Count rows holding `username`.
    pub async fn count_by_username(&self, username: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> User {
        User {
            username: username.into(),
            email: "a@x.com".into(),
            password: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".into(),
            ..Default::default()
        }
    }

    #[sqlx::test]
    async fn test_insert_assigns_id(pool: Pool<Postgres>) {
        let repo = UserRepository::new(pool);

        let first = repo.insert(&user("alice")).await.unwrap();
        let second = repo.insert(&user("bob")).await.unwrap();
        assert!(second > first);

        let alice = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.id, first);
        assert_eq!(alice.email, "a@x.com");
    }

    #[sqlx::test]
    async fn test_username_is_unique(pool: Pool<Postgres>) {
        let repo = UserRepository::new(pool);

        repo.insert(&user("alice")).await.unwrap();
        let err = repo.insert(&user("alice")).await.unwrap_err();
        assert!(matches!(err, crate::ServerError::Sql(_)));

        assert_eq!(repo.count_by_username("alice").await.unwrap(), 1);
    }

    #[sqlx::test]
    async fn test_duplicate_email_is_allowed(pool: Pool<Postgres>) {
        let repo = UserRepository::new(pool);

        repo.insert(&user("alice")).await.unwrap();
        repo.insert(&user("alicia")).await.unwrap();

        assert_eq!(repo.count_by_username("alicia").await.unwrap(), 1);
    }

    #[sqlx::test]
    async fn test_unknown_username(pool: Pool<Postgres>) {
        let repo = UserRepository::new(pool);

        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
        assert_eq!(repo.count_by_username("nobody").await.unwrap(), 0);
    }
}
