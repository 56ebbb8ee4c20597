mod repository;
mod service;

pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};

/// User as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct User {
    /// Assigned by PostgreSQL on insert.
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub email: String,
    /// Argon2id PHC string, never the plaintext.
    #[serde(skip)]
    pub password: String,
}
