use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::response::Redirect;
use serde::Deserialize;

use crate::error::Result;
use crate::user::UserService;
use crate::{AppState, ServerError};

/// Where a successful signup lands.
pub const LOGIN_PAGE: &str = "/?theme=light&form=login";

/// Signup form. Missing fields are read as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Body {
    pub username: String,
    pub email: String,
    password: String,
}

/// Handler to create user.
pub async fn handler(
    State(state): State<AppState>,
    body: std::result::Result<Form<Body>, FormRejection>,
) -> Result<Redirect> {
    let Form(body) = body?;

    let user = UserService::new(state.db.postgres.clone(), Arc::clone(&state.pwd))
        .signup(body.username, body.email, &body.password)
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "user signed up");

    Ok(Redirect::to(LOGIN_PAGE))
}

/// Any method but `POST`.
pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::user::UserRepository;
    use crate::*;
    use axum::http::{StatusCode, header};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};
    use tower::util::ServiceExt;

    const ALICE: &str = "username=alice&email=a%40x.com&password=hunter2";

    #[sqlx::test]
    async fn test_signup_handler(pool: Pool<Postgres>) {
        let state = router::state(pool.clone());
        let app = app(state.clone());

        let response =
            make_request(app, Method::POST, "/signup", ALICE.into()).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PAGE);

        let repo = UserRepository::new(pool);
        assert_eq!(repo.count_by_username("alice").await.unwrap(), 1);

        let user = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_ne!(user.password, "hunter2");
        assert!(user.password.starts_with("$argon2id$v=19$"));
        assert!(state.pwd.verify_password("hunter2", &user.password).is_ok());
    }

    #[sqlx::test]
    async fn test_signup_twice(pool: Pool<Postgres>) {
        let app = app(router::state(pool.clone()));

        let response =
            make_request(app.clone(), Method::POST, "/signup", ALICE.into()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = make_request(
            app,
            Method::POST,
            "/signup",
            "username=alice&email=other%40x.com&password=other".into(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["title"], "Could not save user.");
        assert!(!body.to_string().contains("duplicate"));

        let repo = UserRepository::new(pool);
        assert_eq!(repo.count_by_username("alice").await.unwrap(), 1);
        let user = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[sqlx::test]
    async fn test_signup_wrong_method(pool: Pool<Postgres>) {
        let app = app(router::state(pool.clone()));

        let response =
            make_request(app, Method::GET, &format!("/signup?{ALICE}"), String::new())
                .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let repo = UserRepository::new(pool);
        assert_eq!(repo.count_by_username("alice").await.unwrap(), 0);
    }

    #[sqlx::test]
    async fn test_signup_missing_fields(pool: Pool<Postgres>) {
        let state = router::state(pool.clone());
        let app = app(state.clone());

        let response =
            make_request(app, Method::POST, "/signup", "username=bob".into()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let user = UserRepository::new(pool)
            .find_by_username("bob")
            .await
            .unwrap()
            .unwrap();
        assert!(user.email.is_empty());
        assert!(state.pwd.verify_password("", &user.password).is_ok());
    }

    #[sqlx::test]
    async fn test_signup_without_form_content_type(pool: Pool<Postgres>) {
        let app = app(router::state(pool.clone()));

        let response = app
            .oneshot(
                axum::extract::Request::builder()
                    .method(Method::POST)
                    .uri("/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(r#"{"username":"carol"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let repo = UserRepository::new(pool);
        assert_eq!(repo.count_by_username("carol").await.unwrap(), 0);
    }
}
