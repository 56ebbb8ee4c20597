use crate::ServerError;
use crate::error::Result;

/// Handler to log in. Not implemented, whatever the request is.
pub async fn handler() -> Result<()> {
    Err(ServerError::NotImplemented)
}

#[cfg(test)]
mod tests {
    use crate::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_login_not_implemented() {
        let app = app(router::lazy_state());

        let response =
            make_request(app.clone(), Method::GET, "/login?user=alice", String::new())
                .await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        let response = make_request(
            app.clone(),
            Method::POST,
            "/login",
            "username=alice&password=hunter2".into(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        let response =
            make_request(app, Method::DELETE, "/login", String::new()).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
