//! Error handler for chatbrewery.

use axum::extract::rejection::FormRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SQLxError;
use thiserror::Error;

use crate::crypto::CryptoError;
use crate::template::TemplateError;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Form(#[from] FormRejection),

    #[error("password hashing failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),

    #[error("template rendering failed: {0}")]
    Template(#[from] TemplateError),

    #[error("login functionality not implemented")]
    NotImplemented,

    #[error("not found")]
    NotFound,
}

impl ServerError {
    /// HTTP status sent for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::Form(rejection) => rejection.status(),
            ServerError::Crypto(_)
            | ServerError::Sql(_)
            | ServerError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            ServerError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(
        self,
    ) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default().status(self.status());

        let response = match &self {
            ServerError::MethodNotAllowed => {
                response.title("Method not allowed.")
            },

            ServerError::Form(rejection) => response
                .title("Invalid form submission.")
                .details(&rejection.body_text()),

            ServerError::Crypto(err) => {
                tracing::error!(error = %err, "password hashing failed");
                response
            },

            ServerError::Sql(err) => {
                tracing::error!(error = %err, "could not save user");
                response.title("Could not save user.")
            },

            ServerError::Template(err) => {
                tracing::error!(error = %err, "could not render page");
                response.title("Could not load template.")
            },

            ServerError::NotImplemented => {
                response.title("Login functionality is not implemented yet.")
            },

            ServerError::NotFound => response.title("Not found."),
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
