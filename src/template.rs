//! Page rendering.
//!
//! Templates are read from disk on every render so edits show up without a
//! restart.

use std::path::PathBuf;

use minijinja::{Environment, context};

pub const INDEX: &str = "index.html";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("cannot read `{path}`: {source}")]
    Load {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Render(#[from] minijinja::Error),
}

/// Renders pages found under one directory.
#[derive(Debug, Clone)]
pub struct Templates {
    dir: PathBuf,
}

impl Templates {
    /// Create a new [`Templates`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Render the landing page with its display modes.
    pub async fn index(
        &self,
        theme: &str,
        form: &str,
    ) -> Result<String, TemplateError> {
        let path = self.dir.join(INDEX);
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| TemplateError::Load { path, source })?;

        // `.html` names turn on HTML auto-escaping.
        let mut env = Environment::new();
        env.add_template(INDEX, &source)?;

        Ok(env
            .get_template(INDEX)?
            .render(context! { theme => theme, form => form })?)
    }
}
