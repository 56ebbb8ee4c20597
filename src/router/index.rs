//! Landing page with signup and login forms.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Html;

use crate::AppState;
use crate::error::Result;

pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_FORM: &str = "signup";

/// Display modes read from the query string.
///
/// The first non-empty value of each key wins, so a repeated or unknown key
/// never resets the other mode.
#[derive(Debug, Default)]
pub struct Display {
    theme: Option<String>,
    form: Option<String>,
}

impl Display {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut display = Self::default();

        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }

            let slot = match key.as_str() {
                "theme" => &mut display.theme,
                "form" => &mut display.form,
                _ => continue,
            };
            slot.get_or_insert(value);
        }

        display
    }

    fn theme(&self) -> &str {
        self.theme.as_deref().unwrap_or(DEFAULT_THEME)
    }

    fn form(&self) -> &str {
        self.form.as_deref().unwrap_or(DEFAULT_FORM)
    }
}

/// Handler to render the landing page.
pub async fn handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Html<String>> {
    // An unreadable query string renders the defaults.
    let display = query
        .map(|Query(pairs)| Display::from_pairs(pairs))
        .unwrap_or_default();

    let page = state
        .templates
        .index(display.theme(), display.form())
        .await?;

    Ok(Html(page))
}
