use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};

use super::{cookies::CookieKey, errors::ServerError};
use crate::AppState;

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// One-shot messages carried across a redirect in a private cookie.
pub struct Flash {
    cookies: Cookies,
    key: CookieKey,
    secure: bool,
}

impl FromRequestParts<AppState> for Flash {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| ServerError(color_eyre::eyre::eyre!(msg), status))?;

        Ok(Self {
            cookies,
            key: state.cookie_key.clone(),
            secure: state.app.secure_cookies(),
        })
    }
}

impl Flash {
    pub fn success(&self, message: impl Into<String>) {
        self.push(FlashLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(FlashLevel::Error, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(FlashLevel::Info, message.into());
    }

    fn stored(&self) -> Vec<FlashMessage> {
        self.cookies
            .private(&self.key)
            .get(FLASH_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default()
    }

    fn push(&self, level: FlashLevel, message: String) {
        let mut messages = self.stored();
        messages.push(FlashMessage { level, message });

        let Ok(value) = serde_json::to_string(&messages) else {
            tracing::warn!("Could not serialize flash messages");

            return;
        };

        let cookie = Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true)
            .secure(self.secure);
        self.cookies.private(&self.key).add(cookie.into());
    }

    /// Returns the pending messages and forgets them.
    pub fn take(&self) -> Vec<FlashMessage> {
        let messages = self.stored();

        if !messages.is_empty() {
            self.cookies
                .private(&self.key)
                .remove(Cookie::build(FLASH_COOKIE).path("/").into());
        }

        messages
    }
}
