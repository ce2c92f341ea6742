use color_eyre::eyre::Context;
use db::setup_db_pool;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;
use url::Url;

use crate::http_server::cookies::CookieKey;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub base_url: Url,
}

impl AppConfig {
    #[instrument(name = "AppConfig::from_env")]
    pub fn from_env() -> color_eyre::Result<Self> {
        let base_url = std::env::var("APP_BASE_URL")
            .wrap_err("Missing APP_BASE_URL, needed for app launch")?;
        let base_url = Url::parse(&base_url).wrap_err("Invalid APP_BASE_URL not parsable")?;

        Ok(Self { base_url })
    }

    pub fn app_url(&self, path: &str) -> String {
        let mut url = self.base_url.clone();

        url.set_path(path);

        url.into()
    }

    /// Cookies are only marked `Secure` when the site is served over https.
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
}

impl VersionInfo {
    #[instrument(name = "VersionInfo::from_env")]
    pub(crate) fn from_env() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_commit: option_env!("GIT_COMMIT").unwrap_or("unknown"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub app: AppConfig,
    pub versions: VersionInfo,
    pub db: PgPool,
    pub cookie_key: CookieKey,
}

impl AppState {
    #[instrument(name = "AppState::from_env", err)]
    pub async fn from_env() -> color_eyre::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").wrap_err("Missing DATABASE_URL, needed for app launch")?;

        let app_state = AppState {
            app: AppConfig::from_env()?,
            versions: VersionInfo::from_env(),
            db: setup_db_pool(&database_url).await?,
            cookie_key: CookieKey::from_env_or_generate()?,
        };

        Ok(app_state)
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }
}
