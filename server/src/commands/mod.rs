use clap::Subcommand;

use crate::Result;

pub(crate) mod seed;
pub(crate) mod staff;

#[derive(Subcommand)]
pub(crate) enum Command {
    Serve,
    /// Fill the database with demo users and recipes
    Seed,
    /// Allow a user to moderate comments
    Promote { username: String },
    /// Take comment moderation away from a user
    Demote { username: String },
}

impl Default for Command {
    fn default() -> Self {
        Self::Serve
    }
}

impl Command {
    pub(crate) async fn run(&self) -> Result<()> {
        match &self {
            Command::Serve => crate::http_server::cmd::serve().await,
            Command::Seed => seed::seed().await,
            Command::Promote { username } => staff::set_staff(username, true).await,
            Command::Demote { username } => staff::set_staff(username, false).await,
        }
    }
}

pub(crate) async fn db_from_env() -> Result<db::PgPool> {
    use color_eyre::eyre::Context as _;

    let database_url = std::env::var("DATABASE_URL").wrap_err("Missing DATABASE_URL")?;

    db::setup_db_pool(&database_url).await
}
