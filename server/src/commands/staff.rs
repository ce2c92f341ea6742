use color_eyre::eyre::eyre;
use db::users::User;
use tracing::info;

use crate::Result;

pub(crate) async fn set_staff(username: &str, is_staff: bool) -> Result<()> {
    let pool = super::db_from_env().await?;

    if !User::set_staff(&pool, username, is_staff).await? {
        return Err(eyre!("No user named {username}"));
    }

    info!(username, is_staff, "Updated staff flag");

    Ok(())
}
