use tracing::info;

use crate::{http_server::run_server, AppState, Result};

pub(crate) async fn serve() -> Result<()> {
    let app_state = AppState::from_env().await?;

    info!(
        version = app_state.versions.version,
        base_url = %app_state.app.base_url,
        "Serving recipes"
    );

    run_server(app_state).await?;

    info!("Main Returning");

    Ok(())
}
