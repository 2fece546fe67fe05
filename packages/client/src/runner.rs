//! Client execution logic.

use crate::{
    error::ClientError,
    input::RustylineSource,
    session::{SessionConfig, run_client_session},
    ui::StdoutSurface,
};

/// Run an interactive session on the terminal.
///
/// There is no reconnection: once the session ends, the client exits.
pub async fn run_client(config: SessionConfig) -> Result<(), ClientError> {
    tracing::info!(
        "Connecting to {} as '{}' (room: {})",
        config.url,
        config.name,
        config.room.as_deref().unwrap_or("<default>")
    );

    run_client_session(&config, StdoutSurface, RustylineSource::spawn()).await?;

    tracing::info!("Client session ended");
    Ok(())
}
