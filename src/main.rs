use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blob_royale_server::config::{ServerConfig, WorldConfig};
use blob_royale_server::game::effects::{spawn_dispatcher, EffectBuffer};
use blob_royale_server::game::input::InputBuffer;
use blob_royale_server::game::world::World;
use blob_royale_server::net::broadcaster;
use blob_royale_server::net::session::Hub;
use blob_royale_server::net::transport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let server_config = ServerConfig::load_or_default();
    server_config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid server config")?;
    let world_config = WorldConfig::load_or_default();
    world_config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid world config")?;

    let effects = EffectBuffer::default();
    let _dispatcher = spawn_dispatcher(effects.receiver());

    let world = World::new(world_config, effects.sender());
    let hub = Arc::new(RwLock::new(Hub::new(world)));

    let input = InputBuffer::default();
    let input_sender = input.sender();

    tokio::spawn(broadcaster::start_game_loop(
        hub.clone(),
        input,
        effects.sender(),
    ));

    tokio::select! {
        result = transport::run(&server_config, hub, input_sender) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}
