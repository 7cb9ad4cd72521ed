use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use log::{error, info};
use tokio::sync::Mutex;
use tokio::time::{interval, Duration, MissedTickBehavior};

use cart_server::config::ServerConfig;
use cart_server::net::{start_websocket_server, SpawnSettings};
use cart_server::physics::PhysicsWorld;
use cart_server::state::SharedServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // optional TOML config path as the only argument
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => ServerConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    let cart = config.cart_config()?;
    let dt = config.dt();

    info!("starting cart physics server ({} Hz, dt = {dt:.4} s)", config.tick_hz);

    let state = Arc::new(Mutex::new(SharedServerState::new()));
    let physics = {
        let mut world = PhysicsWorld::new(&config.world);
        world.debug_enabled = config.debug_overlay;
        Arc::new(Mutex::new(world))
    };

    // Start WebSocket server
    let server = tokio::spawn(start_websocket_server(
        config.bind_addr.clone(),
        Arc::clone(&state),
        Arc::clone(&physics),
        SpawnSettings { cart, height: config.spawn_height },
    ));

    // Fixed timestep
    let mut ticker = interval(Duration::from_secs_f32(dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if server.is_finished() {
            return match server.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e.context("websocket server stopped")),
                Err(e) => Err(e.into()),
            };
        }

        let mut phys = physics.lock().await;
        let mut game = state.lock().await;

        // Step physics (wheel forces, then integration)
        if let Err(e) = phys.step(dt) {
            error!("physics step failed: {e}");
            continue;
        }

        // Advance tick + broadcast snapshot
        game.tick += 1;
        game.broadcast_snapshot(&phys);
    }
}
