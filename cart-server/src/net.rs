use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::accept_async;
use tungstenite::Message;
use uuid::Uuid;

use crate::cart::CartConfig;
use crate::physics::PhysicsWorld;
use crate::raycast_wheel::WheelError;
use crate::state::SharedServerState;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Input {
        #[serde(default)]
        motor: f32,
        #[serde(default)]
        steer: f32, // degrees
        #[serde(default)]
        brake: f32,
    },
    Ping,
}

impl ClientMessage {
    pub fn from_json(txt: &str) -> Option<Self> {
        serde_json::from_str(txt).ok()
    }
}

/// What every connection needs to spawn its cart.
#[derive(Clone)]
pub struct SpawnSettings {
    pub cart: CartConfig,
    pub height: f32,
}

pub async fn start_websocket_server(
    bind_addr: String,
    state: Arc<Mutex<SharedServerState>>,
    physics: Arc<Mutex<PhysicsWorld>>,
    spawn: SpawnSettings,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("websocket listening on ws://{bind_addr}");

    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };

        let state = Arc::clone(&state);
        let physics = Arc::clone(&physics);
        let spawn = spawn.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(raw, state, physics, spawn).await {
                warn!("client {peer} ended with error: {e}");
            }
        });
    }
}

/// Spawns a fresh cart and registers `tx` for snapshots. A client whose cart
/// could not be spawned is never registered.
async fn join_world(
    state: &Mutex<SharedServerState>,
    physics: &Mutex<PhysicsWorld>,
    spawn: &SpawnSettings,
    tx: mpsc::UnboundedSender<String>,
) -> Result<String, WheelError> {
    let cart_id = Uuid::new_v4().to_string();
    {
        let mut phys = physics.lock().await;
        let x = (phys.carts.len() as f32) * 4.0;
        phys.spawn_cart(cart_id.clone(), [x, spawn.height, 0.0], spawn.cart.clone())?;
    }

    state.lock().await.register_client(tx);
    Ok(cart_id)
}

async fn handle_client(
    raw: TcpStream,
    state: Arc<Mutex<SharedServerState>>,
    physics: Arc<Mutex<PhysicsWorld>>,
    spawn: SpawnSettings,
) -> anyhow::Result<()> {
    let ws = accept_async(raw).await?;
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing message channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // -------------------------------
    // 2) Spawn this client's cart, then subscribe it to snapshots
    // -------------------------------
    let cart_id = join_world(&state, &physics, &spawn, tx.clone()).await?;

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    info!("client connected: cart {cart_id}");

    let welcome = serde_json::json!({ "type": "welcome", "cart_id": cart_id });
    let _ = tx.send(welcome.to_string());

    // -------------------------------
    // 3) Receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                debug!("cart {cart_id} read error: {e}");
                break;
            }
        };

        if !msg.is_text() {
            continue;
        }
        let Ok(text) = msg.to_text() else { continue };

        match ClientMessage::from_json(text) {
            Some(ClientMessage::Ping) => {
                let _ = tx.send(r#"{"type":"pong"}"#.to_string());
            }
            Some(ClientMessage::Input { motor, steer, brake }) => {
                let mut phys = physics.lock().await;
                if !phys.set_cart_inputs(&cart_id, motor, steer, brake) {
                    error!("input for unknown cart {cart_id}");
                }
            }
            None => debug!("ignoring message from {cart_id}: {text}"),
        }
    }

    info!("client disconnected: cart {cart_id}");
    physics.lock().await.despawn_cart(&cart_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::handcart;
    use crate::config::WorldConfig;

    #[test]
    fn parses_input_and_ping() {
        let m = ClientMessage::from_json(r#"{"type":"input","motor":0.5,"steer":-12.0,"brake":0.0}"#);
        assert_eq!(m, Some(ClientMessage::Input { motor: 0.5, steer: -12.0, brake: 0.0 }));

        assert_eq!(ClientMessage::from_json(r#"{"type":"ping"}"#), Some(ClientMessage::Ping));
    }

    #[test]
    fn missing_axes_default_to_zero() {
        let m = ClientMessage::from_json(r#"{"type":"input","brake":1}"#);
        assert_eq!(m, Some(ClientMessage::Input { motor: 0.0, steer: 0.0, brake: 1.0 }));
    }

    fn world_and_state() -> (Mutex<SharedServerState>, Mutex<PhysicsWorld>) {
        (
            Mutex::new(SharedServerState::new()),
            Mutex::new(PhysicsWorld::new(&WorldConfig::default())),
        )
    }

    #[tokio::test]
    async fn joining_spawns_a_cart_and_subscribes() {
        let (state, physics) = world_and_state();
        let spawn = SpawnSettings { cart: handcart(), height: 1.2 };
        let (tx, _rx) = mpsc::unbounded_channel();

        let cart_id = join_world(&state, &physics, &spawn, tx).await.unwrap();

        assert!(physics.lock().await.cart(&cart_id).is_some());
        assert_eq!(state.lock().await.clients.len(), 1);
    }

    #[tokio::test]
    async fn failed_spawn_does_not_subscribe() {
        let (state, physics) = world_and_state();
        let mut cart = handcart();
        cart.mass = 0.0;
        let spawn = SpawnSettings { cart, height: 1.2 };
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(join_world(&state, &physics, &spawn, tx).await.is_err());

        assert!(state.lock().await.clients.is_empty());
        assert!(physics.lock().await.carts.is_empty());
    }

    #[test]
    fn garbage_is_ignored() {
        assert!(ClientMessage::from_json("not json").is_none());
        assert!(ClientMessage::from_json(r#"{"type":"teleport"}"#).is_none());
    }
}
