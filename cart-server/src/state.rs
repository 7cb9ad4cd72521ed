use log::warn;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::cart::Cart;
use crate::debug_builders::DebugOverlay;
use crate::physics::PhysicsWorld;
use crate::raycast_wheel::{p3, q4, ContactState, WheelInputs};

#[derive(Serialize)]
pub struct WheelSnapshot {
    pub id: String,
    pub contact: ContactState,
    pub length: f32,
    pub angle: f32,              // accumulated roll, degrees
    pub position: [f32; 3],      // visual mesh position
    pub rotation: [f32; 4],      // visual mesh rotation (quaternion)
}

#[derive(Serialize)]
pub struct CartSnapshot {
    pub id: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion
    pub speed: f32,
    pub inputs: WheelInputs, // what the cart is driving with this tick
    pub wheels: Vec<WheelSnapshot>,
}

#[derive(Serialize)]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub carts: Vec<CartSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<&'a DebugOverlay>,
}

pub fn snapshot_cart(cart: &Cart, physics: &PhysicsWorld) -> Option<CartSnapshot> {
    let body = physics.bodies.get(cart.body)?;
    let iso = body.position();

    let wheels = cart
        .wheels
        .iter()
        .filter_map(|w| {
            let step = w.last_step.as_ref()?;
            let state = w.wheel.state();
            Some(WheelSnapshot {
                id: w.id.clone(),
                contact: state.contact,
                length: state.current_length,
                angle: state.rotation_angle,
                position: p3(step.visual.position),
                rotation: q4(step.visual.rotation),
            })
        })
        .collect();

    Some(CartSnapshot {
        id: cart.id.clone(),
        position: iso.translation.vector.into(),
        rotation: q4(iso.rotation),
        speed: body.linvel().magnitude(),
        inputs: cart.inputs,
        wheels,
    })
}

pub struct SharedServerState {
    pub tick: u64,
    pub clients: Vec<UnboundedSender<String>>,
}

impl SharedServerState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            clients: Vec::new(),
        }
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) {
        self.clients.push(tx);
    }

    /// Build and send a snapshot of all carts to all clients.
    pub fn broadcast_snapshot(&mut self, physics: &PhysicsWorld) {
        let mut carts: Vec<CartSnapshot> = physics
            .carts
            .values()
            .filter_map(|cart| snapshot_cart(cart, physics))
            .collect();
        carts.sort_by(|a, b| a.id.cmp(&b.id));

        let snapshot = Snapshot {
            tick: self.tick,
            carts,
            debug: physics.debug_enabled.then_some(&physics.debug_overlay),
        };

        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!("snapshot serialization failed: {e}");
                return;
            }
        };

        // drop clients whose receiver is gone
        self.clients.retain(|tx| tx.send(json.clone()).is_ok());
    }
}

impl Default for SharedServerState {
    fn default() -> Self {
        Self::new()
    }
}
