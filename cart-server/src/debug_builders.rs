// ==============================================================================
// debug_builders.rs — DEBUG OVERLAY PRIMITIVES (SERVER -> CLIENT)
// ------------------------------------------------------------------------------
// Serializable gizmos for each wheel, rebuilt every tick:
// - DebugRay:    full suspension ray (mount -> max_length + radius)
// - DebugTravel: rest point, min/max travel segment, wheel radius
// - DebugContact: hit point + ground normal while grounded
// - DebugWheel:  per-wheel numbers (length, compression, force, roll)
//
// This file is purely visualization scaffolding and must not have physics
// side effects.
// ==============================================================================

use serde::Serialize;

use crate::raycast_wheel::{p3, v3, WheelConfig, WheelMount, WheelStep};

#[derive(Clone, Serialize)]
pub struct DebugRay {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub length: f32,
    pub hit: Option<[f32; 3]>,
    pub color: [f32; 3],
}

#[derive(Clone, Serialize)]
pub struct DebugTravel {
    pub rest_point: [f32; 3],
    pub min_point: [f32; 3],
    pub max_point: [f32; 3],
    pub radius: f32,
}

#[derive(Clone, Serialize)]
pub struct DebugContact {
    pub point: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Clone, Serialize)]
pub struct DebugWheel {
    pub cart: String,
    pub id: String,
    pub grounded: bool,
    pub length: f32,
    pub compression: f32,
    pub suspension_force: f32,
    pub total_force: [f32; 3],
    pub rotation_angle: f32,
}

#[derive(Clone, Default, Serialize)]
pub struct DebugOverlay {
    pub suspension_rays: Vec<DebugRay>,
    pub travel: Vec<DebugTravel>,
    pub contacts: Vec<DebugContact>,
    pub wheels: Vec<DebugWheel>,
}

impl DebugOverlay {
    pub fn clear(&mut self) {
        self.suspension_rays.clear();
        self.travel.clear();
        self.contacts.clear();
        self.wheels.clear();
    }
}

const GROUNDED: [f32; 3] = [0.0, 1.0, 0.0];  // green
const AIRBORNE: [f32; 3] = [0.5, 0.5, 0.5];  // gray

pub fn push_wheel_debug(
    overlay: &mut DebugOverlay,
    cart_id: &str,
    wheel_id: &str,
    config: &WheelConfig,
    mount: &WheelMount,
    step: &WheelStep,
    rotation_angle: f32,
) {
    let dir = -mount.up();
    let origin = mount.position;

    overlay.suspension_rays.push(DebugRay {
        origin: p3(origin),
        direction: v3(dir),
        length: config.probe_distance(),
        hit: step.hit.map(|h| p3(h.point)),
        color: if step.contact.is_grounded() { GROUNDED } else { AIRBORNE },
    });

    overlay.travel.push(DebugTravel {
        rest_point: p3(origin + dir * config.rest_length),
        min_point: p3(origin + dir * config.min_length),
        max_point: p3(origin + dir * config.max_length),
        radius: config.radius,
    });

    if let Some(hit) = step.hit {
        overlay.contacts.push(DebugContact {
            point: p3(hit.point),
            normal: v3(hit.normal),
        });
    }

    let (length, compression, suspension_force) = match step.suspension {
        Some(s) => (s.length, s.compression, s.magnitude),
        None => (config.max_length, config.rest_length - config.max_length, 0.0),
    };

    overlay.wheels.push(DebugWheel {
        cart: cart_id.to_string(),
        id: wheel_id.to_string(),
        grounded: step.contact.is_grounded(),
        length,
        compression,
        suspension_force,
        total_force: v3(step.forces.total),
        rotation_angle,
    });
}
