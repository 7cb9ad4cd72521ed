use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::raycast_wheel::{RaycastWheel, WheelConfig, WheelError, WheelInputs, WheelStep};

/// Stock mine cart wheel tuning.
pub const CART_WHEEL: WheelConfig = WheelConfig {
    radius: 0.35,
    rest_length: 0.4,
    min_length: 0.1,
    max_length: 0.5,
    spring_strength: 8000.0,
    damper_strength: 1500.0,
    auto_scale_by_mass: false,
    forward_friction: 1.5,
    side_friction: 2.0,
    driven: false,
    steerable: false,
    motor_force: 2000.0,
    brake_force: 4000.0,
};

/// Where a wheel sits on the chassis and how it is tuned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelLayout {
    pub id: String,        // "FL", "FR", "RL", "RR", ...
    pub offset: [f32; 3],  // mount point in chassis local space
    #[serde(default)]
    pub config: WheelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    pub mass: f32,                      // kg
    pub linear_damping: f32,            // drag
    pub angular_damping: f32,           // rotational drag
    pub chassis_half_extents: [f32; 3], // [hx, hy, hz] meters
    pub wheels: Vec<WheelLayout>,
}

impl Default for CartConfig {
    fn default() -> Self {
        handcart()
    }
}

fn four_wheels(half_track: f32, half_base: f32, height: f32, front: WheelConfig, rear: WheelConfig) -> Vec<WheelLayout> {
    let at = |id: &str, x: f32, z: f32, config: WheelConfig| WheelLayout {
        id: id.to_string(),
        offset: [x, height, z],
        config,
    };

    vec![
        at("FL",  half_track, half_base, front),
        at("FR", -half_track, half_base, front),
        at("RL",  half_track, -half_base, rear),
        at("RR", -half_track, -half_base, rear),
    ]
}

/// Loaded ore cart: pushed from the rear axle, turned by the front pair.
pub fn handcart() -> CartConfig {
    let wheel = WheelConfig {
        damper_strength: 1000.0,
        forward_friction: 40.0,
        side_friction: 300.0,
        motor_force: 600.0,
        brake_force: 1500.0,
        ..CART_WHEEL
    };

    CartConfig {
        mass: 200.0,
        linear_damping: 0.1,
        angular_damping: 0.8,
        chassis_half_extents: [0.6, 0.25, 0.9],
        wheels: four_wheels(
            0.6,
            0.7,
            -0.2,
            WheelConfig { steerable: true, ..wheel },
            WheelConfig { driven: true, ..wheel },
        ),
    }
}

/// Heavier four wheeler, mass-independent tuning.
pub fn buggy() -> CartConfig {
    let wheel = WheelConfig {
        radius: 0.4,
        rest_length: 0.45,
        min_length: 0.15,
        max_length: 0.6,
        spring_strength: 20_000.0,
        damper_strength: 3000.0,
        forward_friction: 80.0,
        side_friction: 900.0,
        motor_force: 2500.0,
        brake_force: 5000.0,
        ..CART_WHEEL
    };

    CartConfig {
        mass: 600.0,
        linear_damping: 0.08,
        angular_damping: 0.6,
        chassis_half_extents: [0.9, 0.3, 1.6],
        wheels: four_wheels(
            0.8,
            1.2,
            -0.25,
            WheelConfig { steerable: true, ..wheel },
            WheelConfig { driven: true, ..wheel },
        ),
    }
}

pub fn preset(name: &str) -> Option<CartConfig> {
    match name {
        "handcart" => Some(handcart()),
        "buggy" => Some(buggy()),
        _ => None,
    }
}

impl CartConfig {
    pub fn validate(&self) -> Result<(), WheelError> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(WheelError::InvalidConfig(format!("cart mass must be > 0, got {}", self.mass)));
        }
        if self.chassis_half_extents.iter().any(|h| !(h.is_finite() && *h > 0.0)) {
            return Err(WheelError::InvalidConfig("chassis half extents must be > 0".into()));
        }
        for layout in &self.wheels {
            layout.config.validate().map_err(|e| match e {
                WheelError::InvalidConfig(msg) => WheelError::InvalidConfig(format!("wheel {}: {msg}", layout.id)),
                other => other,
            })?;
        }
        Ok(())
    }
}

pub struct MountedWheel {
    pub id: String,
    pub offset: Point<Real>,        // chassis local
    pub wheel: RaycastWheel,
    pub last_step: Option<WheelStep>,
}

pub struct Cart {
    pub id: String,
    pub body: RigidBodyHandle,     // the chassis body
    pub wheels: Vec<MountedWheel>,
    pub inputs: WheelInputs,       // last write wins, consumed by the next step
}

impl Cart {
    pub fn new(id: String, body: RigidBodyHandle, config: CartConfig) -> Result<Self, WheelError> {
        config.validate()?;

        let mut cart = Self {
            id,
            body,
            wheels: Vec::with_capacity(config.wheels.len()),
            inputs: WheelInputs::default(),
        };

        for layout in &config.wheels {
            cart.attach(layout)?;
        }

        Ok(cart)
    }

    pub fn attach(&mut self, layout: &WheelLayout) -> Result<(), WheelError> {
        let [x, y, z] = layout.offset;
        let mut wheel = RaycastWheel::new(layout.config)?;
        // late attachments pick up whatever the driver is holding
        wheel.set_inputs(self.inputs.motor, self.inputs.steer_degrees, self.inputs.brake);

        self.wheels.push(MountedWheel {
            id: layout.id.clone(),
            offset: point![x, y, z],
            wheel,
            last_step: None,
        });
        Ok(())
    }

    /// motor: -1..1, steer: degrees, brake: 0..1.
    pub fn set_inputs(&mut self, motor: f32, steer_degrees: f32, brake: f32) {
        self.inputs = WheelInputs::clamped(motor, steer_degrees, brake);
        for w in self.wheels.iter_mut() {
            w.wheel.set_inputs(self.inputs.motor, self.inputs.steer_degrees, self.inputs.brake);
        }
    }

    pub fn grounded_wheels(&self) -> usize {
        self.wheels.iter().filter(|w| w.wheel.state().contact.is_grounded()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert!(handcart().validate().is_ok());
        assert!(buggy().validate().is_ok());
        assert!(preset("handcart").is_some());
        assert!(preset("wagon").is_none());
    }

    #[test]
    fn cart_wheel_matches_default_tuning() {
        assert_eq!(CART_WHEEL, WheelConfig::default());
    }

    #[test]
    fn bad_wheel_is_reported_with_its_id() {
        let mut cfg = handcart();
        cfg.wheels[2].config.rest_length = 5.0;

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("wheel RL"));
    }

    #[test]
    fn inputs_reach_every_wheel() {
        let mut cart = Cart::new("c".into(), RigidBodyHandle::invalid(), handcart()).unwrap();
        cart.set_inputs(2.0, 15.0, 0.25);

        for w in &cart.wheels {
            assert_eq!(w.wheel.inputs().motor, 1.0);
            assert_eq!(w.wheel.inputs().steer_degrees, 15.0);
            assert_eq!(w.wheel.inputs().brake, 0.25);
        }
    }

    #[test]
    fn attached_wheel_inherits_current_inputs() {
        let mut cart = Cart::new("c".into(), RigidBodyHandle::invalid(), handcart()).unwrap();
        cart.set_inputs(0.5, -10.0, 0.0);

        let layout = WheelLayout { id: "MID".into(), offset: [0.0, -0.2, 0.0], config: CART_WHEEL };
        cart.attach(&layout).unwrap();

        let mid = cart.wheels.last().unwrap();
        assert_eq!(mid.wheel.inputs().motor, 0.5);
        assert_eq!(mid.wheel.inputs().steer_degrees, -10.0);
    }
}
