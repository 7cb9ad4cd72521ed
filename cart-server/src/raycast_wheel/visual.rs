//! Cosmetic wheel pose. Nothing here feeds back into physics.

use std::f32::consts::PI;

use nalgebra::Unit;

use crate::raycast_wheel::types::{Pt3, Real, Rot3, Vec3, WheelConfig, WheelInputs, WheelMount};

const MIN_CIRCUMFERENCE: Real = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelVisual {
    pub position: Pt3,
    pub rotation: Rot3,
}

/// Roll angle (degrees) gained by rolling `v_forward * dt` metres.
pub fn roll_angle_delta(v_forward: Real, dt: Real, radius: Real) -> Real {
    let circumference = 2.0 * PI * radius;
    if circumference <= MIN_CIRCUMFERENCE {
        return 0.0;
    }
    (v_forward * dt / circumference) * 360.0
}

/// Steer rotation about the mount's local up axis (identity for fixed wheels).
pub fn steer_rotation(config: &WheelConfig, inputs: &WheelInputs) -> Rot3 {
    if config.steerable {
        Rot3::from_axis_angle(&Vec3::y_axis(), inputs.steer_degrees.to_radians())
    } else {
        Rot3::identity()
    }
}

fn wheel_rotation(mount: &WheelMount, steer: Rot3, roll_degrees: Real) -> Rot3 {
    // roll about the local lateral axis
    let axle: Unit<Vec3> = Vec3::x_axis();
    let spin = Rot3::from_axis_angle(&axle, roll_degrees.to_radians());
    mount.rotation * steer * spin
}

pub fn grounded_visual(
    mount: &WheelMount,
    config: &WheelConfig,
    inputs: &WheelInputs,
    contact_point: Pt3,
    contact_normal: Vec3,
    roll_degrees: Real,
) -> WheelVisual {
    WheelVisual {
        position: contact_point + contact_normal * config.radius,
        rotation: wheel_rotation(mount, steer_rotation(config, inputs), roll_degrees),
    }
}

/// Parked below the mount; the ray found nothing to follow.
pub fn airborne_visual(
    mount: &WheelMount,
    config: &WheelConfig,
    inputs: &WheelInputs,
    roll_degrees: Real,
) -> WheelVisual {
    WheelVisual {
        position: mount.position - mount.up() * (config.rest_length - config.min_length),
        rotation: wheel_rotation(mount, steer_rotation(config, inputs), roll_degrees),
    }
}
