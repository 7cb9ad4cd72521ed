//! Core shared types for `raycast_wheel` (engine-agnostic).
// raycast_wheel/types.rs
use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::raycast_wheel::error::WheelError;

pub type Real = f32;
pub type Vec3 = Vector3<Real>;
pub type Pt3 = Point3<Real>;
pub type Rot3 = UnitQuaternion<Real>;

#[inline] pub fn v3(v: Vec3) -> [f32; 3] { [v.x, v.y, v.z] }
#[inline] pub fn p3(p: Pt3) -> [f32; 3] { [p.x, p.y, p.z] }
#[inline] pub fn q4(q: Rot3) -> [f32; 4] { [q.i, q.j, q.k, q.w] }

// ============================================
// ----- configs / inputs ---------------------
// ============================================

/// Tuning for one wheel. Set once when the cart is composed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    // --- Geometry ---
    pub radius: Real,           // m
    pub rest_length: Real,      // m, neutral suspension length
    pub min_length: Real,       // m, fully compressed
    pub max_length: Real,       // m, fully extended

    // --- Suspension ---
    pub spring_strength: Real,  // N/m (or N/m/kg when mass scaled)
    pub damper_strength: Real,  // N*s/m (or per kg when mass scaled)
    pub auto_scale_by_mass: bool,

    // --- Friction ---
    pub forward_friction: Real, // N*s/m along rolling direction
    pub side_friction: Real,    // N*s/m across rolling direction

    // --- Drive / steer / brake ---
    pub driven: bool,
    pub steerable: bool,
    pub motor_force: Real,      // N at motor = 1
    pub brake_force: Real,      // N at brake = 1
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
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
        }
    }
}

impl WheelConfig {
    /// Ray search distance below the mount.
    #[inline]
    pub fn probe_distance(&self) -> Real {
        self.max_length + self.radius
    }

    pub fn validate(&self) -> Result<(), WheelError> {
        let scalars = [
            ("radius", self.radius),
            ("rest_length", self.rest_length),
            ("min_length", self.min_length),
            ("max_length", self.max_length),
            ("spring_strength", self.spring_strength),
            ("damper_strength", self.damper_strength),
            ("forward_friction", self.forward_friction),
            ("side_friction", self.side_friction),
            ("motor_force", self.motor_force),
            ("brake_force", self.brake_force),
        ];

        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(WheelError::InvalidConfig(format!("{name} is not finite ({value})")));
            }
            if value < 0.0 {
                return Err(WheelError::InvalidConfig(format!("{name} must be >= 0, got {value}")));
            }
        }

        if self.min_length > self.max_length {
            return Err(WheelError::InvalidConfig(format!(
                "min_length ({}) exceeds max_length ({})",
                self.min_length, self.max_length
            )));
        }

        if self.rest_length < self.min_length || self.rest_length > self.max_length {
            return Err(WheelError::InvalidConfig(format!(
                "rest_length ({}) outside travel [{}, {}]",
                self.rest_length, self.min_length, self.max_length
            )));
        }

        Ok(())
    }
}

/// Driver intent, written by a controller between physics steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelInputs {
    pub motor: Real,         // -1..1
    pub steer_degrees: Real, // degrees, only used by steerable wheels
    pub brake: Real,         // 0..1
}

impl WheelInputs {
    pub fn clamped(motor: Real, steer_degrees: Real, brake: Real) -> Self {
        Self {
            motor: if motor.is_finite() { motor.clamp(-1.0, 1.0) } else { 0.0 },
            steer_degrees: if steer_degrees.is_finite() { steer_degrees } else { 0.0 },
            brake: if brake.is_finite() { brake.clamp(0.0, 1.0) } else { 0.0 },
        }
    }
}

// ============================================
// ----- mount pose ---------------------------
// ============================================

/// World pose of the wheel's attachment point. Owned by the vehicle; the
/// wheel only reads it.
///
/// Local axes: up = +Y, forward = +Z, right = -X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelMount {
    pub position: Pt3,
    pub rotation: Rot3,
}

impl WheelMount {
    pub fn new(position: Pt3, rotation: Rot3) -> Self {
        Self { position, rotation }
    }

    /// Axis-aligned mount at `position`.
    pub fn upright(position: Pt3) -> Self {
        Self { position, rotation: Rot3::identity() }
    }

    #[inline] pub fn up(&self) -> Vec3 { self.rotation * Vec3::y() }
    #[inline] pub fn forward(&self) -> Vec3 { self.rotation * Vec3::z() }
    #[inline] pub fn right(&self) -> Vec3 { self.rotation * -Vec3::x() }
}

// ============================================
// ----- per-tick output ----------------------
// ============================================

/// Force breakdown of one step. `total` is what was applied to the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelForces {
    pub suspension: Vec3,
    pub forward_friction: Vec3,
    pub side_friction: Vec3,
    pub drive: Vec3,
    pub total: Vec3,
}

impl WheelForces {
    pub fn zero() -> Self {
        Self {
            suspension: Vec3::zeros(),
            forward_friction: Vec3::zeros(),
            side_friction: Vec3::zeros(),
            drive: Vec3::zeros(),
            total: Vec3::zeros(),
        }
    }
}
