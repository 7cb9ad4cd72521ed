// ==============================================================================
// solve.rs — PER-TICK RAYCAST WHEEL STEP
// ==============================================================================
// One call per wheel per fixed physics step, before the host integrates the
// body:
//
//   1) probe          -> GroundHit or miss
//   2) contact state  -> Airborne / Grounded (no hysteresis)
//   3) grounded:
//        suspension (spring + damper, along mount up)
//      + friction   (viscous, forward / side, on the contact plane)
//      + drive/brake (forward axis)
//      = one force, applied at the contact point
//      visual roll advances by v_fwd * dt
//   4) airborne:
//        length snaps to max_length, nothing is applied, visual parks
//
// Wheels on the same body only add forces, so their order does not matter.
// ==============================================================================

use crate::raycast_wheel::drive::solve_drive_brake;
use crate::raycast_wheel::error::WheelError;
use crate::raycast_wheel::friction::{solve_friction, tangential_velocity};
use crate::raycast_wheel::probe::{probe_ground, GroundHit, GroundProbe};
use crate::raycast_wheel::state::{update_contact_state, ContactState};
use crate::raycast_wheel::suspension::{
    effective_rates, solve_suspension, suspension_length, SuspensionOutput,
};
use crate::raycast_wheel::types::{Pt3, Real, Vec3, WheelConfig, WheelForces, WheelInputs, WheelMount};
use crate::raycast_wheel::visual::{airborne_visual, grounded_visual, roll_angle_delta, steer_rotation, WheelVisual};

/// Rigid body service supplied by the host.
pub trait WheelBody {
    /// World velocity of a point rigidly attached to the body.
    fn velocity_at_point(&self, point: Pt3) -> Vec3;
    fn apply_force_at_point(&mut self, force: Vec3, point: Pt3);
    fn mass(&self) -> Real;
}

/// Mutable state carried from one tick to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelState {
    pub current_length: Real,
    pub last_length: Real,
    /// Accumulated roll in degrees; never wrapped.
    pub rotation_angle: Real,
    pub contact: ContactState,
    pub last_hit: Option<GroundHit>,
}

/// Everything one step produced, for snapshots and debug overlays.
#[derive(Debug, Clone, Copy)]
pub struct WheelStep {
    pub contact: ContactState,
    pub transitioned: bool,
    pub hit: Option<GroundHit>,
    pub suspension: Option<SuspensionOutput>,
    pub v_forward: Real,
    pub forces: WheelForces,
    pub visual: WheelVisual,
}

#[derive(Debug, Clone)]
pub struct RaycastWheel {
    config: WheelConfig,
    state: WheelState,
    inputs: WheelInputs,
}

impl RaycastWheel {
    pub fn new(config: WheelConfig) -> Result<Self, WheelError> {
        config.validate()?;

        Ok(Self {
            config,
            state: WheelState {
                current_length: config.rest_length,
                last_length: config.rest_length,
                rotation_angle: 0.0,
                contact: ContactState::Airborne,
                last_hit: None,
            },
            inputs: WheelInputs::default(),
        })
    }

    pub fn config(&self) -> &WheelConfig { &self.config }
    pub fn state(&self) -> &WheelState { &self.state }
    pub fn inputs(&self) -> &WheelInputs { &self.inputs }

    /// motor: -1..1, steer: degrees, brake: 0..1. Last write before a step wins.
    pub fn set_inputs(&mut self, motor: Real, steer_degrees: Real, brake: Real) {
        self.inputs = WheelInputs::clamped(motor, steer_degrees, brake);
    }

    pub fn step<P, B>(
        &mut self,
        mount: &WheelMount,
        probe: &P,
        body: &mut B,
        dt: Real,
    ) -> Result<WheelStep, WheelError>
    where
        P: GroundProbe + ?Sized,
        B: WheelBody + ?Sized,
    {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(WheelError::NonPositiveTimestep(dt));
        }

        let cfg = self.config;
        let hit = probe_ground(probe, mount, &cfg);
        let (contact, transitioned) = update_contact_state(self.state.contact, hit.is_some());
        self.state.contact = contact;
        self.state.last_hit = hit;

        let Some(hit) = hit else {
            self.state.current_length = cfg.max_length;
            self.state.last_length = cfg.max_length;

            return Ok(WheelStep {
                contact,
                transitioned,
                hit: None,
                suspension: None,
                v_forward: 0.0,
                forces: WheelForces::zero(),
                visual: airborne_visual(mount, &cfg, &self.inputs, self.state.rotation_angle),
            });
        };

        // ----------------------------------------------------
        // Suspension
        // ----------------------------------------------------
        let length = suspension_length(hit.distance, &cfg);
        self.state.current_length = length;

        let (k, c) = effective_rates(&cfg, body.mass());
        let susp = solve_suspension(length, self.state.last_length, cfg.rest_length, k, c, dt);
        let suspension_force = mount.up() * susp.magnitude;

        // ----------------------------------------------------
        // Wheel basis (steered about mount up)
        // ----------------------------------------------------
        let basis = mount.rotation * steer_rotation(&cfg, &self.inputs);
        let forward = basis * Vec3::z();
        let right = basis * -Vec3::x();

        // ----------------------------------------------------
        // Friction on the contact plane
        // ----------------------------------------------------
        let v_point = body.velocity_at_point(hit.point);
        let v_tangent = tangential_velocity(v_point, hit.normal);
        let fric = solve_friction(v_tangent, forward, right, cfg.forward_friction, cfg.side_friction);

        // ----------------------------------------------------
        // Drive / brake
        // ----------------------------------------------------
        let drive = solve_drive_brake(&cfg, &self.inputs, fric.v_forward, forward);

        let total = suspension_force + fric.forward_force + fric.side_force + drive;
        body.apply_force_at_point(total, hit.point);

        self.state.last_length = length;

        // ----------------------------------------------------
        // Visual
        // ----------------------------------------------------
        self.state.rotation_angle += roll_angle_delta(fric.v_forward, dt, cfg.radius);
        let visual = grounded_visual(
            mount,
            &cfg,
            &self.inputs,
            hit.point,
            hit.normal,
            self.state.rotation_angle,
        );

        Ok(WheelStep {
            contact,
            transitioned,
            hit: Some(hit),
            suspension: Some(susp),
            v_forward: fric.v_forward,
            forces: WheelForces {
                suspension: suspension_force,
                forward_friction: fric.forward_force,
                side_friction: fric.side_force,
                drive,
                total,
            },
            visual,
        })
    }
}
