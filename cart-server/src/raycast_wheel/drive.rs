// ==============================================================================
// drive.rs — MOTOR + BRAKE FORCE ALONG THE WHEEL FORWARD AXIS
// ------------------------------------------------------------------------------
// Motor (driven wheels only):  motor * motor_force * forward
// Brake (brake > 0.001):       -sign(v_fwd) * brake * brake_force * forward
//
// Below 0.1 m/s the rolling direction is ambiguous; the sign is pinned to +1
// so the brake does not flip back and forth around zero speed.
// ==============================================================================

use crate::raycast_wheel::types::{Real, Vec3, WheelConfig, WheelInputs};

pub const BRAKE_INPUT_EPS: Real = 0.001;
pub const BRAKE_STABLE_SPEED: Real = 0.1;

pub fn solve_drive_brake(
    config: &WheelConfig,
    inputs: &WheelInputs,
    v_forward: Real,
    forward: Vec3,
) -> Vec3 {
    let mut force = Vec3::zeros();

    if config.driven {
        force += forward * (inputs.motor * config.motor_force);
    }

    if inputs.brake > BRAKE_INPUT_EPS {
        force -= forward * (brake_sign(v_forward) * inputs.brake * config.brake_force);
    }

    force
}

#[inline]
fn brake_sign(v_forward: Real) -> Real {
    if v_forward.abs() < BRAKE_STABLE_SPEED { 1.0 } else { v_forward.signum() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fwd() -> Vec3 { Vec3::new(0.0, 0.0, 1.0) }

    #[test]
    fn neutral_inputs_give_no_force() {
        let cfg = WheelConfig::default();
        let idle = WheelInputs::clamped(0.0, 0.0, 0.0);

        for _ in 0..10 {
            for v in [-20.0, -0.05, 0.0, 0.05, 3.0, 40.0] {
                assert_eq!(solve_drive_brake(&cfg, &idle, v, fwd()), Vec3::zeros());
            }
        }
    }

    #[test]
    fn motor_only_on_driven_wheels() {
        let input = WheelInputs::clamped(0.5, 0.0, 0.0);

        let free = WheelConfig::default();
        assert_eq!(solve_drive_brake(&free, &input, 0.0, fwd()), Vec3::zeros());

        let driven = WheelConfig { driven: true, ..Default::default() };
        let f = solve_drive_brake(&driven, &input, 0.0, fwd());
        assert_eq!(f, Vec3::new(0.0, 0.0, 1000.0));
    }

    #[test]
    fn brake_opposes_rolling_direction() {
        let cfg = WheelConfig::default();
        let input = WheelInputs::clamped(0.0, 0.0, 0.5);

        let rolling_fwd = solve_drive_brake(&cfg, &input, 4.0, fwd());
        assert_eq!(rolling_fwd, Vec3::new(0.0, 0.0, -2000.0));

        let rolling_back = solve_drive_brake(&cfg, &input, -4.0, fwd());
        assert_eq!(rolling_back, Vec3::new(0.0, 0.0, 2000.0));
    }

    #[test]
    fn brake_direction_is_stable_near_zero_speed() {
        let cfg = WheelConfig::default();
        let input = WheelInputs::clamped(0.0, 0.0, 1.0);

        let a = solve_drive_brake(&cfg, &input, 0.05, fwd());
        let b = solve_drive_brake(&cfg, &input, -0.05, fwd());
        let c = solve_drive_brake(&cfg, &input, 0.0, fwd());

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert!(a.z < 0.0);
    }

    #[test]
    fn tiny_brake_input_is_ignored() {
        let cfg = WheelConfig::default();
        let input = WheelInputs { brake: 0.0005, ..Default::default() };
        assert_eq!(solve_drive_brake(&cfg, &input, 5.0, fwd()), Vec3::zeros());
    }
}
