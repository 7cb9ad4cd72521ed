// ==============================================================================
// suspension.rs — SPRING + DAMPER SUSPENSION FORCE
// ------------------------------------------------------------------------------
// length      = clamp(hit_distance - radius, min_length, max_length)
// compression = rest_length - length           (positive below rest)
// F_spring    = compression * k
// v_susp      = (last_length - length) / dt     (positive while compressing)
// F_damper    = v_susp * c
// F           = (F_spring + F_damper) along mount up
//
// With auto_scale_by_mass, k and c are multiplied by the body mass first.
// There is no force cap. Landing after an airborne tick starts from
// last_length = max_length, which gives a one-tick damper spike; kept as is.
// ==============================================================================

use crate::raycast_wheel::types::{Real, WheelConfig};

const MIN_SCALE_MASS: Real = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuspensionOutput {
    pub length: Real,
    pub compression: Real,
    pub spring_force: Real,
    pub suspension_velocity: Real,
    pub damper_force: Real,
    /// spring + damper, signed, along mount up
    pub magnitude: Real,
}

#[inline]
pub fn suspension_length(hit_distance: Real, config: &WheelConfig) -> Real {
    (hit_distance - config.radius).clamp(config.min_length, config.max_length)
}

/// Spring and damper rates after optional mass scaling.
pub fn effective_rates(config: &WheelConfig, body_mass: Real) -> (Real, Real) {
    let k = config.spring_strength;
    let c = config.damper_strength;

    if config.auto_scale_by_mass {
        let m = body_mass.max(MIN_SCALE_MASS);
        (k * m, c * m)
    } else {
        (k, c)
    }
}

pub fn solve_suspension(
    length: Real,
    last_length: Real,
    rest_length: Real,
    k: Real,
    c: Real,
    dt: Real,
) -> SuspensionOutput {
    let compression = rest_length - length;
    let spring_force = compression * k;

    let suspension_velocity = (last_length - length) / dt;
    let damper_force = suspension_velocity * c;

    SuspensionOutput {
        length,
        compression,
        spring_force,
        suspension_velocity,
        damper_force,
        magnitude: spring_force + damper_force,
    }
}
