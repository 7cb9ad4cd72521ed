// ==============================================================================
// friction.rs — LINEAR (VISCOUS) TIRE FRICTION
// ------------------------------------------------------------------------------
// The contact point velocity is flattened onto the contact plane, split into
// forward / side components and each component is opposed in proportion to
// its speed:
//
//     F_fwd  = -v_fwd  * forward_friction * forward
//     F_side = -v_side * side_friction    * right
//
// No saturation, no static/kinetic split. Good enough for a pushed cart.
// ==============================================================================

use crate::raycast_wheel::types::{Real, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionOutput {
    pub v_forward: Real,
    pub v_side: Real,
    pub forward_force: Vec3,
    pub side_force: Vec3,
}

/// Velocity with the component along `normal` removed.
#[inline]
pub fn tangential_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    let n2 = normal.norm_squared();
    if n2 <= 1e-12 {
        return velocity;
    }
    velocity - normal * (velocity.dot(&normal) / n2)
}

pub fn solve_friction(
    tangent_velocity: Vec3,
    forward: Vec3,
    right: Vec3,
    forward_friction: Real,
    side_friction: Real,
) -> FrictionOutput {
    let v_forward = tangent_velocity.dot(&forward);
    let v_side = tangent_velocity.dot(&right);

    FrictionOutput {
        v_forward,
        v_side,
        forward_force: forward * (-v_forward * forward_friction),
        side_force: right * (-v_side * side_friction),
    }
}
