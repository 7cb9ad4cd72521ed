// ==============================================================================
// probe.rs — WHEEL CONTACT PROBE (SINGLE DOWNWARD RAY)
// ------------------------------------------------------------------------------
// Casts one ray from the wheel mount along the mount's local down axis and
// reports the ground contact, if any, within max_length + radius.
//
// A hit at exactly the search distance counts as a miss; the wheel is then
// airborne and the suspension is treated as fully extended.
// ==============================================================================

use crate::raycast_wheel::types::{Pt3, Real, Vec3, WheelConfig, WheelMount};

/// Ground contact reported by the host ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub point: Pt3,
    pub normal: Vec3,
    pub distance: Real,
}

/// Ray query service supplied by the host physics engine.
pub trait GroundProbe {
    /// `dir` is unit length. Returns the closest surface within `max_distance`.
    fn cast(&self, origin: Pt3, dir: Vec3, max_distance: Real) -> Option<GroundHit>;
}

pub fn probe_ground<P: GroundProbe + ?Sized>(
    probe: &P,
    mount: &WheelMount,
    config: &WheelConfig,
) -> Option<GroundHit> {
    let max_dist = config.probe_distance();
    let dir = -mount.up();

    let hit = probe.cast(mount.position, dir, max_dist)?;

    if !hit.distance.is_finite() || hit.distance >= max_dist {
        return None;
    }

    Some(hit)
}

/// Infinite horizontal plane, mostly for tests and tools.
#[derive(Debug, Clone, Copy)]
pub struct FlatGround {
    pub height: Real,
}

impl GroundProbe for FlatGround {
    fn cast(&self, origin: Pt3, dir: Vec3, max_distance: Real) -> Option<GroundHit> {
        // only surfaces below a downward-facing ray
        if dir.y >= -1e-6 {
            return None;
        }

        let distance = (self.height - origin.y) / dir.y;
        if distance < 0.0 || distance > max_distance {
            return None;
        }

        Some(GroundHit {
            point: origin + dir * distance,
            normal: Vec3::y(),
            distance,
        })
    }
}
