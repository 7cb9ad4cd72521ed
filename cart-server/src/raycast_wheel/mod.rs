//! raycast_wheel - engine-agnostic raycast wheel model (pure math + host traits)
//!
//! A wheel is approximated by a single ray cast down from its mount point.
//! The host supplies ray queries (`GroundProbe`) and a rigid body
//! (`WheelBody`); everything else lives here and is testable without rapier.

pub mod types;
pub mod error;
pub mod probe;
pub mod suspension;
pub mod friction;
pub mod drive;
pub mod visual;
pub mod state;
pub mod solve;

pub use types::*;
pub use error::WheelError;
pub use probe::{GroundHit, GroundProbe};
pub use state::ContactState;
pub use solve::{RaycastWheel, WheelBody, WheelStep};
