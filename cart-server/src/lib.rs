//! Authoritative physics server for raycast-wheeled carts.

pub mod raycast_wheel;
pub mod cart;
pub mod config;
pub mod debug_builders;
pub mod physics;
pub mod state;
pub mod net;
