// src/physics.rs

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rapier3d::prelude::*;
use rapier3d::prelude::{Group, InteractionGroups};
use std::collections::HashMap;

use crate::cart::{Cart, CartConfig, WheelLayout};
use crate::config::WorldConfig;
use crate::debug_builders::{push_wheel_debug, DebugOverlay};
use crate::raycast_wheel::{GroundHit, GroundProbe, WheelBody, WheelError, WheelMount};

const GROUP_GROUND: Group  = Group::from_bits_truncate(0b0001);
const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

/// Bodies past this distance from the origin are considered to have exploded.
const WORLD_LIMIT: Real = 1_000.0;

// --------------------------------------------------
// Host adapters for the wheel model
// --------------------------------------------------

/// Ray queries against the rapier scene, ignoring the cart's own chassis.
pub struct RapierGround<'a> {
    pub query: &'a QueryPipeline,
    pub bodies: &'a RigidBodySet,
    pub colliders: &'a ColliderSet,
    pub filter: QueryFilter<'a>,
}

impl GroundProbe for RapierGround<'_> {
    fn cast(&self, origin: Point<Real>, dir: Vector<Real>, max_distance: Real) -> Option<GroundHit> {
        let ray = Ray::new(origin, dir);
        let (_collider, hit) = self.query.cast_ray_and_get_normal(
            self.bodies,
            self.colliders,
            &ray,
            max_distance,
            true,
            self.filter,
        )?;

        Some(GroundHit {
            point: ray.point_at(hit.time_of_impact),
            normal: hit.normal,
            distance: hit.time_of_impact,
        })
    }
}

/// Per-tick snapshot of a chassis body. Wheel forces are collected here and
/// applied to the real body once every wheel has been stepped.
pub struct BodyFrame {
    linvel: Vector<Real>,
    angvel: Vector<Real>,
    com: Point<Real>,
    mass: Real,
    forces: Vec<(Vector<Real>, Point<Real>)>,
}

impl BodyFrame {
    pub fn capture(body: &RigidBody) -> Self {
        Self {
            linvel: *body.linvel(),
            angvel: *body.angvel(),
            com: *body.center_of_mass(), // world space
            mass: body.mass(),
            forces: Vec::new(),
        }
    }

    /// Replaces last tick's user forces with this tick's wheel forces.
    pub fn apply(self, body: &mut RigidBody) {
        body.reset_forces(true);
        for (force, point) in self.forces {
            body.add_force_at_point(force, point, true);
        }
    }
}

impl WheelBody for BodyFrame {
    fn velocity_at_point(&self, point: Point<Real>) -> Vector<Real> {
        // v = v_com + ω × (p - com)
        let r = point - self.com;
        self.linvel + self.angvel.cross(&r)
    }

    fn apply_force_at_point(&mut self, force: Vector<Real>, point: Point<Real>) {
        self.forces.push((force, point));
    }

    fn mass(&self) -> Real {
        self.mass
    }
}

// --------------------------------------------------
// World
// --------------------------------------------------

pub struct PhysicsWorld {
    pub gravity: Vector<Real>, // gravity vector
    pub pipeline: PhysicsPipeline, // physics pipeline
    pub island_manager: IslandManager, // manages islands of bodies
    pub broad_phase: DefaultBroadPhase, // broad-phase collision detection
    pub narrow_phase: NarrowPhase, // collision detection
    pub bodies: RigidBodySet, // for rigid bodies
    pub colliders: ColliderSet, // for collision shapes
    pub joints: ImpulseJointSet, // for constraints
    pub multibody_joints: MultibodyJointSet,// for articulated bodies
    pub ccd: CCDSolver, // continuous collision detection
    pub query_pipeline: QueryPipeline, // for raycasting
    pub carts: HashMap<String, Cart>, // cart id → cart
    pub debug_enabled: bool,
    pub debug_overlay: DebugOverlay,// for debug visualization
}

impl PhysicsWorld {

    pub fn new(world: &WorldConfig) -> Self {
        let gravity = vector![0.0, -9.81, 0.0];

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // === Static ground slab, top surface exactly at y = 0 ===
        let half = world.ground_half_extent;
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(vector![0.0, -0.1, 0.0])
            .build();

        let ground_handle = bodies.insert(ground_rb);

        let ground_collider = ColliderBuilder::cuboid(half, 0.1, half)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.2)
            .restitution(0.0)
            .build();

        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        scatter_bumps(world, &mut bodies, &mut colliders);

        info!(
            "ground inserted ({} bumps). bodies = {}, colliders = {}",
            world.bumps,
            bodies.len(),
            colliders.len()
        );

        let mut query_pipeline = QueryPipeline::new();
        query_pipeline.update(&colliders);

        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline,
            carts: HashMap::new(),
            debug_enabled: false,
            debug_overlay: DebugOverlay::default(),
        }
    }

    pub fn cart(&self, id: &str) -> Option<&Cart> {
        self.carts.get(id)
    }

    /// Spawn a cart: dynamic box chassis + its raycast wheels.
    pub fn spawn_cart(
        &mut self,
        id: String,
        position: [f32; 3],
        config: CartConfig,
    ) -> Result<RigidBodyHandle, WheelError> {
        if self.carts.contains_key(&id) {
            return Err(WheelError::InvalidConfig(format!("cart `{id}` already exists")));
        }
        config.validate()?;

        let [x, y, z] = position;
        let [hx, hy, hz] = config.chassis_half_extents;
        let volume = 8.0 * hx * hy * hz;
        let density = config.mass / volume; // ρ = m / V

        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![x, y, z])
            .linear_damping(config.linear_damping)
            .angular_damping(config.angular_damping)
            .ccd_enabled(true)
            .build();

        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND | GROUP_CHASSIS))
            .density(density)
            .friction(0.0) // wheels carry all tangential force
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        let cart = match Cart::new(id.clone(), handle, config) {
            Ok(cart) => cart,
            Err(e) => {
                self.remove_body(handle);
                return Err(e);
            }
        };

        info!(
            "spawned cart {} at {:?} with {} wheels (body = {:?})",
            id,
            position,
            cart.wheels.len(),
            handle
        );

        self.carts.insert(id, cart);
        Ok(handle)
    }

    /// Add one more wheel to an existing cart.
    pub fn attach_wheel(&mut self, cart_id: &str, layout: &WheelLayout) -> Result<(), WheelError> {
        let cart = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| WheelError::MissingBody(cart_id.to_string()))?;

        if !self.bodies.contains(cart.body) {
            return Err(WheelError::MissingBody(cart_id.to_string()));
        }

        cart.attach(layout)
    }

    pub fn despawn_cart(&mut self, id: &str) -> bool {
        let Some(cart) = self.carts.remove(id) else { return false };
        self.remove_body(cart.body);
        info!("despawned cart {}", id);
        true
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Store controller intent; consumed by the next `step`.
    pub fn set_cart_inputs(&mut self, id: &str, motor: f32, steer_degrees: f32, brake: f32) -> bool {
        match self.carts.get_mut(id) {
            Some(cart) => {
                cart.set_inputs(motor, steer_degrees, brake);
                true
            }
            None => false,
        }
    }

    /// Step every wheel of every cart and push the summed forces into the
    /// chassis bodies. Must run before the integrator.
    fn apply_wheels(&mut self, dt: Real) -> Result<(), WheelError> {
        self.query_pipeline.update(&self.colliders);

        for cart in self.carts.values_mut() {
            let Some(body) = self.bodies.get(cart.body) else {
                warn!("cart {} lost its body, skipping wheels", cart.id);
                continue;
            };

            let pos = *body.position();
            let mut frame = BodyFrame::capture(body);

            let ground = RapierGround {
                query: &self.query_pipeline,
                bodies: &self.bodies,
                colliders: &self.colliders,
                filter: QueryFilter::default().exclude_rigid_body(cart.body),
            };

            for mounted in cart.wheels.iter_mut() {
                let mount = WheelMount::new(pos * mounted.offset, pos.rotation);
                let step = mounted.wheel.step(&mount, &ground, &mut frame, dt)?;

                if step.transitioned {
                    debug!("cart {} wheel {} -> {:?}", cart.id, mounted.id, step.contact);
                }

                if self.debug_enabled {
                    push_wheel_debug(
                        &mut self.debug_overlay,
                        &cart.id,
                        &mounted.id,
                        mounted.wheel.config(),
                        &mount,
                        &step,
                        mounted.wheel.state().rotation_angle,
                    );
                }

                mounted.last_step = Some(step);
            }

            if let Some(body) = self.bodies.get_mut(cart.body) {
                frame.apply(body);
            }
        }

        Ok(())
    }

    pub fn step(&mut self, dt: Real) -> Result<(), WheelError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(WheelError::NonPositiveTimestep(dt));
        }

        self.debug_overlay.clear();

        // 1) Raycast wheels -> forces (all wheels before integration)
        self.apply_wheels(dt)?;

        // 2) Integrate
        let hooks = ();
        let events = ();

        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &hooks,
            &events,
        );

        // 3) Safety: prevent bodies from exploding to insane coordinates
        for (_, body) in self.bodies.iter_mut() {
            let pos = *body.translation();

            let bad = !pos.x.is_finite() || !pos.y.is_finite() || !pos.z.is_finite()
                || pos.x.abs() > WORLD_LIMIT || pos.y.abs() > WORLD_LIMIT || pos.z.abs() > WORLD_LIMIT;

            if bad {
                let reset = vector![0.0, 2.0, 0.0];
                body.set_translation(reset, true);
                body.set_rotation(Rotation::identity(), true);
                body.set_linvel(vector![0.0, 0.0, 0.0], true);
                body.set_angvel(vector![0.0, 0.0, 0.0], true);
                body.reset_forces(true);

                warn!("reset exploding body back to {:?}", reset);
            }
        }

        Ok(())
    }
}

fn scatter_bumps(world: &WorldConfig, bodies: &mut RigidBodySet, colliders: &mut ColliderSet) {
    if world.bumps == 0 {
        return;
    }

    let mut rng = StdRng::seed_from_u64(world.bump_seed);
    // keep the spawn area flat
    let spread = (world.ground_half_extent * 0.5).max(10.0);

    for _ in 0..world.bumps {
        let x: f32 = rng.gen_range(-spread..spread);
        let z: f32 = rng.gen_range(-spread..spread);
        if x.abs() < 5.0 && z.abs() < 5.0 {
            continue;
        }

        let hx: f32 = rng.gen_range(0.3..1.5);
        let hz: f32 = rng.gen_range(0.3..1.5);
        let h = world.bump_height * rng.gen_range(0.5..1.0);

        let rb = RigidBodyBuilder::fixed()
            .translation(vector![x, h * 0.5, z])
            .rotation(vector![0.0, rng.gen_range(0.0..std::f32::consts::PI), 0.0])
            .build();
        let handle = bodies.insert(rb);

        let collider = ColliderBuilder::cuboid(hx, h * 0.5, hz)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.0)
            .build();
        colliders.insert_with_parent(collider, handle, bodies);
    }
}
