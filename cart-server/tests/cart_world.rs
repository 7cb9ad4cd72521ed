use cart_server::cart::{handcart, WheelLayout};
use cart_server::config::WorldConfig;
use cart_server::physics::PhysicsWorld;
use cart_server::raycast_wheel::{ContactState, WheelConfig, WheelError};
use cart_server::state::snapshot_cart;

const DT: f32 = 0.02;

fn world() -> PhysicsWorld {
    PhysicsWorld::new(&WorldConfig::default())
}

fn run(world: &mut PhysicsWorld, ticks: usize) {
    for _ in 0..ticks {
        world.step(DT).unwrap();
    }
}

#[test]
fn handcart_settles_on_its_wheels() {
    let mut w = world();
    let body = w.spawn_cart("cart".into(), [0.0, 1.2, 0.0], handcart()).unwrap();

    run(&mut w, 250);

    let cart = w.cart("cart").unwrap();
    assert_eq!(cart.grounded_wheels(), 4);

    let rb = &w.bodies[body];
    let y = rb.translation().y;
    // radius 0.35 + ~0.34 spring length + 0.2 mount offset
    assert!(y > 0.75 && y < 1.0, "chassis height {y}");
    assert!(rb.linvel().magnitude() < 0.5, "still moving: {:?}", rb.linvel());

    for mounted in &cart.wheels {
        let state = mounted.wheel.state();
        assert!(state.current_length >= 0.1 && state.current_length <= 0.5);
        let step = mounted.last_step.as_ref().unwrap();
        assert!(step.forces.suspension.y > 0.0);
    }
}

#[test]
fn cart_high_in_the_air_has_no_wheel_forces() {
    let mut w = world();
    w.spawn_cart("sky".into(), [0.0, 20.0, 0.0], handcart()).unwrap();

    w.step(DT).unwrap();

    let cart = w.cart("sky").unwrap();
    assert_eq!(cart.grounded_wheels(), 0);
    for mounted in &cart.wheels {
        let step = mounted.last_step.as_ref().unwrap();
        assert_eq!(step.contact, ContactState::Airborne);
        assert_eq!(step.forces.total.magnitude(), 0.0);
        assert_eq!(mounted.wheel.state().current_length, 0.5);
        assert_eq!(mounted.wheel.state().rotation_angle, 0.0);
    }
}

#[test]
fn motor_pushes_the_cart_forward() {
    let mut w = world();
    let body = w.spawn_cart("cart".into(), [0.0, 1.2, 0.0], handcart()).unwrap();
    run(&mut w, 150);
    let start_z = w.bodies[body].translation().z;

    assert!(w.set_cart_inputs("cart", 1.0, 0.0, 0.0));
    run(&mut w, 100);

    let end_z = w.bodies[body].translation().z;
    assert!(end_z - start_z > 0.5, "moved {}", end_z - start_z);

    // wheels spun forward while rolling
    let cart = w.cart("cart").unwrap();
    assert!(cart.wheels.iter().all(|m| m.wheel.state().rotation_angle > 0.0));
}

#[test]
fn snapshot_lists_every_wheel_after_a_step() {
    let mut w = world();
    w.spawn_cart("cart".into(), [0.0, 1.2, 0.0], handcart()).unwrap();
    w.step(DT).unwrap();

    w.set_cart_inputs("cart", 0.5, 12.0, 0.0);
    let snap = snapshot_cart(w.cart("cart").unwrap(), &w).unwrap();
    assert_eq!(snap.wheels.len(), 4);
    assert_eq!(snap.inputs.steer_degrees, 12.0);

    let json = serde_json::to_string(&snap).unwrap();
    assert!(json.contains("\"FL\""));
}

#[test]
fn attach_to_unknown_cart_is_missing_body() {
    let mut w = world();
    let layout = WheelLayout {
        id: "X".into(),
        offset: [0.0, -0.2, 0.0],
        config: WheelConfig::default(),
    };

    let err = w.attach_wheel("nobody", &layout).unwrap_err();
    assert!(matches!(err, WheelError::MissingBody(_)));
}

#[test]
fn attach_adds_a_fifth_wheel() {
    let mut w = world();
    w.spawn_cart("cart".into(), [0.0, 1.2, 0.0], handcart()).unwrap();
    let layout = WheelLayout {
        id: "MID".into(),
        offset: [0.0, -0.2, 0.0],
        config: WheelConfig::default(),
    };

    w.attach_wheel("cart", &layout).unwrap();
    assert_eq!(w.cart("cart").unwrap().wheels.len(), 5);
}

#[test]
fn invalid_cart_is_rejected_without_leaking_a_body() {
    let mut w = world();
    let before = w.bodies.len();

    let mut cfg = handcart();
    cfg.wheels[0].config.min_length = 0.9;

    assert!(w.spawn_cart("bad".into(), [0.0, 1.2, 0.0], cfg).is_err());
    assert_eq!(w.bodies.len(), before);
    assert!(w.cart("bad").is_none());
}

#[test]
fn duplicate_cart_id_is_rejected_and_despawn_frees_everything() {
    let mut w = world();
    let before = w.bodies.len();
    let colliders_before = w.colliders.len();

    let first = w.spawn_cart("dup".into(), [0.0, 1.2, 0.0], handcart()).unwrap();
    let err = w.spawn_cart("dup".into(), [4.0, 1.2, 0.0], handcart()).unwrap_err();
    assert!(matches!(err, WheelError::InvalidConfig(_)));
    assert_eq!(w.bodies.len(), before + 1);
    assert!(w.bodies.get(first).is_some());

    assert!(w.despawn_cart("dup"));
    assert_eq!(w.bodies.len(), before);
    assert_eq!(w.colliders.len(), colliders_before);
}

#[test]
fn zero_timestep_is_an_error() {
    let mut w = world();
    assert!(matches!(w.step(0.0), Err(WheelError::NonPositiveTimestep(_))));
    assert!(w.step(-0.02).is_err());
}

#[test]
fn despawn_removes_cart_and_body() {
    let mut w = world();
    let body = w.spawn_cart("cart".into(), [0.0, 1.2, 0.0], handcart()).unwrap();

    assert!(w.despawn_cart("cart"));
    assert!(!w.despawn_cart("cart"));
    assert!(w.cart("cart").is_none());
    assert!(w.bodies.get(body).is_none());
    assert!(!w.set_cart_inputs("cart", 1.0, 0.0, 0.0));
}
