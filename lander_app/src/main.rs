//! Lunar lander demo
//!
//! A headless simulation: a ship falls toward a landing pad through a field
//! of drifting rocks while an autopilot burns its limited fuel to slow the
//! descent. Touching the pad grades the landing by descent speed, touching
//! a rock wrecks the ship. Rocks brushing the pad or each other have no
//! handler and only show up in the collision statistics.
//!
//! Usage: `lander [config.toml|config.ron]`

use arcade_engine::foundation::logging;
use arcade_engine::prelude::*;
use rand::Rng;
use thiserror::Error;

const WORLD_WIDTH: f32 = 800.0;
const PAD_TOP: f32 = 560.0;
const GRAVITY: f32 = 40.0;
const THRUST: f32 = 100.0;
const FUEL_SECONDS: f32 = 5.0;
const SAFE_DESCENT: f32 = 6.0;
const FLARE_MARGIN: f32 = 2.0;
const CRASH_SPEED: f32 = 20.0;
const HARD_LANDING_SPEED: f32 = 10.0;
const ROCK_COUNT: usize = 12;
const DEFAULT_TICK_LIMIT: u64 = 1200;

/// Demo-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Configuration file error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// An entity the demo relies on is gone
    #[error("Missing entity: {0}")]
    MissingEntity(&'static str),

    /// A system the demo relies on is not registered
    #[error("Missing system: {0}")]
    MissingSystem(&'static str),
}

/// Flight state of the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipState {
    /// Still falling
    Flying,
    /// Touched down gently on the pad
    Landed,
    /// Touched down hard enough to break the landing gear
    BrokenGear,
    /// Hit a rock or the pad too fast
    Crashed,
}

impl ShipState {
    fn color(self) -> Color {
        match self {
            Self::Flying => Color::WHITE,
            Self::Landed => Color::GREEN,
            Self::BrokenGear => Color::YELLOW,
            Self::Crashed => Color::RED,
        }
    }
}

/// Outcome of touching the pad at `speed`
fn grade_touchdown(speed: f32) -> ShipState {
    if speed > CRASH_SPEED {
        ShipState::Crashed
    } else if speed > HARD_LANDING_SPEED {
        ShipState::BrokenGear
    } else {
        ShipState::Landed
    }
}

/// What the ship touched during the last collision scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Pad,
    Rock,
}

/// The player's ship
#[derive(Debug)]
pub struct Ship {
    node: Node,
    size: Vec2,
    fill: Color,
    state: ShipState,
    fuel: f32,
    contact: Option<Contact>,
}

impl Ship {
    fn new(position: Vec2, fuel: f32) -> Self {
        Self {
            node: Node::at(position),
            size: Vec2::new(20.0, 30.0),
            fill: Color::WHITE,
            state: ShipState::Flying,
            fuel,
            contact: None,
        }
    }

    /// Distance from the bottom of the ship to the pad
    fn altitude(&self) -> f32 {
        PAD_TOP - (self.node.position.y + self.size.y)
    }

    /// Burn when braking at full thrust only just reaches a safe speed by the pad
    fn steer(&mut self, motion: &mut Motion, delta_time: f32) {
        let speed = motion.velocity.y;
        let braking = 2.0 * (THRUST - GRAVITY) * (self.altitude() - FLARE_MARGIN);
        let burn = self.fuel > 0.0 && speed > SAFE_DESCENT && speed * speed - SAFE_DESCENT * SAFE_DESCENT >= braking;

        motion.acceleration = Vec2::new(0.0, GRAVITY);
        if burn {
            motion.acceleration.y -= THRUST;
            self.fuel = (self.fuel - delta_time).max(0.0);
        }
    }

    /// Resolve the last contact, or keep flying
    fn fly(&mut self, motion: &mut Motion, delta_time: f32) -> ShipState {
        if self.state != ShipState::Flying {
            return self.state;
        }

        let speed = motion.velocity.y;
        match self.contact.take() {
            Some(Contact::Rock) => {
                log::info!("Ship hit a rock at descent speed {speed:.1}");
                self.settle(ShipState::Crashed, motion);
            }
            Some(Contact::Pad) => {
                let state = grade_touchdown(speed);
                log::info!("Touchdown at descent speed {speed:.1}: {state:?}");
                self.settle(state, motion);
            }
            None => self.steer(motion, delta_time),
        }
        self.state
    }

    fn settle(&mut self, state: ShipState, motion: &mut Motion) {
        self.state = state;
        self.fill = state.color();
        motion.stop();
    }
}

impl Entity for Ship {
    fn node(&self) -> &Node {
        &self.node
    }

    fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.x, self.size.y)
    }
}

struct Rock {
    key: EntityKey,
    radius: f32,
}

/// Placement of a rock before the simulation starts
#[derive(Debug, Clone, Copy)]
pub struct RockSpawn {
    position: Vec2,
    velocity: Vec2,
    radius: f32,
}

/// Random rock field across the sky above the pad
fn scatter_rocks(rng: &mut impl Rng, count: usize) -> Vec<RockSpawn> {
    (0..count)
        .map(|_| {
            let radius = rng.gen_range(6.0..16.0);
            RockSpawn {
                position: Vec2::new(rng.gen_range(0.0..WORLD_WIDTH), rng.gen_range(150.0..PAD_TOP)),
                velocity: Vec2::new(rng.gen_range(-40.0..40.0), 0.0),
                radius,
            }
        })
        .collect()
}

/// Lander demo application
pub struct LanderApp {
    spawns: Vec<RockSpawn>,
    ship_start: Vec2,
    fuel: f32,
    rocks: Vec<Rock>,
    ship: Option<EntityKey>,
    state: ShipState,
    unhandled: usize,
}

impl LanderApp {
    /// Create the demo with the given rock placements and seconds of thrust
    pub fn new(spawns: Vec<RockSpawn>, fuel: f32) -> Self {
        Self {
            spawns,
            ship_start: Vec2::new(390.0, 80.0),
            fuel,
            rocks: Vec::new(),
            ship: None,
            state: ShipState::Flying,
            unhandled: 0,
        }
    }

    fn register_handlers(collisions: &mut CollisionSystem) {
        collisions.add_handler(|ship: &mut Ship, _pad: &mut RectangleEntity, contact: &Rect| {
            log::debug!("Ship touching pad at x = {:.1}", contact.left);
            if ship.contact.is_none() {
                ship.contact = Some(Contact::Pad);
            }
            Ok(())
        });

        collisions.add_handler(|ship: &mut Ship, rock: &mut CircleEntity, contact: &Rect| {
            log::debug!("Ship touching rock at ({:.1}, {:.1})", contact.left, contact.top);
            ship.contact = Some(Contact::Rock);
            rock.fill = Color::YELLOW;
            Ok(())
        });
    }

    /// Final state of the ship
    pub fn state(&self) -> ShipState {
        self.state
    }

    fn tally_unhandled(&mut self, engine: &Engine) {
        if let Some(collisions) = engine.system::<CollisionSystem>() {
            self.unhandled += collisions.last_tick().unhandled;
        }
    }

    fn wrap_rocks(&self, scene: &mut Scene) {
        for rock in &self.rocks {
            let Some(entity) = scene.get_mut(rock.key) else {
                continue;
            };
            let node = entity.node_mut();
            if node.position.x > WORLD_WIDTH {
                node.position.x = -2.0 * rock.radius;
            } else if node.position.x < -2.0 * rock.radius {
                node.position.x = WORLD_WIDTH;
            }
        }
    }
}

impl Application for LanderApp {
    type Error = AppError;

    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Setting up lander scene...");
        let mut collisions = CollisionSystem::from_config(&engine.config().collision);
        Self::register_handlers(&mut collisions);
        let mut movement = MovementSystem::new();
        let scene = engine.scene_mut();

        let pad = scene.spawn(
            RectangleEntity::new(Vec2::new(WORLD_WIDTH, 40.0))
                .at(Vec2::new(0.0, PAD_TOP))
                .with_fill(Color::BLUE),
        );
        let ship = scene.spawn(Ship::new(self.ship_start, self.fuel));
        let flame = scene.spawn(
            CircleEntity::new(4.0)
                .at(Vec2::new(6.0, 30.0))
                .with_fill(Color::YELLOW),
        );
        scene.attach(flame, ship)?;

        collisions.add_entity(scene, pad);
        collisions.add_entity(scene, ship);
        movement.add_entity(scene, ship);
        movement.set_acceleration(ship, Vec2::new(0.0, GRAVITY));

        for spawn in &self.spawns {
            let key = scene.spawn(
                CircleEntity::new(spawn.radius)
                    .at(spawn.position)
                    .with_fill(Color::WHITE),
            );
            collisions.add_entity(scene, key);
            movement.add_entity(scene, key);
            movement.set_velocity(key, spawn.velocity);
            self.rocks.push(Rock {
                key,
                radius: spawn.radius,
            });
        }

        self.ship = Some(ship);
        log::info!(
            "Scene ready: {} entities, {} handlers, detection level {:?}",
            scene.len(),
            collisions.handlers().len(),
            collisions.level()
        );

        engine.add_system(movement);
        engine.add_system(collisions);
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        self.tally_unhandled(engine);

        let key = self.ship.ok_or(AppError::MissingEntity("ship"))?;
        let (movement, scene) = engine
            .system_and_scene_mut::<MovementSystem>()
            .ok_or(AppError::MissingSystem("movement"))?;
        let ship = scene.get_as_mut::<Ship>(key).ok_or(AppError::MissingEntity("ship"))?;
        let motion = movement.motion_mut(key).ok_or(AppError::MissingEntity("ship motion"))?;

        self.state = ship.fly(motion, delta_time);
        self.wrap_rocks(scene);
        Ok(())
    }

    fn should_exit(&self) -> bool {
        self.state != ShipState::Flying
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        self.tally_unhandled(engine);
        log::info!(
            "Simulation ended after {} ticks: ship {:?}, {} unhandled collisions",
            engine.tick_count(),
            self.state,
            self.unhandled
        );
    }
}

fn load_config() -> Result<EngineConfig, AppError> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {path}");
            EngineConfig::load_from_file(path)?
        }
        None => EngineConfig::default(),
    };
    if config.max_ticks.is_none() {
        config.max_ticks = Some(DEFAULT_TICK_LIMIT);
    }
    Ok(config)
}

fn main() -> Result<(), AppError> {
    logging::init();
    log::info!("Starting lander demo");

    let config = load_config()?;
    let spawns = scatter_rocks(&mut rand::thread_rng(), ROCK_COUNT);
    let mut app = LanderApp::new(spawns, FUEL_SECONDS);

    let result = Engine::new(config).and_then(|mut engine| engine.run(&mut app));
    match result {
        Ok(()) => {
            log::info!("Lander demo finished: {:?}", app.state());
            Ok(())
        }
        Err(e) => {
            log::error!("Lander demo failed: {e}");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(mut app: LanderApp) -> (LanderApp, Engine) {
        let config = EngineConfig {
            max_ticks: Some(DEFAULT_TICK_LIMIT),
            ..Default::default()
        };
        let mut engine = Engine::new(config).unwrap();
        engine.run(&mut app).unwrap();
        (app, engine)
    }

    fn ship(app: &LanderApp, engine: &Engine) -> (ShipState, Color, f32) {
        let ship = engine.scene().get_as::<Ship>(app.ship.unwrap()).unwrap();
        (ship.state, ship.fill, ship.fuel)
    }

    #[test]
    fn test_touchdown_graded_by_speed() {
        assert_eq!(grade_touchdown(4.0), ShipState::Landed);
        assert_eq!(grade_touchdown(10.0), ShipState::Landed);
        assert_eq!(grade_touchdown(15.0), ShipState::BrokenGear);
        assert_eq!(grade_touchdown(20.0), ShipState::BrokenGear);
        assert_eq!(grade_touchdown(25.0), ShipState::Crashed);
    }

    #[test]
    fn test_autopilot_lands_on_clear_sky() {
        let (app, engine) = run(LanderApp::new(Vec::new(), FUEL_SECONDS));

        assert_eq!(app.state(), ShipState::Landed);
        let (state, fill, fuel) = ship(&app, &engine);
        assert_eq!(state, ShipState::Landed);
        assert_eq!(fill, Color::GREEN);
        assert!(fuel < FUEL_SECONDS);

        let movement = engine.system::<MovementSystem>().unwrap();
        assert_relative_eq!(movement.motion(app.ship.unwrap()).unwrap().velocity.y, 0.0);
        assert!(engine.tick_count() < DEFAULT_TICK_LIMIT);
    }

    #[test]
    fn test_free_fall_onto_pad_crashes() {
        let (app, engine) = run(LanderApp::new(Vec::new(), 0.0));

        assert_eq!(app.state(), ShipState::Crashed);
        assert_eq!(ship(&app, &engine).1, Color::RED);
    }

    #[test]
    fn test_short_drop_breaks_gear() {
        // Bottom of the ship starts 3 units above the pad
        let mut app = LanderApp::new(Vec::new(), 0.0);
        app.ship_start = Vec2::new(390.0, PAD_TOP - 33.0);

        let (app, engine) = run(app);

        assert_eq!(app.state(), ShipState::BrokenGear);
        assert_eq!(ship(&app, &engine).1, Color::YELLOW);
    }

    #[test]
    fn test_ship_crashes_into_rock_below() {
        let rock = RockSpawn {
            position: Vec2::new(385.0, 300.0),
            velocity: Vec2::zeros(),
            radius: 15.0,
        };
        let (app, engine) = run(LanderApp::new(vec![rock], FUEL_SECONDS));

        assert_eq!(app.state(), ShipState::Crashed);
        let rock = engine.scene().get_as::<CircleEntity>(app.rocks[0].key).unwrap();
        assert_eq!(rock.fill, Color::YELLOW);
    }

    #[test]
    fn test_rocks_drift_with_their_velocity() {
        let rock = RockSpawn {
            position: Vec2::new(100.0, 200.0),
            velocity: Vec2::new(-30.0, 0.0),
            radius: 8.0,
        };
        let (app, engine) = run(LanderApp::new(vec![rock], FUEL_SECONDS));

        let moved = engine.scene().get(app.rocks[0].key).unwrap().node().position;
        assert!(moved.x < 100.0 || moved.x > WORLD_WIDTH - 100.0);
        assert_relative_eq!(moved.y, 200.0);
    }

    #[test]
    fn test_rock_on_pad_is_unhandled() {
        let rock = RockSpawn {
            position: Vec2::new(40.0, PAD_TOP - 10.0),
            velocity: Vec2::zeros(),
            radius: 10.0,
        };
        let (app, _) = run(LanderApp::new(vec![rock], FUEL_SECONDS));

        assert_eq!(app.state(), ShipState::Landed);
        assert!(app.unhandled > 0);
    }

    #[test]
    fn test_flame_follows_ship() {
        let (app, mut engine) = run(LanderApp::new(Vec::new(), FUEL_SECONDS));
        let ship_key = app.ship.unwrap();
        let flame = engine.scene().children(ship_key)[0];
        engine.scene_mut().propagate_transforms();

        let ship_origin = engine.scene().get(ship_key).unwrap().node().position;
        let flame_bounds = engine.scene().get(flame).unwrap().world_bounds();

        assert_relative_eq!(flame_bounds.left, ship_origin.x + 6.0, epsilon = 1e-3);
        assert_relative_eq!(flame_bounds.top, ship_origin.y + 30.0, epsilon = 1e-3);
    }

    #[test]
    fn test_scatter_stays_in_sky() {
        let spawns = scatter_rocks(&mut rand::thread_rng(), 50);

        assert_eq!(spawns.len(), 50);
        assert!(spawns
            .iter()
            .all(|s| (0.0..WORLD_WIDTH).contains(&s.position.x) && s.position.y < PAD_TOP));
    }
}
