//! Declarative maze layout and deterministic world construction.
//!
//! A `MazeLayout` is pure data: wall segments, hinged door segments, the
//! pushable obstacle, the player spawn, key markers and the exit. `build`
//! turns it into a populated physics world; rebuilding from the same layout
//! always produces a structurally identical world with zero accumulated
//! state, which is how a game reset works.

use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collision::Category;
use crate::physics::{ANGULAR_DAMPING, LINEAR_DAMPING, PhysicsWorld};

/// Friction coefficient for walls and door panels.
const WALL_FRICTION: f32 = 1.0;

/// Error type for layout validation and world construction.
///
/// Construction either fully succeeds or fails before any body exists; a
/// partially built world is never handed to the caller.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("world bounds must be positive, got {0}x{1}")]
    InvalidBounds(f32, f32),
    #[error("non-positive mass for {0}: {1}")]
    InvalidMass(&'static str, f32),
    #[error("non-positive radius for {0}: {1}")]
    InvalidRadius(&'static str, f32),
    #[error("non-positive thickness for {0}: {1}")]
    InvalidThickness(&'static str, f32),
    #[error("door segment endpoints coincide at ({0}, {1})")]
    DegenerateDoor(f32, f32),
    #[error("layout provides {available} keys but requires {required}")]
    NotEnoughKeys { available: usize, required: u32 },
}

/// World bounds: four boundary walls are built at `margin` from the edges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub margin: f32,
    pub wall_thickness: f32,
}

/// A static wall segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WallSegment {
    pub start: [f32; 2],
    pub end: [f32; 2],
}

impl WallSegment {
    pub const fn new(start: [f32; 2], end: [f32; 2]) -> Self {
        Self { start, end }
    }
}

/// A hinged door segment. The hinge endpoint is the fixed pivot; the tip is
/// the free end that gets pushed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DoorSegment {
    pub hinge: [f32; 2],
    pub tip: [f32; 2],
}

impl DoorSegment {
    pub const fn new(hinge: [f32; 2], tip: [f32; 2]) -> Self {
        Self { hinge, tip }
    }
}

/// Shared parameters for every door in a layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DoorStyle {
    pub thickness: f32,
    pub mass: f32,
    pub friction: f32,
    /// Rotation limit on either side of the closed angle, in degrees.
    pub max_angle_degrees: f32,
    /// Restoring torque per radian of displacement from the closed angle.
    pub spring_stiffness: f32,
    /// Damping torque per radian/second of angular velocity.
    pub spring_damping: f32,
}

impl Default for DoorStyle {
    fn default() -> Self {
        Self {
            thickness: 5.0,
            mass: 5.0,
            friction: 1.0,
            max_angle_degrees: 90.0,
            spring_stiffness: 60_000.0,
            spring_damping: 2_000.0,
        }
    }
}

/// Spawn parameters for a dynamic ball (the player or the obstacle).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BallSpawn {
    pub position: [f32; 2],
    pub radius: f32,
    pub mass: f32,
    pub friction: f32,
}

/// A static sensor circle (the exit marker).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorSpot {
    pub position: [f32; 2],
    pub radius: f32,
}

/// Complete declarative maze description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeLayout {
    pub bounds: Bounds,
    pub walls: Vec<WallSegment>,
    pub doors: Vec<DoorSegment>,
    #[serde(default)]
    pub door_style: DoorStyle,
    pub obstacle: BallSpawn,
    pub player: BallSpawn,
    pub keys: Vec<[f32; 2]>,
    pub key_radius: f32,
    pub exit: SensorSpot,
    /// Keys the player must hold before the exit opens.
    pub required_keys: u32,
}

/// A populated world plus the handles the game logic needs to drive it.
#[derive(Debug)]
pub struct MazeWorld {
    pub physics: PhysicsWorld,
    pub player_body: RigidBodyHandle,
    pub player_collider: ColliderHandle,
    pub obstacle_body: RigidBodyHandle,
    pub door_bodies: Vec<RigidBodyHandle>,
    pub door_joints: Vec<ImpulseJointHandle>,
    pub key_colliders: Vec<ColliderHandle>,
    pub exit_collider: ColliderHandle,
}

impl MazeLayout {
    /// Loads a maze layout from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the maze layout to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The built-in maze: a 750x750 board with 26 interior walls, four
    /// self-closing doors, three keys and one exit.
    pub fn classic() -> Self {
        Self {
            bounds: Bounds {
                width: 750.0,
                height: 750.0,
                margin: 0.0,
                wall_thickness: 5.0,
            },
            walls: vec![
                WallSegment::new([0.0, 650.0], [250.0, 650.0]),
                WallSegment::new([350.0, 550.0], [350.0, 750.0]),
                WallSegment::new([450.0, 650.0], [650.0, 650.0]),
                WallSegment::new([650.0, 450.0], [650.0, 650.0]),
                WallSegment::new([100.0, 350.0], [100.0, 550.0]),
                WallSegment::new([100.0, 550.0], [250.0, 550.0]),
                WallSegment::new([250.0, 550.0], [250.0, 350.0]),
                WallSegment::new([250.0, 450.0], [450.0, 450.0]),
                WallSegment::new([450.0, 450.0], [450.0, 550.0]),
                WallSegment::new([450.0, 550.0], [550.0, 550.0]),
                WallSegment::new([450.0, 250.0], [550.0, 250.0]),
                WallSegment::new([0.0, 250.0], [350.0, 250.0]),
                WallSegment::new([250.0, 350.0], [350.0, 350.0]),
                WallSegment::new([175.0, 100.0], [175.0, 490.0]),
                WallSegment::new([100.0, 0.0], [100.0, 175.0]),
                WallSegment::new([250.0, 0.0], [250.0, 175.0]),
                WallSegment::new([350.0, 0.0], [350.0, 175.0]),
                WallSegment::new([450.0, 60.0], [450.0, 175.0]),
                WallSegment::new([350.0, 150.0], [450.0, 150.0]),
                WallSegment::new([650.0, 60.0], [650.0, 150.0]),
                WallSegment::new([550.0, 150.0], [650.0, 150.0]),
                WallSegment::new([550.0, 150.0], [550.0, 450.0]),
                WallSegment::new([450.0, 350.0], [650.0, 350.0]),
                WallSegment::new([650.0, 250.0], [750.0, 250.0]),
                WallSegment::new([650.0, 450.0], [750.0, 450.0]),
                WallSegment::new([550.0, 0.0], [550.0, 150.0]),
            ],
            doors: vec![
                DoorSegment::new([550.0, 740.0], [550.0, 660.0]),
                DoorSegment::new([740.0, 150.0], [660.0, 150.0]),
                DoorSegment::new([100.0, 240.0], [100.0, 185.0]),
                DoorSegment::new([100.0, 740.0], [100.0, 660.0]),
            ],
            door_style: DoorStyle::default(),
            obstacle: BallSpawn {
                position: [400.0, 300.0],
                radius: 43.0,
                mass: 10.0,
                friction: 1.2,
            },
            player: BallSpawn {
                position: [50.0, 700.0],
                radius: 20.0,
                mass: 3.0,
                friction: 1.0,
            },
            keys: vec![[50.0, 50.0], [600.0, 100.0], [700.0, 500.0]],
            key_radius: 12.0,
            exit: SensorSpot {
                position: [400.0, 100.0],
                radius: 18.0,
            },
            required_keys: 3,
        }
    }

    /// Checks the layout for configuration errors.
    pub fn validate(&self) -> Result<(), BuildError> {
        let b = &self.bounds;
        if b.width <= 0.0 || b.height <= 0.0 {
            return Err(BuildError::InvalidBounds(b.width, b.height));
        }
        if b.wall_thickness <= 0.0 {
            return Err(BuildError::InvalidThickness("wall", b.wall_thickness));
        }

        let style = &self.door_style;
        if style.thickness <= 0.0 {
            return Err(BuildError::InvalidThickness("door", style.thickness));
        }
        if style.mass <= 0.0 {
            return Err(BuildError::InvalidMass("door", style.mass));
        }
        for door in &self.doors {
            if door.hinge == door.tip {
                return Err(BuildError::DegenerateDoor(door.hinge[0], door.hinge[1]));
            }
        }

        if self.obstacle.mass <= 0.0 {
            return Err(BuildError::InvalidMass("obstacle", self.obstacle.mass));
        }
        if self.obstacle.radius <= 0.0 {
            return Err(BuildError::InvalidRadius("obstacle", self.obstacle.radius));
        }
        if self.player.mass <= 0.0 {
            return Err(BuildError::InvalidMass("player", self.player.mass));
        }
        if self.player.radius <= 0.0 {
            return Err(BuildError::InvalidRadius("player", self.player.radius));
        }
        if self.key_radius <= 0.0 {
            return Err(BuildError::InvalidRadius("key", self.key_radius));
        }
        if self.exit.radius <= 0.0 {
            return Err(BuildError::InvalidRadius("exit", self.exit.radius));
        }

        if self.keys.len() < self.required_keys as usize {
            return Err(BuildError::NotEnoughKeys {
                available: self.keys.len(),
                required: self.required_keys,
            });
        }

        Ok(())
    }

    /// Builds a populated physics world from this layout.
    ///
    /// Construction order is fixed: boundary walls, interior walls, doors,
    /// obstacle, player, keys, exit. Two builds of one layout therefore
    /// produce worlds with identical handle structure.
    pub fn build(&self) -> Result<MazeWorld, BuildError> {
        self.validate()?;

        let mut physics = PhysicsWorld::new();
        let b = &self.bounds;

        let (left, right) = (b.margin, b.width - b.margin);
        let (top, bottom) = (b.margin, b.height - b.margin);
        let boundary = [
            WallSegment::new([left, top], [right, top]),
            WallSegment::new([left, bottom], [right, bottom]),
            WallSegment::new([left, top], [left, bottom]),
            WallSegment::new([right, top], [right, bottom]),
        ];
        for wall in &boundary {
            physics.add_static_collider(wall_collider(wall, b.wall_thickness));
        }

        for wall in &self.walls {
            physics.add_static_collider(wall_collider(wall, b.wall_thickness));
        }

        let mut door_bodies = Vec::with_capacity(self.doors.len());
        let mut door_joints = Vec::with_capacity(self.doors.len());
        for door in &self.doors {
            let (body, joint) = build_door(&mut physics, door, &self.door_style);
            door_bodies.push(body);
            door_joints.push(joint);
        }

        let (obstacle_body, _) = add_ball(&mut physics, &self.obstacle, None);
        let (player_body, player_collider) =
            add_ball(&mut physics, &self.player, Some(Category::Player));

        let key_colliders = self
            .keys
            .iter()
            .map(|&position| {
                physics.add_static_collider(sensor_collider(
                    position,
                    self.key_radius,
                    Category::Key,
                ))
            })
            .collect();

        let exit_collider = physics.add_static_collider(sensor_collider(
            self.exit.position,
            self.exit.radius,
            Category::Exit,
        ));

        tracing::debug!(
            "[maze] built world: {} bodies, {} colliders, {} joints",
            physics.rigid_body_set.len(),
            physics.collider_set.len(),
            physics.impulse_joint_set.len(),
        );

        Ok(MazeWorld {
            physics,
            player_body,
            player_collider,
            obstacle_body,
            door_bodies,
            door_joints,
            key_colliders,
            exit_collider,
        })
    }
}

/// A thick wall segment as a static capsule collider in world coordinates.
fn wall_collider(wall: &WallSegment, thickness: f32) -> Collider {
    ColliderBuilder::new(SharedShape::capsule(
        Vector::new(wall.start[0], wall.start[1]),
        Vector::new(wall.end[0], wall.end[1]),
        thickness,
    ))
    .friction(WALL_FRICTION)
    .restitution(0.0)
    .user_data(Category::Wall.user_data())
    .build()
}

/// A static sensor circle: detects overlap, never produces a physical
/// response.
fn sensor_collider(position: [f32; 2], radius: f32, category: Category) -> Collider {
    ColliderBuilder::ball(radius)
        .translation(Vector::new(position[0], position[1]))
        .sensor(true)
        .user_data(category.user_data())
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build()
}

/// A dynamic ball with the layout's mass and friction. Only the player
/// carries a category and emits collision events.
fn add_ball(
    physics: &mut PhysicsWorld,
    spawn: &BallSpawn,
    category: Option<Category>,
) -> (RigidBodyHandle, ColliderHandle) {
    let body = RigidBodyBuilder::dynamic()
        .translation(Vector::new(spawn.position[0], spawn.position[1]))
        .linear_damping(LINEAR_DAMPING)
        .angular_damping(ANGULAR_DAMPING)
        .ccd_enabled(true)
        .build();
    let body_handle = physics.add_rigid_body(body);

    let mut collider = ColliderBuilder::ball(spawn.radius)
        .mass(spawn.mass)
        .friction(spawn.friction)
        .restitution(0.0);
    if let Some(category) = category {
        collider = collider
            .user_data(category.user_data())
            .active_events(ActiveEvents::COLLISION_EVENTS);
    }
    let collider_handle = physics.add_collider(collider.build(), body_handle);

    (body_handle, collider_handle)
}

/// Builds one self-closing door: a dynamic panel pinned to a fixed anchor at
/// the hinge, with a damped angular spring toward the closed angle and a
/// rotation limit. The panel, its collider, the anchor and the joint only
/// ever exist as a unit.
fn build_door(
    physics: &mut PhysicsWorld,
    door: &DoorSegment,
    style: &DoorStyle,
) -> (RigidBodyHandle, ImpulseJointHandle) {
    let mid = [
        f32::midpoint(door.hinge[0], door.tip[0]),
        f32::midpoint(door.hinge[1], door.tip[1]),
    ];
    // Panel geometry is expressed local to the midpoint; the hinge endpoint
    // doubles as the joint anchor on the panel side.
    let hinge_local = Vector::new(door.hinge[0] - mid[0], door.hinge[1] - mid[1]);
    let tip_local = Vector::new(door.tip[0] - mid[0], door.tip[1] - mid[1]);

    let panel = RigidBodyBuilder::dynamic()
        .translation(Vector::new(mid[0], mid[1]))
        .linear_damping(LINEAR_DAMPING)
        .angular_damping(ANGULAR_DAMPING)
        .build();
    let panel_handle = physics.add_rigid_body(panel);

    // The capsule's mass properties give the thick-rod moment of inertia.
    let panel_collider = ColliderBuilder::new(SharedShape::capsule(
        hinge_local,
        tip_local,
        style.thickness,
    ))
    .mass(style.mass)
    .friction(style.friction)
    .restitution(0.0)
    .build();
    physics.add_collider(panel_collider, panel_handle);

    let anchor = RigidBodyBuilder::fixed()
        .translation(Vector::new(door.hinge[0], door.hinge[1]))
        .build();
    let anchor_handle = physics.add_rigid_body(anchor);

    let max_angle = style.max_angle_degrees.to_radians();
    let joint = RevoluteJointBuilder::new()
        .local_anchor1(hinge_local)
        .local_anchor2(Vector::new(0.0, 0.0))
        .limits([-max_angle, max_angle])
        .motor_position(0.0, style.spring_stiffness, style.spring_damping)
        .motor_model(MotorModel::ForceBased);
    let joint_handle = physics.add_impulse_joint(panel_handle, anchor_handle, joint);

    (panel_handle, joint_handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_layout_is_valid() {
        let layout = MazeLayout::classic();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.walls.len(), 26);
        assert_eq!(layout.doors.len(), 4);
        assert_eq!(layout.keys.len(), 3);
        assert_eq!(layout.required_keys, 3);
    }

    #[test]
    fn test_build_structure() {
        let world = MazeLayout::classic().build().unwrap();

        // obstacle + player + 4 door panels + 4 hinge anchors
        assert_eq!(world.physics.rigid_body_set.len(), 10);
        // 4 boundary + 26 interior + 4 door panels + obstacle + player
        // + 3 keys + exit
        assert_eq!(world.physics.collider_set.len(), 40);
        assert_eq!(world.physics.impulse_joint_set.len(), 4);
        assert_eq!(world.key_colliders.len(), 3);
    }

    #[test]
    fn test_build_is_deterministic() {
        let layout = MazeLayout::classic();
        let world1 = layout.build().unwrap();
        let world2 = layout.build().unwrap();

        assert_eq!(
            world1.physics.rigid_body_set.len(),
            world2.physics.rigid_body_set.len()
        );
        assert_eq!(
            world1.physics.collider_set.len(),
            world2.physics.collider_set.len()
        );
        assert_eq!(
            world1.physics.impulse_joint_set.len(),
            world2.physics.impulse_joint_set.len()
        );
        assert_eq!(world1.physics.compute_hash(), world2.physics.compute_hash());
    }

    #[test]
    fn test_build_determinism_survives_stepping() {
        let layout = MazeLayout::classic();
        let mut world1 = layout.build().unwrap();
        let mut world2 = layout.build().unwrap();

        for _ in 0..100 {
            world1.physics.step();
            world2.physics.step();
        }

        assert_eq!(world1.physics.compute_hash(), world2.physics.compute_hash());
    }

    #[test]
    fn test_sensor_categories() {
        let world = MazeLayout::classic().build().unwrap();

        for &key in &world.key_colliders {
            let collider = world.physics.collider_set.get(key).unwrap();
            assert!(collider.is_sensor());
            assert_eq!(
                Category::from_user_data(collider.user_data),
                Some(Category::Key)
            );
        }

        let exit = world.physics.collider_set.get(world.exit_collider).unwrap();
        assert!(exit.is_sensor());
        assert_eq!(
            Category::from_user_data(exit.user_data),
            Some(Category::Exit)
        );

        let player = world
            .physics
            .collider_set
            .get(world.player_collider)
            .unwrap();
        assert!(!player.is_sensor());
        assert_eq!(
            Category::from_user_data(player.user_data),
            Some(Category::Player)
        );
    }

    #[test]
    fn test_rejects_non_positive_player_mass() {
        let mut layout = MazeLayout::classic();
        layout.player.mass = 0.0;
        assert!(matches!(
            layout.build(),
            Err(BuildError::InvalidMass("player", _))
        ));
    }

    #[test]
    fn test_rejects_degenerate_door() {
        let mut layout = MazeLayout::classic();
        layout.doors.push(DoorSegment::new([100.0, 100.0], [100.0, 100.0]));
        assert!(matches!(layout.build(), Err(BuildError::DegenerateDoor(..))));
    }

    #[test]
    fn test_rejects_missing_keys() {
        let mut layout = MazeLayout::classic();
        layout.keys.pop();
        assert!(matches!(
            layout.build(),
            Err(BuildError::NotEnoughKeys {
                available: 2,
                required: 3
            })
        ));
    }

    /// One free-standing door far from any wall, player and obstacle parked
    /// in opposite corners.
    fn door_layout() -> MazeLayout {
        MazeLayout {
            bounds: Bounds {
                width: 750.0,
                height: 750.0,
                margin: 0.0,
                wall_thickness: 5.0,
            },
            walls: Vec::new(),
            doors: vec![DoorSegment::new([400.0, 300.0], [400.0, 380.0])],
            door_style: DoorStyle::default(),
            obstacle: BallSpawn {
                position: [650.0, 650.0],
                radius: 10.0,
                mass: 1.0,
                friction: 1.0,
            },
            player: BallSpawn {
                position: [100.0, 100.0],
                radius: 14.0,
                mass: 3.0,
                friction: 1.0,
            },
            keys: Vec::new(),
            key_radius: 12.0,
            exit: SensorSpot {
                position: [200.0, 600.0],
                radius: 18.0,
            },
            required_keys: 0,
        }
    }

    fn door_angle(world: &MazeWorld) -> f32 {
        world
            .physics
            .get_rigid_body(world.door_bodies[0])
            .unwrap()
            .rotation()
            .angle()
    }

    #[test]
    fn test_door_swings_back_to_closed() {
        let mut world = door_layout().build().unwrap();
        let panel = world.door_bodies[0];

        // Shove the panel and let it swing freely for half a second.
        world
            .physics
            .get_rigid_body_mut(panel)
            .unwrap()
            .set_angvel(3.0, true);
        let mut peak = 0.0f32;
        for _ in 0..125 {
            world.physics.step();
            peak = peak.max(door_angle(&world).abs());
        }
        assert!(peak > 0.2, "door never swung open (peak {peak})");

        // No further input: the spring pulls it back toward closed.
        for _ in 0..1250 {
            world.physics.step();
        }
        let settled = door_angle(&world).abs();
        assert!(
            settled < 0.3 * peak,
            "door did not return toward closed (peak {peak}, settled {settled})"
        );
    }

    #[test]
    fn test_door_rotation_stays_within_limit() {
        let mut world = door_layout().build().unwrap();
        let panel = world.door_bodies[0];
        let max_angle = door_layout().door_style.max_angle_degrees.to_radians();

        // Sustained hard push that would spin the panel without the limit.
        let mut peak = 0.0f32;
        for _ in 0..500 {
            world
                .physics
                .get_rigid_body_mut(panel)
                .unwrap()
                .set_angvel(20.0, true);
            world.physics.step();
            peak = peak.max(door_angle(&world).abs());
        }

        assert!(
            peak <= max_angle + 0.25,
            "door exceeded its rotation limit (peak {peak}, limit {max_angle})"
        );
        assert!(peak > max_angle - 0.4, "push never reached the limit");
    }

    #[test]
    fn test_json_roundtrip() {
        let layout = MazeLayout::classic();
        let json = layout.to_json().expect("serialize");
        let loaded = MazeLayout::from_json(&json).expect("deserialize");

        assert_eq!(loaded.walls.len(), layout.walls.len());
        assert_eq!(loaded.doors.len(), layout.doors.len());
        assert_eq!(loaded.required_keys, layout.required_keys);
        assert_eq!(
            loaded.build().unwrap().physics.compute_hash(),
            layout.build().unwrap().physics.compute_hash()
        );
    }
}
