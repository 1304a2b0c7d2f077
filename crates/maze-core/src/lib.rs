//! Maze-Core Library
//!
//! Physics simulation and game logic for a hand-steered maze game using
//! `Rapier2D`.
//!
//! A player-controlled ball navigates a maze of static walls and
//! self-closing hinged doors, pushes a movable obstacle, collects keys and
//! reaches the exit to win; touching a wall ends the game. The player is
//! driven by a tracked hand position delivered asynchronously by an
//! external pose estimator.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod collision;
pub mod control;
pub mod engine;
pub mod game;
pub mod maze;
pub mod physics;
pub mod tracker;

pub use collision::{Category, CollisionDispatch, Handler};
pub use control::{ControlConfig, ControlMapper};
pub use engine::{Command, Engine};
pub use game::{Game, GamePhase, GameStatus, Geometry, ShapeState};
pub use maze::{
    BallSpawn, Bounds, BuildError, DoorSegment, DoorStyle, MazeLayout, MazeWorld, SensorSpot,
    WallSegment,
};
pub use physics::{
    ANGULAR_DAMPING, LINEAR_DAMPING, PHYSICS_DT, PhysicsError, PhysicsWorld, SUBSTEPS,
};
pub use tracker::{TrackedPoint, TrackerSlot};
